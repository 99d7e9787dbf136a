//! Shared orchestration for upload days.
//!
//! The video and photo upload paths, the day view, and file deletion all go
//! through the same steps: load the store and its day row (freezing the
//! requirement on first contact), make sure the Drive day folder exists, plan
//! version bookkeeping for an incoming file, and fan out best-effort
//! notifications after a commit.

use chrono::NaiveDate;
use uuid::Uuid;
use vitrina_core::models::requirement::weekday_index;
use vitrina_core::models::store::Store;
use vitrina_core::models::upload_day::UploadDay;
use vitrina_core::models::upload_file::UploadKind;
use vitrina_core::resolution::resolve_requirement;
use vitrina_core::versioning::{final_filename, next_slot_sequence, next_version_number};
use vitrina_core::AppError;
use vitrina_core::models::requirement::RequirementKind;
use vitrina_drive::day_folder_segments;

use crate::error::drive_error;
use crate::state::AppState;

/// A store, its cluster name (for the folder path), and the day row.
pub struct DayContext {
    pub store: Store,
    pub cluster_name: Option<String>,
    pub day: UploadDay,
}

/// Load the store and its day row for `date`, creating the day and freezing
/// its requirement on first contact. Resolution only runs when no day row
/// exists yet.
pub async fn load_day_context(
    state: &AppState,
    store_id: Uuid,
    date: NaiveDate,
) -> Result<DayContext, AppError> {
    let store = state
        .stores
        .get_store(store_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Store {} not found", store_id)))?;

    let cluster_name = match store.cluster_id {
        Some(cluster_id) => state
            .stores
            .get_cluster(cluster_id)
            .await?
            .map(|c| c.name),
        None => None,
    };

    let day = match state.days.get_by_store_date(store_id, date).await? {
        Some(existing) => existing,
        None => {
            let rules = state.rules.fetch_rule_set(store_id, store.cluster_id).await?;
            let requirement = resolve_requirement(&rules, weekday_index(date), None);
            tracing::info!(
                store_id = %store_id,
                %date,
                ?requirement,
                "Created upload day, requirement frozen"
            );
            state.days.create(store_id, date, requirement).await?
        }
    };

    Ok(DayContext {
        store,
        cluster_name,
        day,
    })
}

/// Resolve the day's Drive folder, walking the deterministic path from the
/// shared root and caching the resulting folder id on the day row.
pub async fn ensure_day_folder(state: &AppState, ctx: &DayContext) -> Result<String, AppError> {
    if let Some(ref folder_id) = ctx.day.drive_folder_id {
        return Ok(folder_id.clone());
    }

    let segments =
        day_folder_segments(ctx.cluster_name.as_deref(), &ctx.store.label, ctx.day.day);
    let mut parent = state.config.drive_root_folder_id().to_string();
    for segment in &segments {
        parent = state
            .drive
            .ensure_folder(&parent, segment)
            .await
            .map_err(drive_error)?;
    }

    state.days.set_drive_folder(ctx.day.id, &parent).await?;
    Ok(parent)
}

/// Version bookkeeping for an incoming file, computed before anything is
/// sent upstream.
pub struct VersionPlan {
    pub slot_name: Option<String>,
    pub version_group_id: Uuid,
    pub slot_sequence: i32,
    pub version_number: i32,
    pub supersedes_file_id: Option<Uuid>,
    pub filename: String,
}

/// Plan slot and version numbers for a new upload. With `replace_file_id`
/// the new file joins the replaced file's group and bumps its version;
/// otherwise it opens a new group at the next sequence within the slot.
pub async fn plan_version(
    state: &AppState,
    day: &UploadDay,
    kind: UploadKind,
    slot_name: Option<String>,
    replace_file_id: Option<Uuid>,
    original_filename: &str,
) -> Result<VersionPlan, AppError> {
    if let Some(replace_id) = replace_file_id {
        let replaced = state
            .files
            .get_by_id(replace_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Upload file {} not found", replace_id)))?;
        if replaced.day_id != day.id {
            return Err(AppError::InvalidInput(
                "Replaced file belongs to a different day".to_string(),
            ));
        }
        if replaced.kind != kind {
            return Err(AppError::InvalidInput(
                "Replaced file is of a different kind".to_string(),
            ));
        }

        let group = state.files.list_group(replaced.version_group_id).await?;
        let version_number = next_version_number(&group);
        // Supersede whichever version is current now, not necessarily the
        // one the client named.
        let supersedes_file_id = group
            .iter()
            .find(|f| f.is_current_version)
            .map(|f| f.id)
            .or(Some(replaced.id));
        let filename = final_filename(
            kind,
            replaced.slot_name.as_deref(),
            replaced.slot_sequence,
            version_number,
            original_filename,
        );

        return Ok(VersionPlan {
            slot_name: replaced.slot_name,
            version_group_id: replaced.version_group_id,
            slot_sequence: replaced.slot_sequence,
            version_number,
            supersedes_file_id,
            filename,
        });
    }

    let day_files = state.files.list_for_day(day.id).await?;
    let slot_sequence = next_slot_sequence(&day_files, kind, slot_name.as_deref());
    let filename = final_filename(kind, slot_name.as_deref(), slot_sequence, 1, original_filename);

    Ok(VersionPlan {
        slot_name,
        version_group_id: Uuid::new_v4(),
        slot_sequence,
        version_number: 1,
        supersedes_file_id: None,
        filename,
    })
}

/// Post-commit fan-out: clear the missing-upload alert once the day becomes
/// sent and notify about off-schedule uploads. Never fails the request; the
/// file is already committed.
pub async fn after_commit(state: &AppState, store: &Store, day: &UploadDay, was_sent: bool) {
    if !was_sent && day.is_sent {
        match state.alerts.clear_missing_upload(store.id, day.day).await {
            Ok(cleared) if cleared > 0 => {
                tracing::info!(store_id = %store.id, day = %day.day, cleared, "Cleared missing-upload alert");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, store_id = %store.id, "Failed to clear missing-upload alert");
            }
        }

        if let Some(email) = state.email.clone() {
            let subject = format!("Upload complete: {} on {}", store.name, day.day);
            let body = format!(
                "Store {} has completed its required uploads for {}.",
                store.label, day.day
            );
            tokio::spawn(async move {
                if let Err(e) = email.send_alert(&subject, &body).await {
                    tracing::warn!(error = %e, "Failed to send day-complete email");
                }
            });
        }
    }

    // A day with no requirement still accepts uploads; flag it for review.
    if day.requirement == RequirementKind::None {
        if let Some(email) = state.email.clone() {
            let subject = format!("Off-schedule upload: {} on {}", store.name, day.day);
            let body = format!(
                "Store {} uploaded a file on {}, a day with no upload requirement.",
                store.label, day.day
            );
            tokio::spawn(async move {
                if let Err(e) = email.send_alert(&subject, &body).await {
                    tracing::warn!(error = %e, "Failed to send off-schedule upload email");
                }
            });
        }
    }
}
