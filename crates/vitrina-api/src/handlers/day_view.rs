//! Day view: resolved requirement, cached status, per-slot coverage.
//!
//! The view recomputes the evaluation from the current file set on every
//! request, so a cached status that drifted (or a crashed mutation) heals on
//! the next read.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use vitrina_core::completion::{evaluate_day, DayEvaluation};
use vitrina_core::models::day_view::{DayViewResponse, SlotCoverage};
use vitrina_core::models::store::Store;
use vitrina_core::models::upload_day::UploadDay;
use vitrina_core::models::upload_file::{UploadFile, UploadKind};

use crate::auth::models::SessionContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::day_flow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DayViewQuery {
    /// Target store; omitted by store accounts
    pub store_id: Option<Uuid>,
    pub date: NaiveDate,
}

fn normalize(slot: &str) -> String {
    slot.trim().to_lowercase()
}

fn build_view(
    day: &UploadDay,
    store: &Store,
    files: &[UploadFile],
    eval: &DayEvaluation,
) -> DayViewResponse {
    let current: Vec<&UploadFile> = files.iter().filter(|f| f.is_current_version).collect();

    let slots = store
        .photo_slots
        .iter()
        .map(|slot| {
            let covering = current.iter().find(|f| {
                f.kind == UploadKind::Photo
                    && f.slot_name
                        .as_deref()
                        .map(|s| normalize(s) == normalize(slot))
                        .unwrap_or(false)
            });
            SlotCoverage {
                slot_name: slot.clone(),
                covered: covering.is_some(),
                file_id: covering.map(|f| f.id),
            }
        })
        .collect();

    DayViewResponse {
        day_id: day.id,
        store_id: day.store_id,
        date: day.day,
        requirement: day.requirement,
        status: day.status,
        is_sent: day.is_sent,
        completed_at: day.completed_at,
        slots,
        video_present: current.iter().any(|f| f.kind == UploadKind::Video),
        missing_kinds: eval.missing_kinds.clone(),
        missing_slots: eval.missing_slots.clone(),
        files: current.iter().map(|f| (*f).into()).collect(),
    }
}

/// Fetch a store's day: requirement, status, slot coverage, current files
#[utoipa::path(
    get,
    path = "/day-view",
    tag = "days",
    params(
        ("store_id" = Option<Uuid>, Query, description = "Target store (managers only)"),
        ("date" = NaiveDate, Query, description = "Calendar date")
    ),
    responses(
        (status = 200, description = "Day view", body = DayViewResponse),
        (status = 403, description = "Store access denied", body = ErrorResponse),
        (status = 404, description = "Store not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %session.user_id, operation = "day_view"))]
pub async fn get_day_view(
    State(state): State<Arc<AppState>>,
    session: SessionContext,
    Query(query): Query<DayViewQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let store_id = session.resolve_store_id(query.store_id)?;

    let ctx = day_flow::load_day_context(&state, store_id, query.date).await?;
    let files = state.files.list_for_day(ctx.day.id).await?;
    let eval = evaluate_day(ctx.day.requirement, &files, &ctx.store.photo_slots);

    // Self-heal drifted cached fields from the recomputed evaluation.
    let day = if eval.status != ctx.day.status || eval.is_sent != ctx.day.is_sent {
        tracing::info!(
            day_id = %ctx.day.id,
            cached = ?ctx.day.status,
            recomputed = ?eval.status,
            "Day status drifted, repairing"
        );
        state.days.apply_evaluation(ctx.day.id, &eval).await?
    } else {
        ctx.day
    };

    Ok(Json(build_view(&day, &ctx.store, &files, &eval)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vitrina_core::models::requirement::RequirementKind;
    use vitrina_core::models::upload_day::DayStatus;

    fn store(slots: &[&str]) -> Store {
        Store {
            id: Uuid::new_v4(),
            name: "Goya".to_string(),
            label: "T042 - Goya".to_string(),
            cluster_id: None,
            photo_slots: slots.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn day(store_id: Uuid, requirement: RequirementKind, status: DayStatus) -> UploadDay {
        UploadDay {
            id: Uuid::new_v4(),
            store_id,
            day: NaiveDate::from_ymd_opt(2026, 2, 26).unwrap(),
            requirement,
            status,
            is_sent: status == DayStatus::Complete,
            completed_at: None,
            drive_folder_id: None,
            validated_by: None,
            validated_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn photo(day_id: Uuid, slot: &str, current: bool) -> UploadFile {
        UploadFile {
            id: Uuid::new_v4(),
            day_id,
            kind: UploadKind::Photo,
            slot_name: Some(slot.to_string()),
            version_group_id: Uuid::new_v4(),
            slot_sequence: 1,
            version_number: 1,
            is_current_version: current,
            supersedes_file_id: None,
            drive_file_id: Uuid::new_v4().to_string(),
            filename: "f.jpg".to_string(),
            original_filename: "f.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            size_bytes: 100,
            uploaded_by: Uuid::new_v4(),
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn coverage_marks_covered_and_missing_slots() {
        let store = store(&["ESCAPARATE", "FACHADA"]);
        let day = day(store.id, RequirementKind::Photo, DayStatus::Partial);
        let files = vec![photo(day.id, "escaparate", true)];
        let eval = evaluate_day(day.requirement, &files, &store.photo_slots);

        let view = build_view(&day, &store, &files, &eval);
        assert_eq!(view.slots.len(), 2);
        assert!(view.slots[0].covered);
        assert_eq!(view.slots[0].file_id, Some(files[0].id));
        assert!(!view.slots[1].covered);
        assert_eq!(view.missing_slots, vec!["FACHADA".to_string()]);
        assert!(!view.video_present);
    }

    #[test]
    fn superseded_files_are_not_listed() {
        let store = store(&["ESCAPARATE"]);
        let day = day(store.id, RequirementKind::Photo, DayStatus::Pending);
        let files = vec![photo(day.id, "ESCAPARATE", false)];
        let eval = evaluate_day(day.requirement, &files, &store.photo_slots);

        let view = build_view(&day, &store, &files, &eval);
        assert!(view.files.is_empty());
        assert!(!view.slots[0].covered);
    }
}
