use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::requirement::RequirementKind;

/// Completion status of a store's upload day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "day_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Pending,
    Partial,
    Complete,
}

/// One per (store, calendar date). The requirement is resolved and frozen at
/// creation; `status` and `is_sent` are denormalized from the current file
/// set and refreshed on every mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UploadDay {
    pub id: Uuid,
    pub store_id: Uuid,
    pub day: NaiveDate,
    pub requirement: RequirementKind,
    pub status: DayStatus,
    pub is_sent: bool,
    /// Set once on the first transition into sent; cleared when the day
    /// falls out of sent or is explicitly unvalidated.
    pub completed_at: Option<DateTime<Utc>>,
    /// Drive folder for this day, populated lazily on first upload.
    pub drive_folder_id: Option<String>,
    pub validated_by: Option<Uuid>,
    pub validated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Whether `day` falls inside the allowed rolling upload window: at most
/// `window_days` in the past and never in the future.
pub fn within_upload_window(day: NaiveDate, today: NaiveDate, window_days: i64) -> bool {
    let delta = (today - day).num_days();
    (0..=window_days).contains(&delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn window_accepts_today_and_recent_past() {
        let today = d(2026, 2, 26);
        assert!(within_upload_window(today, today, 7));
        assert!(within_upload_window(d(2026, 2, 20), today, 7));
        assert!(within_upload_window(d(2026, 2, 19), today, 7));
    }

    #[test]
    fn window_rejects_future_and_stale_dates() {
        let today = d(2026, 2, 26);
        assert!(!within_upload_window(d(2026, 2, 27), today, 7));
        assert!(!within_upload_window(d(2026, 2, 18), today, 7));
    }
}
