use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::requirement::RequirementKind;
use super::upload_day::DayStatus;
use super::upload_file::{UploadFileInfo, UploadKind};

/// Coverage of one required photo slot.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SlotCoverage {
    pub slot_name: String,
    pub covered: bool,
    /// Current file covering the slot, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<Uuid>,
}

/// Full view of a store's upload day: the frozen requirement, cached status,
/// per-slot coverage, and the current file set.
#[derive(Debug, Serialize, ToSchema)]
pub struct DayViewResponse {
    pub day_id: Uuid,
    pub store_id: Uuid,
    pub date: NaiveDate,
    pub requirement: RequirementKind,
    pub status: DayStatus,
    pub is_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub slots: Vec<SlotCoverage>,
    pub video_present: bool,
    pub missing_kinds: Vec<UploadKind>,
    pub missing_slots: Vec<String>,
    pub files: Vec<UploadFileInfo>,
}
