use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Kind of an uploaded file. Photos are tagged with a slot name; videos are
/// not slot-tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "upload_kind", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    Photo,
    Video,
}

/// An uploaded file version. All replacements of "the same" file share a
/// `version_group_id`; exactly one row per group has `is_current_version`
/// set at any time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UploadFile {
    pub id: Uuid,
    pub day_id: Uuid,
    pub kind: UploadKind,
    /// Logical bucket for photos (e.g. "ESCAPARATE"); `None` for videos.
    pub slot_name: Option<String>,
    pub version_group_id: Uuid,
    /// Position of this file's group within its slot, assigned when the
    /// group is created and inherited by replacements.
    pub slot_sequence: i32,
    /// Monotonic per version group, starting at 1.
    pub version_number: i32,
    pub is_current_version: bool,
    pub supersedes_file_id: Option<Uuid>,
    pub drive_file_id: String,
    pub filename: String,
    pub original_filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

/// File fields exposed in API responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadFileInfo {
    pub id: Uuid,
    pub kind: UploadKind,
    pub slot_name: Option<String>,
    pub version_number: i32,
    pub drive_file_id: String,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
}

impl From<&UploadFile> for UploadFileInfo {
    fn from(f: &UploadFile) -> Self {
        UploadFileInfo {
            id: f.id,
            kind: f.kind,
            slot_name: f.slot_name.clone(),
            version_number: f.version_number,
            drive_file_id: f.drive_file_id.clone(),
            filename: f.filename.clone(),
            content_type: f.content_type.clone(),
            size_bytes: f.size_bytes,
            uploaded_at: f.uploaded_at,
        }
    }
}
