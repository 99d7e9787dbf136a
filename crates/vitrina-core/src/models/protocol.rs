use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::upload_day::DayStatus;
use super::upload_file::UploadFileInfo;

/// Request to start a resumable video upload.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct VideoInitRequest {
    /// Calendar date the video belongs to
    pub date: NaiveDate,
    /// MIME type of the video
    #[validate(length(
        min = 1,
        max = 255,
        message = "MIME type must be between 1 and 255 characters"
    ))]
    pub mime_type: String,
    /// Total file size in bytes
    pub total_bytes: u64,
    /// Original filename
    #[validate(length(
        min = 1,
        max = 255,
        message = "Filename must be between 1 and 255 characters"
    ))]
    pub original_filename: String,
    /// Optional slot label carried through to the Drive filename
    #[validate(length(max = 100, message = "Slot name must be at most 100 characters"))]
    pub slot_name: Option<String>,
    /// Replace an existing file (inherits its slot and version group)
    pub replace_file_id: Option<Uuid>,
    /// Target store; omitted by store accounts (taken from the session)
    pub store_id: Option<Uuid>,
}

/// Response for a started video upload. The finalize token is the only state
/// carried between requests; the server keeps no in-flight session table.
#[derive(Debug, Serialize, ToSchema)]
pub struct VideoInitResponse {
    /// Signed capability token for the chunk and finalize phases
    pub finalize_token: String,
    /// Token expiry
    pub expires_at: DateTime<Utc>,
    /// Maximum accepted chunk size in bytes
    pub max_chunk_bytes: usize,
}

/// One relayed byte range. `chunk` is the raw bytes, base64-encoded.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VideoChunkRequest {
    pub finalize_token: String,
    /// First byte offset of this chunk
    pub start: u64,
    /// One past the last byte offset of this chunk
    pub end_exclusive: u64,
    /// Declared total size; must match the token
    pub total_bytes: u64,
    /// Base64-encoded chunk body
    pub chunk: String,
}

/// Chunk relay outcome. `done: false` carries the confirmed offset so the
/// client can resume after a partial chunk loss.
#[derive(Debug, Serialize, ToSchema)]
pub struct VideoChunkResponse {
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_file_id: Option<String>,
}

/// Request to commit an uploaded video.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VideoFinalizeRequest {
    pub finalize_token: String,
    /// File id reported by the destination store at the end of the chunk phase
    pub drive_file_id: String,
}

/// Response after a file landed (video finalize, photo upload, delete).
#[derive(Debug, Serialize, ToSchema)]
pub struct FileCommitResponse {
    pub file: UploadFileInfo,
    pub day_status: DayStatus,
    pub is_sent: bool,
}
