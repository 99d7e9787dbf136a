//! Drive abstraction trait.
//!
//! The upload flows program against this trait so tests can substitute an
//! in-memory double for the real HTTP client.

use async_trait::async_trait;
use thiserror::Error;

/// Drive operation errors
#[derive(Debug, Error)]
pub enum DriveError {
    #[error("Drive API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Drive request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Upload session missing from Drive response")]
    MissingSessionUrl,

    #[error("Unexpected Drive response: {0}")]
    UnexpectedResponse(String),
}

/// Result type for Drive operations
pub type DriveResult<T> = Result<T, DriveError>;

/// Outcome of relaying one byte range to an open upload session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// Drive expects more data; `uploaded_bytes` is the confirmed offset the
    /// client should resume from.
    Incomplete { uploaded_bytes: u64 },
    /// The upload is complete and Drive assigned a file id.
    Complete { file_id: String },
}

/// Metadata of a stored file, fetched when finalizing an upload.
#[derive(Debug, Clone)]
pub struct DriveFileMeta {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size_bytes: Option<u64>,
    pub parents: Vec<String>,
}

/// Remote object store operations the upload flows need. Folder lookups are
/// ensure-or-create; chunk relay is stateless per call because Drive tracks
/// the offset by content range.
#[async_trait]
pub trait DriveClient: Send + Sync {
    /// Find a folder named `name` directly under `parent_id`, creating it if
    /// absent. Returns the folder id.
    async fn ensure_folder(&self, parent_id: &str, name: &str) -> DriveResult<String>;

    /// Buffered small-file upload (photos). Returns the new file id.
    async fn upload_small(
        &self,
        folder_id: &str,
        name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> DriveResult<String>;

    /// Open a resumable upload session for a large file. Returns the session
    /// URL subsequent chunk PUTs target.
    async fn create_resumable_session(
        &self,
        folder_id: &str,
        name: &str,
        content_type: &str,
        total_bytes: u64,
    ) -> DriveResult<String>;

    /// Relay one byte range to an open session with a content-range PUT.
    async fn upload_chunk(
        &self,
        session_url: &str,
        content_range: &str,
        data: Vec<u8>,
    ) -> DriveResult<ChunkOutcome>;

    /// Fetch file metadata (name, parents, size) for finalize verification.
    async fn get_file(&self, file_id: &str) -> DriveResult<DriveFileMeta>;

    /// Delete a file. Missing files are reported as `DriveError::NotFound`.
    async fn delete_file(&self, file_id: &str) -> DriveResult<()>;
}
