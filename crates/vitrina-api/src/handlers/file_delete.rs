//! Delete a file version.
//!
//! Deleting the current version promotes the next-most-recent remaining
//! version in its group; the day's cached status is recomputed in the same
//! transaction. The Drive copy is removed best-effort afterwards.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use vitrina_core::models::protocol::FileCommitResponse;
use vitrina_core::AppError;

use crate::auth::models::SessionContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Delete an uploaded file version
#[utoipa::path(
    delete,
    path = "/upload/file/{id}",
    tag = "uploads",
    params(
        ("id" = Uuid, Path, description = "Upload file ID")
    ),
    responses(
        (status = 200, description = "File deleted", body = FileCommitResponse),
        (status = 403, description = "Store access denied", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %session.user_id, operation = "file_delete"))]
pub async fn delete_upload_file(
    State(state): State<Arc<AppState>>,
    session: SessionContext,
    Path(file_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let file = state
        .files
        .get_by_id(file_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Upload file {} not found", file_id)))?;
    let day = state
        .days
        .get_by_id(file.day_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Upload day not found".to_string()))?;
    session.check_store_access(day.store_id)?;

    let store = state
        .stores
        .get_store(day.store_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Store {} not found", day.store_id)))?;

    let (deleted, day, _was_sent) = state
        .files
        .delete_version(file_id, &store.photo_slots)
        .await?;

    // The record is gone; losing the Drive copy to a transient error only
    // leaves an orphan file, so deletion is not retried here.
    let drive = state.drive.clone();
    let drive_file_id = deleted.drive_file_id.clone();
    tokio::spawn(async move {
        if let Err(e) = drive.delete_file(&drive_file_id).await {
            tracing::warn!(error = %e, drive_file_id = %drive_file_id, "Failed to delete Drive file");
        }
    });

    tracing::info!(
        file_id = %deleted.id,
        day_id = %day.id,
        status = ?day.status,
        is_sent = day.is_sent,
        "Upload file deleted"
    );

    Ok(Json(FileCommitResponse {
        file: (&deleted).into(),
        day_status: day.status,
        is_sent: day.is_sent,
    }))
}
