//! Buffered photo upload.
//!
//! Photos are small enough to buffer in one multipart request; the slot and
//! version bookkeeping matches the video finalize path.

use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;
use vitrina_core::models::protocol::FileCommitResponse;
use vitrina_core::models::upload_day::within_upload_window;
use vitrina_core::models::upload_file::UploadKind;
use vitrina_core::AppError;
use vitrina_db::NewUploadFile;

use crate::auth::models::SessionContext;
use crate::error::{drive_error, ErrorResponse, HttpAppError};
use crate::services::day_flow;
use crate::state::AppState;

struct PhotoUploadForm {
    date: NaiveDate,
    slot_name: Option<String>,
    store_id: Option<Uuid>,
    replace_file_id: Option<Uuid>,
    original_filename: String,
    content_type: String,
    data: Vec<u8>,
}

async fn read_form(mut multipart: Multipart) -> Result<PhotoUploadForm, AppError> {
    let mut date = None;
    let mut slot_name = None;
    let mut store_id = None;
    let mut replace_file_id = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        match field.name().unwrap_or_default() {
            "date" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(e.to_string()))?;
                date = Some(text.parse::<NaiveDate>().map_err(|_| {
                    AppError::InvalidInput(format!("Invalid date '{}', expected YYYY-MM-DD", text))
                })?);
            }
            "slot_name" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(e.to_string()))?;
                if !text.trim().is_empty() {
                    slot_name = Some(text);
                }
            }
            "store_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(e.to_string()))?;
                store_id = Some(text.parse::<Uuid>()?);
            }
            "replace_file_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(e.to_string()))?;
                replace_file_id = Some(text.parse::<Uuid>()?);
            }
            "file" => {
                let original_filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::InvalidInput("File field has no filename".to_string()))?;
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Failed to read file: {}", e)))?
                    .to_vec();
                file = Some((original_filename, content_type, data));
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    let date = date.ok_or_else(|| AppError::InvalidInput("Missing 'date' field".to_string()))?;
    let (original_filename, content_type, data) =
        file.ok_or_else(|| AppError::InvalidInput("Missing 'file' field".to_string()))?;

    Ok(PhotoUploadForm {
        date,
        slot_name,
        store_id,
        replace_file_id,
        original_filename,
        content_type,
        data,
    })
}

/// Upload a photo for a day slot
#[utoipa::path(
    post,
    path = "/upload/photo",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Photo committed", body = FileCommitResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 502, description = "Drive error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(user_id = %session.user_id, operation = "photo_upload"))]
pub async fn upload_photo(
    State(state): State<Arc<AppState>>,
    session: SessionContext,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = read_form(multipart).await?;

    let store_id = session.resolve_store_id(form.store_id)?;

    if !form.content_type.starts_with("image/") {
        return Err(HttpAppError::from(AppError::InvalidInput(format!(
            "Expected an image MIME type, got '{}'",
            form.content_type
        ))));
    }
    if form.data.is_empty() {
        return Err(HttpAppError::from(AppError::InvalidInput(
            "File is empty".to_string(),
        )));
    }
    if form.data.len() > state.config.max_photo_size_bytes() {
        return Err(HttpAppError::from(AppError::PayloadTooLarge(format!(
            "Photo exceeds the maximum of {} MB",
            state.config.max_photo_size_bytes() / 1024 / 1024
        ))));
    }
    if !within_upload_window(
        form.date,
        Utc::now().date_naive(),
        state.config.upload_window_days(),
    ) {
        return Err(HttpAppError::from(AppError::InvalidInput(format!(
            "Date {} is outside the allowed upload window of {} days",
            form.date,
            state.config.upload_window_days()
        ))));
    }

    let ctx = day_flow::load_day_context(&state, store_id, form.date).await?;
    let folder_id = day_flow::ensure_day_folder(&state, &ctx).await?;

    let plan = day_flow::plan_version(
        &state,
        &ctx.day,
        UploadKind::Photo,
        form.slot_name.clone(),
        form.replace_file_id,
        &form.original_filename,
    )
    .await?;

    let size_bytes = form.data.len() as i64;
    let drive_file_id = state
        .drive
        .upload_small(&folder_id, &plan.filename, &form.content_type, form.data)
        .await
        .map_err(drive_error)?;

    let new_file = NewUploadFile {
        day_id: ctx.day.id,
        kind: UploadKind::Photo,
        slot_name: plan.slot_name,
        version_group_id: plan.version_group_id,
        slot_sequence: plan.slot_sequence,
        version_number: plan.version_number,
        supersedes_file_id: plan.supersedes_file_id,
        drive_file_id,
        filename: plan.filename,
        original_filename: form.original_filename,
        content_type: form.content_type,
        size_bytes,
        uploaded_by: session.user_id,
    };

    let (file, day, was_sent) = state
        .files
        .commit_version(new_file, &ctx.store.photo_slots)
        .await?;

    day_flow::after_commit(&state, &ctx.store, &day, was_sent).await;

    tracing::info!(
        file_id = %file.id,
        day_id = %day.id,
        slot = ?file.slot_name,
        status = ?day.status,
        "Photo upload committed"
    );

    Ok(Json(FileCommitResponse {
        file: (&file).into(),
        day_status: day.status,
        is_sent: day.is_sent,
    }))
}
