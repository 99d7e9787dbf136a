//! Resumable video upload protocol: init, chunk relay, finalize.
//!
//! Large videos cannot be buffered in a single request. The client declares
//! the upload, relays bounded byte ranges, and commits the result; all state
//! between phases travels in the signed finalize token, so the server holds
//! no in-flight session table and an abandoned upload costs nothing.

use axum::{extract::State, response::IntoResponse, Json};
use base64::Engine;
use chrono::{Duration, Utc};
use std::sync::Arc;
use validator::Validate;
use vitrina_core::chunking::ChunkRange;
use vitrina_core::models::protocol::{
    FileCommitResponse, VideoChunkRequest, VideoChunkResponse, VideoFinalizeRequest,
    VideoInitRequest, VideoInitResponse,
};
use vitrina_core::models::upload_day::within_upload_window;
use vitrina_core::models::upload_file::UploadKind;
use vitrina_core::AppError;
use vitrina_db::NewUploadFile;
use vitrina_drive::ChunkOutcome;

use crate::auth::models::SessionContext;
use crate::error::{drive_error, ErrorResponse, HttpAppError, ValidatedJson};
use crate::services::day_flow;
use crate::state::AppState;
use crate::token::{self, FinalizeTokenPayload};

/// Verify a finalize token against the caller's session: signature, expiry,
/// issuing user, and store binding. Rejects cross-account replay before any
/// side effect.
fn verify_token_for_session(
    state: &AppState,
    session: &SessionContext,
    finalize_token: &str,
) -> Result<FinalizeTokenPayload, AppError> {
    let payload = token::verify(
        finalize_token,
        state.config.finalize_token_secret(),
        Utc::now(),
    )?;
    if payload.uid != session.user_id {
        return Err(AppError::Forbidden(
            "Upload token was issued to another user".to_string(),
        ));
    }
    session.check_store_access(payload.store_id)?;
    Ok(payload)
}

/// Start a resumable video upload
#[utoipa::path(
    post,
    path = "/upload/video/init",
    tag = "uploads",
    request_body = VideoInitRequest,
    responses(
        (status = 200, description = "Upload session opened", body = VideoInitResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Store access denied", body = ErrorResponse),
        (status = 502, description = "Drive error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(user_id = %session.user_id, operation = "video_init"))]
pub async fn init_video_upload(
    State(state): State<Arc<AppState>>,
    session: SessionContext,
    ValidatedJson(request): ValidatedJson<VideoInitRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;

    let store_id = session.resolve_store_id(request.store_id)?;

    if !request.mime_type.starts_with("video/") {
        return Err(HttpAppError::from(AppError::InvalidInput(format!(
            "Expected a video MIME type, got '{}'",
            request.mime_type
        ))));
    }
    if request.total_bytes == 0 {
        return Err(HttpAppError::from(AppError::InvalidInput(
            "Total size must be greater than 0".to_string(),
        )));
    }
    if request.total_bytes > state.config.max_video_size_bytes() as u64 {
        return Err(HttpAppError::from(AppError::PayloadTooLarge(format!(
            "Video exceeds the maximum of {} MB",
            state.config.max_video_size_bytes() / 1024 / 1024
        ))));
    }
    if !within_upload_window(
        request.date,
        Utc::now().date_naive(),
        state.config.upload_window_days(),
    ) {
        return Err(HttpAppError::from(AppError::InvalidInput(format!(
            "Date {} is outside the allowed upload window of {} days",
            request.date,
            state.config.upload_window_days()
        ))));
    }

    let ctx = day_flow::load_day_context(&state, store_id, request.date).await?;
    let folder_id = day_flow::ensure_day_folder(&state, &ctx).await?;

    let plan = day_flow::plan_version(
        &state,
        &ctx.day,
        UploadKind::Video,
        request.slot_name.clone(),
        request.replace_file_id,
        &request.original_filename,
    )
    .await?;

    let session_url = state
        .drive
        .create_resumable_session(
            &folder_id,
            &plan.filename,
            &request.mime_type,
            request.total_bytes,
        )
        .await
        .map_err(drive_error)?;

    let expires_at = Utc::now() + Duration::minutes(state.config.finalize_token_ttl_minutes());
    let payload = FinalizeTokenPayload {
        session_url,
        total_bytes: request.total_bytes,
        mime_type: request.mime_type,
        folder_id,
        filename: plan.filename,
        original_filename: request.original_filename,
        kind: UploadKind::Video,
        slot_name: plan.slot_name,
        version_group_id: plan.version_group_id,
        slot_sequence: plan.slot_sequence,
        version_number: plan.version_number,
        supersedes_file_id: plan.supersedes_file_id,
        day_id: ctx.day.id,
        store_id,
        uid: session.user_id,
        exp: expires_at.timestamp(),
    };
    let finalize_token = token::issue(&payload, state.config.finalize_token_secret())?;

    tracing::info!(
        store_id = %store_id,
        day_id = %ctx.day.id,
        total_bytes = request.total_bytes,
        "Opened resumable video upload"
    );

    Ok(Json(VideoInitResponse {
        finalize_token,
        expires_at,
        max_chunk_bytes: state.config.max_chunk_bytes(),
    }))
}

/// Relay one byte range to the open upload session
#[utoipa::path(
    post,
    path = "/upload/video/chunk",
    tag = "uploads",
    request_body = VideoChunkRequest,
    responses(
        (status = 200, description = "Chunk relayed", body = VideoChunkResponse),
        (status = 400, description = "Invalid byte range", body = ErrorResponse),
        (status = 401, description = "Token expired or invalid", body = ErrorResponse),
        (status = 413, description = "Chunk too large", body = ErrorResponse),
        (status = 502, description = "Drive error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(user_id = %session.user_id, operation = "video_chunk"))]
pub async fn relay_video_chunk(
    State(state): State<Arc<AppState>>,
    session: SessionContext,
    ValidatedJson(request): ValidatedJson<VideoChunkRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let payload = verify_token_for_session(&state, &session, &request.finalize_token)?;

    if request.total_bytes != payload.total_bytes {
        return Err(HttpAppError::from(AppError::InvalidInput(format!(
            "Declared total of {} bytes does not match the upload's {} bytes",
            request.total_bytes, payload.total_bytes
        ))));
    }

    let chunk = base64::engine::general_purpose::STANDARD
        .decode(&request.chunk)
        .map_err(|_| AppError::InvalidInput("Chunk body is not valid base64".to_string()))?;

    let range = ChunkRange {
        start: request.start,
        end_exclusive: request.end_exclusive,
        total_bytes: request.total_bytes,
    };
    range.validate(chunk.len(), state.config.max_chunk_bytes())?;

    let outcome = state
        .drive
        .upload_chunk(&payload.session_url, &range.content_range(), chunk)
        .await
        .map_err(drive_error)?;

    let response = match outcome {
        ChunkOutcome::Incomplete { uploaded_bytes } => VideoChunkResponse {
            done: false,
            uploaded_bytes: Some(uploaded_bytes),
            drive_file_id: None,
        },
        ChunkOutcome::Complete { file_id } => VideoChunkResponse {
            done: true,
            uploaded_bytes: Some(payload.total_bytes),
            drive_file_id: Some(file_id),
        },
    };
    Ok(Json(response))
}

/// Commit the uploaded video as a file version
#[utoipa::path(
    post,
    path = "/upload/video/finalize",
    tag = "uploads",
    request_body = VideoFinalizeRequest,
    responses(
        (status = 200, description = "File committed", body = FileCommitResponse),
        (status = 400, description = "Destination verification failed", body = ErrorResponse),
        (status = 401, description = "Token expired or invalid", body = ErrorResponse),
        (status = 502, description = "Drive error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(user_id = %session.user_id, operation = "video_finalize"))]
pub async fn finalize_video_upload(
    State(state): State<Arc<AppState>>,
    session: SessionContext,
    ValidatedJson(request): ValidatedJson<VideoFinalizeRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let payload = verify_token_for_session(&state, &session, &request.finalize_token)?;

    // Idempotent retry: the file record already exists for this Drive id.
    if let Some(existing) = state.files.find_by_drive_id(&request.drive_file_id).await? {
        if existing.day_id != payload.day_id {
            return Err(HttpAppError::from(AppError::InvalidInput(
                "Drive file is already attached to another day".to_string(),
            )));
        }
        let day = state
            .days
            .get_by_id(existing.day_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Upload day not found".to_string()))?;
        tracing::debug!(file_id = %existing.id, "Finalize retried, returning existing record");
        return Ok(Json(FileCommitResponse {
            file: (&existing).into(),
            day_status: day.status,
            is_sent: day.is_sent,
        }));
    }

    // The token promised a specific name under a specific folder; a token
    // replayed against an unrelated file fails here.
    let meta = state
        .drive
        .get_file(&request.drive_file_id)
        .await
        .map_err(drive_error)?;
    if meta.name != payload.filename {
        return Err(HttpAppError::from(AppError::InvalidInput(format!(
            "Drive file name '{}' does not match this upload",
            meta.name
        ))));
    }
    if !meta.parents.contains(&payload.folder_id) {
        return Err(HttpAppError::from(AppError::InvalidInput(
            "Drive file is not in this upload's destination folder".to_string(),
        )));
    }
    if let Some(size) = meta.size_bytes {
        if size != payload.total_bytes {
            return Err(HttpAppError::from(AppError::InvalidInput(format!(
                "Drive file has {} bytes but {} were declared",
                size, payload.total_bytes
            ))));
        }
    }

    let store = state
        .stores
        .get_store(payload.store_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Store {} not found", payload.store_id)))?;

    let new_file = NewUploadFile {
        day_id: payload.day_id,
        kind: UploadKind::Video,
        slot_name: payload.slot_name.clone(),
        version_group_id: payload.version_group_id,
        slot_sequence: payload.slot_sequence,
        version_number: payload.version_number,
        supersedes_file_id: payload.supersedes_file_id,
        drive_file_id: request.drive_file_id.clone(),
        filename: payload.filename.clone(),
        original_filename: payload.original_filename.clone(),
        content_type: payload.mime_type.clone(),
        size_bytes: meta.size_bytes.unwrap_or(payload.total_bytes) as i64,
        uploaded_by: payload.uid,
    };

    let (file, day, was_sent) = state
        .files
        .commit_version(new_file, &store.photo_slots)
        .await?;

    day_flow::after_commit(&state, &store, &day, was_sent).await;

    tracing::info!(
        file_id = %file.id,
        day_id = %day.id,
        status = ?day.status,
        is_sent = day.is_sent,
        "Video upload finalized"
    );

    Ok(Json(FileCommitResponse {
        file: (&file).into(),
        day_status: day.status,
        is_sent: day.is_sent,
    }))
}
