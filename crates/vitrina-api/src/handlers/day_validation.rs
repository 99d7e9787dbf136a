//! Administrative day validation.
//!
//! Managers sign off a completed day (`validate`) or explicitly un-send it
//! (`unvalidate`). Unvalidate is the one path that clears `completed_at`
//! outside of the automatic reset when a deletion takes the day out of sent.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use vitrina_core::models::upload_day::{DayStatus, UploadDay};
use vitrina_core::AppError;

use crate::auth::models::SessionContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct DayValidationResponse {
    pub day_id: Uuid,
    pub status: DayStatus,
    pub is_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validated_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validated_at: Option<DateTime<Utc>>,
}

impl From<&UploadDay> for DayValidationResponse {
    fn from(day: &UploadDay) -> Self {
        DayValidationResponse {
            day_id: day.id,
            status: day.status,
            is_sent: day.is_sent,
            completed_at: day.completed_at,
            validated_by: day.validated_by,
            validated_at: day.validated_at,
        }
    }
}

async fn load_day(state: &AppState, day_id: Uuid) -> Result<UploadDay, AppError> {
    state
        .days
        .get_by_id(day_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Upload day {} not found", day_id)))
}

/// Sign off a day as validated
#[utoipa::path(
    post,
    path = "/day/{id}/validate",
    tag = "days",
    params(
        ("id" = Uuid, Path, description = "Upload day ID")
    ),
    responses(
        (status = 200, description = "Day validated", body = DayValidationResponse),
        (status = 403, description = "Manager account required", body = ErrorResponse),
        (status = 404, description = "Day not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %session.user_id, operation = "day_validate"))]
pub async fn validate_day(
    State(state): State<Arc<AppState>>,
    session: SessionContext,
    Path(day_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    session.require_manager()?;
    let day = load_day(&state, day_id).await?;

    if !day.is_sent {
        return Err(HttpAppError::from(AppError::InvalidInput(
            "Only a sent day can be validated".to_string(),
        )));
    }

    let day = state.days.validate(day_id, session.user_id).await?;
    tracing::info!(day_id = %day.id, validated_by = %session.user_id, "Day validated");
    Ok(Json(DayValidationResponse::from(&day)))
}

/// Explicitly un-send a day, clearing validation and `completed_at`
#[utoipa::path(
    post,
    path = "/day/{id}/unvalidate",
    tag = "days",
    params(
        ("id" = Uuid, Path, description = "Upload day ID")
    ),
    responses(
        (status = 200, description = "Day un-sent", body = DayValidationResponse),
        (status = 403, description = "Manager account required", body = ErrorResponse),
        (status = 404, description = "Day not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %session.user_id, operation = "day_unvalidate"))]
pub async fn unvalidate_day(
    State(state): State<Arc<AppState>>,
    session: SessionContext,
    Path(day_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    session.require_manager()?;
    load_day(&state, day_id).await?;

    let day = state.days.unvalidate(day_id).await?;
    tracing::info!(day_id = %day.id, "Day un-sent by administrator");
    Ok(Json(DayValidationResponse::from(&day)))
}
