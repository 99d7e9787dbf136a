//! Requirement rule management.
//!
//! A rule set is replaced wholesale for one scope + owner: the submitted
//! rows (one per weekday) atomically supplant whatever was there. Existing
//! upload days keep their frozen requirement; only days created afterwards
//! see the new rules.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;
use vitrina_core::models::requirement::{ReplaceRulesRequest, RuleScope};
use vitrina_core::AppError;

use crate::auth::models::SessionContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ReplaceRulesResponse {
    pub scope: RuleScope,
    /// Number of weekday rows now in effect for this scope + owner
    pub rule_count: usize,
}

/// Replace the requirement rule set for a scope
#[utoipa::path(
    put,
    path = "/upload-rules",
    tag = "rules",
    request_body = ReplaceRulesRequest,
    responses(
        (status = 200, description = "Rule set replaced", body = ReplaceRulesResponse),
        (status = 400, description = "Duplicate weekday or invalid scope", body = ErrorResponse),
        (status = 403, description = "Manager account required", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(user_id = %session.user_id, operation = "replace_rules"))]
pub async fn replace_upload_rules(
    State(state): State<Arc<AppState>>,
    session: SessionContext,
    ValidatedJson(request): ValidatedJson<ReplaceRulesRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    session.require_manager()?;
    request.validate().map_err(AppError::from)?;
    request
        .validate_rules()
        .map_err(AppError::InvalidInput)?;

    // A store rule set must target an existing store.
    if request.scope == RuleScope::Store {
        if let Some(owner_id) = request.owner_id {
            state
                .stores
                .get_store(owner_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Store {} not found", owner_id)))?;
        }
    }

    state
        .rules
        .replace_rules(request.scope, request.owner_id, &request.rules)
        .await?;

    tracing::info!(
        scope = ?request.scope,
        owner_id = ?request.owner_id,
        rule_count = request.rules.len(),
        "Requirement rule set replaced"
    );

    Ok(Json(ReplaceRulesResponse {
        scope: request.scope,
        rule_count: request.rules.len(),
    }))
}
