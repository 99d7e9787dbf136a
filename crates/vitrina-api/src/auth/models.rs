use crate::error::ErrorResponse;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;
use vitrina_core::AppError;

/// User role for authorization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Superadmin,
    Manager,
    Store,
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UserRole::Superadmin => write!(f, "superadmin"),
            UserRole::Manager => write!(f, "manager"),
            UserRole::Store => write!(f, "store"),
        }
    }
}

/// JWT claims structure. Issuance is handled by the identity service; this
/// API only verifies.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid, // user_id
    /// Store the account is bound to; absent for managers and the superadmin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<Uuid>,
    pub role: UserRole,
    pub exp: i64, // expiration timestamp
    pub iat: i64, // issued at timestamp
}

/// Session context extracted from the JWT and stored in request extensions
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: Uuid,
    pub store_id: Option<Uuid>,
    pub role: UserRole,
}

impl SessionContext {
    /// Rules mutation and day validation are manager-or-above actions.
    pub fn require_manager(&self) -> Result<(), AppError> {
        match self.role {
            UserRole::Superadmin | UserRole::Manager => Ok(()),
            UserRole::Store => Err(AppError::Forbidden(
                "This action requires a manager account".to_string(),
            )),
        }
    }

    /// Resolve which store an operation targets. Store accounts act only on
    /// their own store; managers and the superadmin must name one.
    pub fn resolve_store_id(&self, requested: Option<Uuid>) -> Result<Uuid, AppError> {
        match self.role {
            UserRole::Store => {
                let own = self.store_id.ok_or_else(|| {
                    AppError::Unauthorized("Store session is missing its store".to_string())
                })?;
                match requested {
                    None => Ok(own),
                    Some(id) if id == own => Ok(own),
                    Some(_) => Err(AppError::Forbidden(
                        "Store accounts cannot act on another store".to_string(),
                    )),
                }
            }
            UserRole::Manager | UserRole::Superadmin => requested.ok_or_else(|| {
                AppError::InvalidInput("store_id is required for manager accounts".to_string())
            }),
        }
    }

    /// A store account may only touch its own store's data.
    pub fn check_store_access(&self, store_id: Uuid) -> Result<(), AppError> {
        if self.role == UserRole::Store && self.store_id != Some(store_id) {
            return Err(AppError::Forbidden(
                "Store accounts cannot act on another store".to_string(),
            ));
        }
        Ok(())
    }
}

// Implement FromRequestParts for SessionContext to work with Multipart
// Extension cannot be used with Multipart, so we extract directly from request parts
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse {
                        error: "Missing session context".to_string(),
                        details: None,
                        error_type: None,
                        code: "MISSING_SESSION_CONTEXT".to_string(),
                        recoverable: false,
                        suggested_action: Some("Check the authentication token".to_string()),
                    }),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: UserRole, store_id: Option<Uuid>) -> SessionContext {
        SessionContext {
            user_id: Uuid::new_v4(),
            store_id,
            role,
        }
    }

    #[test]
    fn store_account_defaults_to_own_store() {
        let own = Uuid::new_v4();
        let session = ctx(UserRole::Store, Some(own));
        assert_eq!(session.resolve_store_id(None).unwrap(), own);
        assert_eq!(session.resolve_store_id(Some(own)).unwrap(), own);
    }

    #[test]
    fn store_account_cannot_target_other_store() {
        let session = ctx(UserRole::Store, Some(Uuid::new_v4()));
        let err = session.resolve_store_id(Some(Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn manager_must_name_a_store() {
        let session = ctx(UserRole::Manager, None);
        assert!(matches!(
            session.resolve_store_id(None),
            Err(AppError::InvalidInput(_))
        ));
        let target = Uuid::new_v4();
        assert_eq!(session.resolve_store_id(Some(target)).unwrap(), target);
    }

    #[test]
    fn manager_check_is_enforced() {
        assert!(ctx(UserRole::Superadmin, None).require_manager().is_ok());
        assert!(ctx(UserRole::Manager, None).require_manager().is_ok());
        assert!(ctx(UserRole::Store, Some(Uuid::new_v4()))
            .require_manager()
            .is_err());
    }
}
