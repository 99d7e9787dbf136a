use crate::auth::models::{SessionClaims, SessionContext};
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use vitrina_core::AppError;

/// Verification state for the session JWT middleware. Token issuance lives
/// in the identity service; only the shared secret is needed here.
#[derive(Clone)]
pub struct AuthState {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthState {
    pub fn new(jwt_secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation,
        }
    }

    fn verify(&self, token: &str) -> Result<SessionContext, AppError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid session token: {}", e)))?;
        Ok(SessionContext {
            user_id: data.claims.sub,
            store_id: data.claims.store_id,
            role: data.claims.role,
        })
    }
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return HttpAppError(AppError::Unauthorized(
            "Invalid authorization header format".to_string(),
        ))
        .into_response();
    };

    match auth_state.verify(token) {
        Ok(session) => {
            tracing::debug!(user_id = %session.user_id, role = %session.role, "Session authenticated");
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(e) => HttpAppError(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::UserRole;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    const SECRET: &str = "session-test-secret-0123456789abcdef0123";

    fn token(claims: &SessionClaims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(offset_minutes: i64) -> SessionClaims {
        let now = Utc::now();
        SessionClaims {
            sub: Uuid::new_v4(),
            store_id: Some(Uuid::new_v4()),
            role: UserRole::Store,
            exp: (now + Duration::minutes(offset_minutes)).timestamp(),
            iat: now.timestamp(),
        }
    }

    #[test]
    fn valid_token_yields_session_context() {
        let auth = AuthState::new(SECRET);
        let c = claims(60);
        let session = auth.verify(&token(&c, SECRET)).unwrap();
        assert_eq!(session.user_id, c.sub);
        assert_eq!(session.store_id, c.store_id);
        assert_eq!(session.role, UserRole::Store);
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = AuthState::new(SECRET);
        let result = auth.verify(&token(&claims(-60), SECRET));
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let auth = AuthState::new(SECRET);
        let result = auth.verify(&token(&claims(60), "other-secret-other-secret-12345678"));
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
}
