//! Signed finalize token for resumable video uploads.
//!
//! The token is the only state carried between the init, chunk, and finalize
//! phases; the server keeps no in-flight session table. Format:
//! `base64url(json payload) . base64url(HMAC-SHA256(secret, json payload))`.
//! The payload is JSON rather than fixed-width fields because it carries
//! variable-length strings (session URL, filename).

use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;
use vitrina_core::models::upload_file::UploadKind;
use vitrina_core::AppError;

/// Everything the chunk and finalize phases need to validate and complete an
/// upload, pinned to the issuing user and store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeTokenPayload {
    /// Drive resumable session URL chunk PUTs are relayed to
    pub session_url: String,
    pub total_bytes: u64,
    pub mime_type: String,
    /// Destination day folder the finalized file must live in
    pub folder_id: String,
    /// Final Drive filename the finalized file must carry
    pub filename: String,
    pub original_filename: String,
    pub kind: UploadKind,
    pub slot_name: Option<String>,
    pub version_group_id: Uuid,
    pub slot_sequence: i32,
    pub version_number: i32,
    pub supersedes_file_id: Option<Uuid>,
    pub day_id: Uuid,
    pub store_id: Uuid,
    /// Authenticated user the token was issued to
    pub uid: Uuid,
    /// Expiry, unix seconds
    pub exp: i64,
}

fn sign(secret: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret).expect("HMAC accepts any key size");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

fn b64(data: &[u8]) -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(data)
}

fn b64_decode(s: &str) -> Result<Vec<u8>, AppError> {
    base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(s)
        .map_err(|_| AppError::TokenInvalid("Malformed token encoding".to_string()))
}

/// Serialize and sign a payload. The caller sets `exp`.
pub fn issue(payload: &FinalizeTokenPayload, secret: &[u8]) -> Result<String, AppError> {
    let body = serde_json::to_vec(payload)?;
    let tag = sign(secret, &body);
    Ok(format!("{}.{}", b64(&body), b64(&tag)))
}

/// Verify signature and expiry, returning the embedded payload. The MAC is
/// checked before anything in the payload is trusted.
pub fn verify(token: &str, secret: &[u8], now: DateTime<Utc>) -> Result<FinalizeTokenPayload, AppError> {
    let (body_part, tag_part) = token
        .split_once('.')
        .ok_or_else(|| AppError::TokenInvalid("Malformed token".to_string()))?;
    let body = b64_decode(body_part)?;
    let tag = b64_decode(tag_part)?;

    let expected = sign(secret, &body);
    if expected.ct_eq(&tag).unwrap_u8() != 1 {
        return Err(AppError::TokenInvalid("Signature mismatch".to_string()));
    }

    let payload: FinalizeTokenPayload = serde_json::from_slice(&body)
        .map_err(|_| AppError::TokenInvalid("Malformed token payload".to_string()))?;

    if now.timestamp() > payload.exp {
        return Err(AppError::TokenExpired);
    }

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const SECRET: &[u8] = b"finalize-token-test-secret-0123456789abcdef";

    fn payload(exp: DateTime<Utc>) -> FinalizeTokenPayload {
        FinalizeTokenPayload {
            session_url: "https://upload.example/session/xyz".to_string(),
            total_bytes: 10_485_760,
            mime_type: "video/mp4".to_string(),
            folder_id: "folder-1".to_string(),
            filename: "VIDEO_01_v1.mp4".to_string(),
            original_filename: "clip.mp4".to_string(),
            kind: UploadKind::Video,
            slot_name: None,
            version_group_id: Uuid::new_v4(),
            slot_sequence: 1,
            version_number: 1,
            supersedes_file_id: None,
            day_id: Uuid::new_v4(),
            store_id: Uuid::new_v4(),
            uid: Uuid::new_v4(),
            exp: exp.timestamp(),
        }
    }

    #[test]
    fn round_trip_preserves_payload() {
        let now = Utc::now();
        let original = payload(now + Duration::minutes(30));
        let token = issue(&original, SECRET).unwrap();
        let decoded = verify(&token, SECRET, now).unwrap();
        assert_eq!(decoded.session_url, original.session_url);
        assert_eq!(decoded.total_bytes, original.total_bytes);
        assert_eq!(decoded.day_id, original.day_id);
        assert_eq!(decoded.uid, original.uid);
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now();
        let token = issue(&payload(now - Duration::minutes(1)), SECRET).unwrap();
        assert!(matches!(
            verify(&token, SECRET, now),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let now = Utc::now();
        let token = issue(&payload(now + Duration::minutes(30)), SECRET).unwrap();
        let (body, tag) = token.split_once('.').unwrap();
        // Re-encode a modified payload under the original tag.
        let mut json: serde_json::Value = serde_json::from_slice(
            &base64::engine::general_purpose::URL_SAFE_NO_PAD
                .decode(body)
                .unwrap(),
        )
        .unwrap();
        json["total_bytes"] = serde_json::json!(1);
        let forged = format!(
            "{}.{}",
            base64::engine::general_purpose::URL_SAFE_NO_PAD
                .encode(serde_json::to_vec(&json).unwrap()),
            tag
        );
        assert!(matches!(
            verify(&forged, SECRET, now),
            Err(AppError::TokenInvalid(_))
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let now = Utc::now();
        let token = issue(&payload(now + Duration::minutes(30)), SECRET).unwrap();
        assert!(verify(&token, b"another-secret-another-secret-12", now).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let now = Utc::now();
        assert!(verify("not-a-token", SECRET, now).is_err());
        assert!(verify("a.b", SECRET, now).is_err());
    }
}
