//! Bearer tokens
//!
//! HS256-signed, carrying subject (email) and tenant name with an
//! expiry. Verification is stateless; there is no revocation list.

use std::sync::Arc;

use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the company admin's email
    pub sub: String,
    /// Tenant name the token was issued for
    pub company: String,
    /// Expiry, unix seconds
    pub exp: usize,
}

/// Issue a signed token for a company admin.
pub fn issue_token(
    subject: &str,
    company: &str,
    ttl_minutes: i64,
    key: &[u8],
) -> ApiResult<String> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::minutes(ttl_minutes))
        .ok_or_else(|| ApiError::Internal("token expiry out of range".into()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: subject.to_string(),
        company: company.to_string(),
        exp: expiration,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(key))
        .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
}

/// Verify signature and expiry; anything wrong is the same `Unauthorized`.
pub fn verify_token(token: &str, key: &[u8]) -> ApiResult<Claims> {
    decode::<Claims>(token, &DecodingKey::from_secret(key), &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| ApiError::bad_token())
}

/// Extractor: pulls and verifies the `Authorization: Bearer` header.
#[async_trait]
impl FromRequestParts<Arc<AppState>> for Claims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(ApiError::bad_token)?;

        verify_token(token, state.settings.secret_key.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test-signing-key";

    #[test]
    fn roundtrip_preserves_claims() {
        let token = issue_token("a@b.com", "Dream Weddings", 30, KEY).unwrap();
        let claims = verify_token(&token, KEY).unwrap();
        assert_eq!(claims.sub, "a@b.com");
        assert_eq!(claims.company, "Dream Weddings");
    }

    #[test]
    fn rejects_expired_tokens() {
        // Far enough in the past to clear the default leeway.
        let token = issue_token("a@b.com", "Dream Weddings", -5, KEY).unwrap();
        let err = verify_token(&token, KEY).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn rejects_wrong_key() {
        let token = issue_token("a@b.com", "Dream Weddings", 30, KEY).unwrap();
        let err = verify_token(&token, b"other-key").unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }
}
