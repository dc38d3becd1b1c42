//! API error taxonomy
//!
//! One HTTP status per error kind. Internal detail is logged server-side
//! and never included in a response body.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error kinds
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input: bad email shape, short password, unsafe company name
    #[error("validation error: {0}")]
    Validation(String),

    /// Duplicate company name, email, or partition id
    #[error("conflict: {0}")]
    Conflict(String),

    /// Company absent from the registry
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad credentials or missing/invalid bearer token
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Valid token, but for a different tenant
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Store operation exceeded its deadline
    #[error("store operation timed out")]
    Timeout,

    /// Store I/O failure
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    /// Anything else that should never reach a client verbatim
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// The one Unauthorized issued by login, identical for unknown email
    /// and wrong password.
    pub fn bad_credentials() -> Self {
        ApiError::Unauthorized("Incorrect email or password".into())
    }

    /// Unauthorized for a missing or unverifiable bearer token.
    pub fn bad_token() -> Self {
        ApiError::Unauthorized("Not authenticated".into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            // 400 rather than 409: the public surface predates this
            // implementation and clients key on it.
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ApiError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "Store operation timed out".to_string(),
            ),
            ApiError::Store(_) | ApiError::Internal(_) => {
                tracing::error!("internal error: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Result alias used throughout the crate
pub type ApiResult<T> = Result<T, ApiError>;
