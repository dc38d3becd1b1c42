//! Authentication endpoints

use axum::routing::post;
use axum::{extract::State, Json, Router};
use std::sync::Arc;

use crate::error::ApiResult;
use crate::models::{LoginRequest, TokenResponse};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/login", post(login))
}

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Incorrect email or password")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let token = crate::auth::login(&state.registry, &state.settings, &credentials).await?;
    Ok(Json(token))
}
