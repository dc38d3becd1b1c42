//! Liveness probe

use axum::Json;

use crate::models::StatusResponse;

/// Static status payload
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is up", body = StatusResponse)
    ),
    tag = "health"
)]
pub async fn liveness() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "active".into(),
        service: env!("CARGO_PKG_NAME").into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}
