//! Company management endpoints

use axum::routing::{get, post};
use axum::{
    extract::{Path, State},
    Json, Router,
};
use std::sync::Arc;

use crate::auth::Claims;
use crate::error::{ApiError, ApiResult};
use crate::models::{CompanyCreate, CompanyResponse, DeleteResponse};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register_company))
        .route("/:name", get(get_company).delete(delete_company))
}

/// Register a company and provision its data partition
#[utoipa::path(
    post,
    path = "/company/register",
    request_body = CompanyCreate,
    responses(
        (status = 200, description = "Company registered", body = CompanyResponse),
        (status = 400, description = "Name or email already taken"),
        (status = 422, description = "Invalid input")
    ),
    tag = "company"
)]
pub async fn register_company(
    State(state): State<Arc<AppState>>,
    Json(input): Json<CompanyCreate>,
) -> ApiResult<Json<CompanyResponse>> {
    let view = state.provisioner.create_tenant(&input).await?;
    Ok(Json(view))
}

/// Look up a company by name
#[utoipa::path(
    get,
    path = "/company/{name}",
    params(("name" = String, Path, description = "Company name")),
    responses(
        (status = 200, description = "Company view", body = CompanyResponse),
        (status = 404, description = "Company not found")
    ),
    tag = "company"
)]
pub async fn get_company(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<CompanyResponse>> {
    let view = state.provisioner.get_tenant(&name).await?;
    Ok(Json(view))
}

/// Delete a company and its partition; owner only
#[utoipa::path(
    delete,
    path = "/company/{name}",
    params(("name" = String, Path, description = "Company name")),
    responses(
        (status = 200, description = "Company deleted", body = DeleteResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token is for a different company"),
        (status = 404, description = "Company not found")
    ),
    security(("bearer_token" = [])),
    tag = "company"
)]
pub async fn delete_company(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    claims: Claims,
) -> ApiResult<Json<DeleteResponse>> {
    // Possession of any valid token is not enough; the claim must name
    // the company being deleted.
    if claims.company != name {
        return Err(ApiError::Forbidden(
            "Token does not grant access to this company".into(),
        ));
    }

    let record = state.provisioner.delete_tenant(&name).await?;
    Ok(Json(DeleteResponse {
        message: format!("Company {} and its data have been deleted.", record.name),
    }))
}
