//! Multi-tenant company registry and authentication API
//!
//! A master registry of companies, each granted an isolated data
//! partition, plus password-based authentication issuing bearer tokens.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         REST API                             │
//! │   /company/register | /company/{name} | /auth/login | /      │
//! └──────────────────────────────────────────────────────────────┘
//!          │                    │                    │
//!   ┌──────────────┐    ┌──────────────┐     ┌──────────────┐
//!   │ Provisioning │    │    Tenant    │     │     Auth     │
//!   │   workflow   │───▶│   registry   │◀────│   workflow   │
//!   └──────────────┘    └──────────────┘     └──────────────┘
//!          │                    │
//!   ┌──────────────────────────────────────┐
//!   │        shared SQLite store           │
//!   │  companies table + tenant_* tables   │
//!   └──────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![allow(dead_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;
pub mod tenant;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

pub use config::Settings;
pub use error::{ApiError, ApiResult};
pub use models::*;

use store::Store;
use tenant::{Provisioner, Registry};

/// Shared application state
pub struct AppState {
    /// Runtime settings
    pub settings: Settings,
    /// Master tenant table
    pub registry: Registry,
    /// Provisioning workflow
    pub provisioner: Provisioner,
    /// Shared persistent store
    pub store: Store,
}

/// Connect the store and assemble the application state.
pub async fn build_state(settings: Settings) -> ApiResult<Arc<AppState>> {
    let store = Store::connect(&settings.database_path, settings.store_timeout).await?;
    let registry = Registry::new(store.clone());
    let provisioner = Provisioner::new(
        registry.clone(),
        store.clone(),
        settings.bcrypt_cost,
        settings.provisioning_timeout,
    );
    Ok(Arc::new(AppState {
        settings,
        registry,
        provisioner,
        store,
    }))
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tenancy API",
        version = "0.1.0",
        description = "Multi-tenant company registry and authentication API"
    ),
    paths(
        routes::health::liveness,
        routes::company::register_company,
        routes::company::get_company,
        routes::company::delete_company,
        routes::auth::login,
    ),
    components(
        schemas(
            CompanyCreate, CompanyResponse, LoginRequest,
            TokenResponse, DeleteResponse, StatusResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness probe"),
        (name = "company", description = "Company registration and teardown"),
        (name = "auth", description = "Authentication")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Build the API router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(routes::health::liveness))
        .nest("/company", routes::company::router())
        .nest("/auth", routes::auth::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_defines_the_bearer_scheme_it_references() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();

        let scheme = &doc["components"]["securitySchemes"]["bearer_token"];
        assert_eq!(scheme["type"], "http");
        assert_eq!(scheme["scheme"], "bearer");

        // The delete endpoint is the one that points at it.
        let delete_security = &doc["paths"]["/company/{name}"]["delete"]["security"];
        assert!(delete_security
            .as_array()
            .is_some_and(|entries| entries
                .iter()
                .any(|entry| entry.get("bearer_token").is_some())));
    }
}
