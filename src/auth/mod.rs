//! Authentication
//!
//! Password verification against the registry plus bearer-token issuance.

pub mod password;
pub mod token;

pub use token::Claims;

use crate::config::Settings;
use crate::error::{ApiError, ApiResult};
use crate::models::{LoginRequest, TokenResponse};
use crate::tenant::Registry;

/// Authenticate a company admin and issue a bearer token.
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    registry: &Registry,
    settings: &Settings,
    credentials: &LoginRequest,
) -> ApiResult<TokenResponse> {
    let record = registry
        .find_by_email(&credentials.email)
        .await?
        .ok_or_else(ApiError::bad_credentials)?;

    if !password::verify_password(&credentials.password, &record.password_hash)? {
        return Err(ApiError::bad_credentials());
    }

    let token = token::issue_token(
        &record.email,
        &record.name,
        settings.token_ttl_minutes,
        settings.secret_key.as_bytes(),
    )?;
    tracing::debug!(company = %record.name, "login succeeded");
    Ok(TokenResponse::bearer(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use crate::tenant::registry::CompanyRecord;
    use std::time::Duration;

    async fn registry_with_company() -> (Registry, Settings) {
        let store = Store::connect(":memory:", Duration::from_secs(5))
            .await
            .unwrap();
        let registry = Registry::new(store);

        let hash = password::hash_password("Secret123!", 4).unwrap();
        let record = CompanyRecord::new("Dream Weddings", "a@b.com", hash);
        registry.insert_provisioning(&record).await.unwrap();
        registry.activate(&record.id).await.unwrap();

        let settings = Settings {
            bcrypt_cost: 4,
            ..Settings::default()
        };
        (registry, settings)
    }

    fn credentials(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn login_issues_a_decodable_token() {
        let (registry, settings) = registry_with_company().await;
        let response = login(&registry, &settings, &credentials("a@b.com", "Secret123!"))
            .await
            .unwrap();
        assert_eq!(response.token_type, "bearer");

        let claims =
            token::verify_token(&response.access_token, settings.secret_key.as_bytes()).unwrap();
        assert_eq!(claims.sub, "a@b.com");
        assert_eq!(claims.company, "Dream Weddings");
    }

    #[tokio::test]
    async fn both_failure_paths_are_identical() {
        let (registry, settings) = registry_with_company().await;

        let wrong_password = login(&registry, &settings, &credentials("a@b.com", "nope"))
            .await
            .unwrap_err();
        let unknown_email = login(&registry, &settings, &credentials("who@b.com", "Secret123!"))
            .await
            .unwrap_err();

        match (wrong_password, unknown_email) {
            (ApiError::Unauthorized(a), ApiError::Unauthorized(b)) => assert_eq!(a, b),
            other => panic!("expected two Unauthorized, got {other:?}"),
        }
    }
}
