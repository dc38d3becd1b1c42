//! API models

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ApiError, ApiResult};
use crate::tenant::naming;

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LEN: usize = 6;

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompanyCreate {
    /// Company name, unique, case-sensitive as given
    pub name: String,
    /// Admin email, unique
    pub email: String,
    /// Plaintext password, hashed before it ever touches the store
    pub password: String,
}

impl CompanyCreate {
    /// Validate the request before any store access.
    pub fn validate(&self) -> ApiResult<()> {
        naming::validate_company_name(&self.name)?;
        validate_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }
}

/// Public view of a registered company
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompanyResponse {
    pub name: String,
    pub email: String,
    /// Partition identifier, derived from the name at registration
    pub collection_name: String,
    pub id: String,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued bearer token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".into(),
        }
    }
}

/// Teardown confirmation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
}

/// Liveness payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Shallow shape check; real deliverability is out of scope.
fn validate_email(email: &str) -> ApiResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ApiError::Validation("Invalid email address".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, password: &str) -> CompanyCreate {
        CompanyCreate {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn accepts_well_formed_registration() {
        assert!(request("Dream Weddings", "a@b.com", "Secret123!")
            .validate()
            .is_ok());
    }

    #[test]
    fn rejects_short_password() {
        let err = request("Dream Weddings", "a@b.com", "12345")
            .validate()
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn rejects_malformed_email() {
        for email in ["not-an-email", "@b.com", "a@", "a@nodot", "a@.com"] {
            let err = request("Dream Weddings", email, "Secret123!")
                .validate()
                .unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)), "{email}");
        }
    }
}
