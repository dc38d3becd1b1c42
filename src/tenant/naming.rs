//! Partition naming scheme
//!
//! Deterministic mapping from company name to partition identifier:
//! lowercase, spaces to underscores, `tenant_` prefix. Anything that
//! would produce an unsafe identifier is rejected up front, so the
//! output is always safe to use as a quoted table name.

use crate::error::{ApiError, ApiResult};

/// Namespace tag prepended to every partition identifier
pub const PARTITION_PREFIX: &str = "tenant_";

/// Minimum company name length
pub const MIN_NAME_LEN: usize = 2;

/// Derive the partition identifier for a company name.
///
/// Pure and deterministic; two names that normalize to the same
/// identifier collide on the registry's unique constraint.
pub fn partition_id(name: &str) -> String {
    format!(
        "{PARTITION_PREFIX}{}",
        name.to_ascii_lowercase().replace(' ', "_")
    )
}

/// Validate a company name before it reaches the store.
///
/// Only ASCII alphanumerics, spaces, `-` and `_` are accepted; that rules
/// out path separators, NUL, dots, quotes and anything else the store's
/// namespace rules could choke on.
pub fn validate_company_name(name: &str) -> ApiResult<()> {
    if name.chars().count() < MIN_NAME_LEN {
        return Err(ApiError::Validation(format!(
            "Company name must be at least {MIN_NAME_LEN} characters"
        )));
    }
    if name != name.trim() {
        return Err(ApiError::Validation(
            "Company name must not start or end with whitespace".into(),
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-' || c == '_')
    {
        return Err(ApiError::Validation(
            "Company name may only contain letters, digits, spaces, '-' and '_'".into(),
        ));
    }
    if !name.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(ApiError::Validation(
            "Company name must contain at least one letter or digit".into(),
        ));
    }
    Ok(())
}

/// Whether a string is a partition identifier this scheme could have
/// produced. The store refuses to splice anything else into DDL.
pub fn is_valid_partition_id(id: &str) -> bool {
    id.len() > PARTITION_PREFIX.len()
        && id.starts_with(PARTITION_PREFIX)
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}
