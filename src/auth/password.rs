//! Password hashing
//!
//! bcrypt with a configurable cost factor, so the work factor can be
//! raised as hardware catches up without touching stored hashes.

use crate::error::{ApiError, ApiResult};

/// Hash a password. Salting is bcrypt's job.
pub fn hash_password(password: &str, cost: u32) -> ApiResult<String> {
    bcrypt::hash(password, cost)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// Verify a password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> ApiResult<bool> {
    bcrypt::verify(password, hash)
        .map_err(|e| ApiError::Internal(format!("password verification failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum cost keeps the suite fast.
    const COST: u32 = 4;

    #[test]
    fn verifies_the_original_password_only() {
        let hash = hash_password("Secret123!", COST).unwrap();
        assert!(verify_password("Secret123!", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("Secret123!", COST).unwrap();
        let second = hash_password("Secret123!", COST).unwrap();
        assert_ne!(first, second);
    }
}
