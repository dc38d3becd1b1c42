//! Process configuration
//!
//! All settings come from `TENANCY_*` environment variables with
//! development defaults.

use std::time::Duration;

/// Runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Listen address
    pub bind_addr: String,
    /// SQLite database path, or `:memory:`
    pub database_path: String,
    /// HS256 signing key for bearer tokens
    pub secret_key: String,
    /// Token lifetime in minutes
    pub token_ttl_minutes: i64,
    /// bcrypt cost factor
    pub bcrypt_cost: u32,
    /// Deadline for a single store operation
    pub store_timeout: Duration,
    /// How long a tenant may sit in `provisioning` before the
    /// reconciliation sweep removes it
    pub provisioning_timeout: Duration,
    /// Interval between reconciliation sweeps
    pub reconcile_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".into(),
            database_path: "tenancy.db".into(),
            secret_key: "tenancy-dev-secret-change-in-production".into(),
            token_ttl_minutes: 30,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            store_timeout: Duration::from_secs(5),
            provisioning_timeout: Duration::from_secs(300),
            reconcile_interval: Duration::from_secs(60),
        }
    }
}

impl Settings {
    /// Load settings from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: var("TENANCY_BIND", defaults.bind_addr),
            database_path: var("TENANCY_DB", defaults.database_path),
            secret_key: var("TENANCY_SECRET_KEY", defaults.secret_key),
            token_ttl_minutes: parsed("TENANCY_TOKEN_TTL_MINUTES", defaults.token_ttl_minutes),
            bcrypt_cost: parsed("TENANCY_BCRYPT_COST", defaults.bcrypt_cost),
            store_timeout: Duration::from_secs(parsed(
                "TENANCY_STORE_TIMEOUT_SECS",
                defaults.store_timeout.as_secs(),
            )),
            provisioning_timeout: Duration::from_secs(parsed(
                "TENANCY_PROVISIONING_TIMEOUT_SECS",
                defaults.provisioning_timeout.as_secs(),
            )),
            reconcile_interval: Duration::from_secs(parsed(
                "TENANCY_RECONCILE_INTERVAL_SECS",
                defaults.reconcile_interval.as_secs(),
            )),
        }
    }
}

fn var(name: &str, default: String) -> String {
    std::env::var(name).unwrap_or(default)
}

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
