//! Tenant registry
//!
//! Master table of companies. Uniqueness of name, email and partition id
//! is enforced by the store's compound unique constraints, so a
//! registration race cannot slip two rows past the check-then-insert gap.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::CompanyResponse;
use crate::store::Store;
use crate::tenant::naming;

/// Lifecycle states of a registry row
pub mod status {
    /// Row committed, partition not yet created
    pub const PROVISIONING: &str = "provisioning";
    /// Partition created and seeded
    pub const ACTIVE: &str = "active";
    /// Teardown in progress
    pub const DELETING: &str = "deleting";
}

/// A company's registry record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompanyRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub partition_id: String,
    pub status: String,
    pub created_at: i64,
}

impl CompanyRecord {
    /// Build a fresh record in `provisioning` state.
    pub fn new(name: &str, email: &str, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            partition_id: naming::partition_id(name),
            status: status::PROVISIONING.to_string(),
            created_at: Utc::now().timestamp(),
        }
    }

    /// Public view; never exposes the password hash or status.
    pub fn public_view(&self) -> CompanyResponse {
        CompanyResponse {
            name: self.name.clone(),
            email: self.email.clone(),
            collection_name: self.partition_id.clone(),
            id: self.id.clone(),
        }
    }
}

const COLUMNS: &str = "id, name, email, password_hash, partition_id, status, created_at";

/// Registry operations against the `companies` table
#[derive(Debug, Clone)]
pub struct Registry {
    store: Store,
}

impl Registry {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Insert a record in `provisioning` state. A unique violation on any
    /// of name, email or partition id surfaces as `Conflict`.
    pub async fn insert_provisioning(&self, record: &CompanyRecord) -> ApiResult<()> {
        let result = self
            .store
            .deadline(
                sqlx::query(
                    "INSERT INTO companies (id, name, email, password_hash, partition_id, status, created_at) \
                     VALUES (?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(&record.id)
                .bind(&record.name)
                .bind(&record.email)
                .bind(&record.password_hash)
                .bind(&record.partition_id)
                .bind(&record.status)
                .bind(record.created_at)
                .execute(self.store.pool()),
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(ApiError::Store(sqlx::Error::Database(db))) if db.is_unique_violation() => {
                Err(conflict_for(db.message()))
            }
            Err(e) => Err(e),
        }
    }

    /// Flip a row from `provisioning` to `active`.
    pub async fn activate(&self, id: &str) -> ApiResult<()> {
        self.store
            .deadline(
                sqlx::query("UPDATE companies SET status = ? WHERE id = ? AND status = ?")
                    .bind(status::ACTIVE)
                    .bind(id)
                    .bind(status::PROVISIONING)
                    .execute(self.store.pool()),
            )
            .await?;
        Ok(())
    }

    /// Look up an active company by name.
    pub async fn find_by_name(&self, name: &str) -> ApiResult<Option<CompanyRecord>> {
        self.store
            .deadline(
                sqlx::query_as::<_, CompanyRecord>(&format!(
                    "SELECT {COLUMNS} FROM companies WHERE name = ? AND status = ?"
                ))
                .bind(name)
                .bind(status::ACTIVE)
                .fetch_optional(self.store.pool()),
            )
            .await
    }

    /// Look up an active company by email.
    pub async fn find_by_email(&self, email: &str) -> ApiResult<Option<CompanyRecord>> {
        self.store
            .deadline(
                sqlx::query_as::<_, CompanyRecord>(&format!(
                    "SELECT {COLUMNS} FROM companies WHERE email = ? AND status = ?"
                ))
                .bind(email)
                .bind(status::ACTIVE)
                .fetch_optional(self.store.pool()),
            )
            .await
    }

    /// Compare-and-swap an active row into `deleting`, returning it.
    ///
    /// The CAS serializes concurrent teardowns (and a teardown racing a
    /// not-yet-committed creation): only one caller wins the transition.
    pub async fn begin_delete(&self, name: &str) -> ApiResult<Option<CompanyRecord>> {
        self.store
            .deadline(
                sqlx::query_as::<_, CompanyRecord>(&format!(
                    "UPDATE companies SET status = ? WHERE name = ? AND status = ? \
                     RETURNING {COLUMNS}"
                ))
                .bind(status::DELETING)
                .bind(name)
                .bind(status::ACTIVE)
                .fetch_optional(self.store.pool()),
            )
            .await
    }

    /// Remove a row outright.
    pub async fn remove(&self, id: &str) -> ApiResult<()> {
        self.store
            .deadline(
                sqlx::query("DELETE FROM companies WHERE id = ?")
                    .bind(id)
                    .execute(self.store.pool()),
            )
            .await?;
        Ok(())
    }

    /// Rows the reconciliation sweep may reclaim: stuck in `provisioning`
    /// since before `cutoff` (unix seconds), or left in `deleting` by an
    /// interrupted teardown. Finishing a teardown is idempotent, so
    /// `deleting` rows are reclaimable at any age.
    pub async fn reclaimable(&self, cutoff: i64) -> ApiResult<Vec<CompanyRecord>> {
        self.store
            .deadline(
                sqlx::query_as::<_, CompanyRecord>(&format!(
                    "SELECT {COLUMNS} FROM companies \
                     WHERE (status = ? AND created_at < ?) OR status = ?"
                ))
                .bind(status::PROVISIONING)
                .bind(cutoff)
                .bind(status::DELETING)
                .fetch_all(self.store.pool()),
            )
            .await
    }
}

/// Map a unique-violation message to the field that collided.
fn conflict_for(message: &str) -> ApiError {
    if message.contains("companies.email") {
        ApiError::Conflict("Email already registered".into())
    } else if message.contains("companies.partition_id") {
        ApiError::Conflict("Company name conflicts with an existing data partition".into())
    } else {
        ApiError::Conflict("Company name already exists".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn registry() -> Registry {
        let store = Store::connect(":memory:", Duration::from_secs(5))
            .await
            .unwrap();
        Registry::new(store)
    }

    fn record(name: &str, email: &str) -> CompanyRecord {
        CompanyRecord::new(name, email, "$2b$04$hash".into())
    }

    #[tokio::test]
    async fn provisioning_rows_are_invisible_to_lookups() {
        let registry = registry().await;
        let rec = record("Acme", "a@acme.com");
        registry.insert_provisioning(&rec).await.unwrap();

        assert!(registry.find_by_name("Acme").await.unwrap().is_none());
        registry.activate(&rec.id).await.unwrap();
        let found = registry.find_by_name("Acme").await.unwrap().unwrap();
        assert_eq!(found.status, status::ACTIVE);
        assert_eq!(found.partition_id, "tenant_acme");
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let registry = registry().await;
        registry
            .insert_provisioning(&record("Acme", "a@acme.com"))
            .await
            .unwrap();

        let err = registry
            .insert_provisioning(&record("Other Co", "a@acme.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(msg) if msg.contains("Email")));
    }

    #[tokio::test]
    async fn partition_collision_is_a_conflict() {
        let registry = registry().await;
        registry
            .insert_provisioning(&record("Dream Weddings", "a@b.com"))
            .await
            .unwrap();

        // Distinct name, same normalized partition id.
        let err = registry
            .insert_provisioning(&record("dream weddings", "c@d.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn begin_delete_wins_exactly_once() {
        let registry = registry().await;
        let rec = record("Acme", "a@acme.com");
        registry.insert_provisioning(&rec).await.unwrap();
        registry.activate(&rec.id).await.unwrap();

        assert!(registry.begin_delete("Acme").await.unwrap().is_some());
        assert!(registry.begin_delete("Acme").await.unwrap().is_none());
    }
}
