//! Provisioning workflow
//!
//! Registry-first ordering: the registry row lands in `provisioning`
//! before the partition exists, so a crash can never leave a partition
//! with no record pointing at it. A failed partition creation triggers
//! the compensating deletion of the row. [`Provisioner::reconcile`]
//! mops up both crash windows: rows stuck in `provisioning` past the
//! timeout, and rows left in `deleting` by an interrupted teardown.

use std::time::Duration;

use chrono::Utc;

use crate::auth::password;
use crate::error::{ApiError, ApiResult};
use crate::models::{CompanyCreate, CompanyResponse};
use crate::store::Store;
use crate::tenant::registry::{CompanyRecord, Registry};

/// Orchestrates tenant creation, teardown and reconciliation.
#[derive(Debug, Clone)]
pub struct Provisioner {
    registry: Registry,
    store: Store,
    bcrypt_cost: u32,
    provisioning_timeout: Duration,
}

impl Provisioner {
    pub fn new(
        registry: Registry,
        store: Store,
        bcrypt_cost: u32,
        provisioning_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            store,
            bcrypt_cost,
            provisioning_timeout,
        }
    }

    /// Register a company and provision its partition.
    pub async fn create_tenant(&self, request: &CompanyCreate) -> ApiResult<CompanyResponse> {
        request.validate()?;

        let password_hash = password::hash_password(&request.password, self.bcrypt_cost)?;
        let record = CompanyRecord::new(&request.name, &request.email, password_hash);

        // Uniqueness of name, email and partition id is decided here, in
        // one atomic insert.
        self.registry.insert_provisioning(&record).await?;

        if let Err(e) = self
            .store
            .create_partition(&record.partition_id, &record.email)
            .await
        {
            // Compensating action; a failure here leaves the row for the
            // reconciliation sweep.
            if let Err(cleanup) = self.registry.remove(&record.id).await {
                tracing::warn!(
                    company = %record.name,
                    error = %cleanup,
                    "failed to roll back provisioning row"
                );
            }
            return Err(e);
        }

        self.registry.activate(&record.id).await?;
        tracing::info!(company = %record.name, partition = %record.partition_id, "tenant provisioned");
        Ok(record.public_view())
    }

    /// Look up an active company by name.
    pub async fn get_tenant(&self, name: &str) -> ApiResult<CompanyResponse> {
        self.registry
            .find_by_name(name)
            .await?
            .map(|record| record.public_view())
            .ok_or_else(|| ApiError::NotFound("Company not found".into()))
    }

    /// Tear down a company: partition first, registry record second.
    ///
    /// Ordering means a crash mid-sequence leaves a registry row in
    /// `deleting` pointing at a possibly-missing partition, rather than
    /// an orphan partition owned by nobody; the reconciliation sweep
    /// finishes such teardowns. The drop itself tolerates a missing
    /// partition.
    pub async fn delete_tenant(&self, name: &str) -> ApiResult<CompanyRecord> {
        let record = self
            .registry
            .begin_delete(name)
            .await?
            .ok_or_else(|| ApiError::NotFound("Company not found".into()))?;

        self.store.drop_partition(&record.partition_id).await?;
        self.registry.remove(&record.id).await?;

        tracing::info!(company = %record.name, "tenant deleted");
        Ok(record)
    }

    /// Reclaim tenants a crash left behind in either direction: rows
    /// stuck in `provisioning` past the timeout (partition dropped, row
    /// removed) and rows in `deleting` whose teardown never finished
    /// (same two idempotent steps). Returns the number of rows reclaimed.
    pub async fn reconcile(&self) -> ApiResult<usize> {
        let cutoff = Utc::now().timestamp() - self.provisioning_timeout.as_secs() as i64;
        let stale = self.registry.reclaimable(cutoff).await?;
        let count = stale.len();

        for record in stale {
            tracing::warn!(
                company = %record.name,
                partition = %record.partition_id,
                status = %record.status,
                "reclaiming tenant left behind by an interrupted workflow"
            );
            self.store.drop_partition(&record.partition_id).await?;
            self.registry.remove(&record.id).await?;
        }

        if count > 0 {
            tracing::info!(count, "reconciliation sweep reclaimed stale tenants");
        }
        Ok(count)
    }
}
