//! SQLite-backed persistent store
//!
//! One shared pool for the master registry and every tenant partition.
//! A partition is a dynamically named table of JSON documents; its name
//! always comes out of [`crate::tenant::naming`], which restricts the
//! charset enough to splice the identifier into quoted DDL.

use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::Row;

use crate::error::{ApiError, ApiResult};
use crate::tenant::naming;

/// Handle to the shared store. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
    op_timeout: Duration,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("op_timeout", &self.op_timeout)
            .finish()
    }
}

impl Store {
    /// Open (or create) the database and prepare the registry table.
    pub async fn connect(database_path: &str, op_timeout: Duration) -> ApiResult<Self> {
        let in_memory = database_path == ":memory:";
        let options = if in_memory {
            SqliteConnectOptions::from_str("sqlite::memory:")?
        } else {
            SqliteConnectOptions::from_str(&format!("sqlite:{database_path}"))?
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .busy_timeout(Duration::from_secs(5))
        };

        // An in-memory database exists per connection; the pool must not
        // fan out or each worker would see an empty store.
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 10 })
            .connect_with(options)
            .await?;

        let store = Self { pool, op_timeout };
        store.init().await?;
        tracing::info!(path = database_path, "store connected");
        Ok(store)
    }

    async fn init(&self) -> ApiResult<()> {
        self.deadline(
            sqlx::query(
                r#"
                CREATE TABLE IF NOT EXISTS companies (
                    id            TEXT PRIMARY KEY,
                    name          TEXT NOT NULL UNIQUE,
                    email         TEXT NOT NULL UNIQUE,
                    password_hash TEXT NOT NULL,
                    partition_id  TEXT NOT NULL UNIQUE,
                    status        TEXT NOT NULL,
                    created_at    INTEGER NOT NULL
                )
                "#,
            )
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    /// The shared connection pool, for registry queries.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run a store future under the per-operation deadline.
    pub async fn deadline<T, F>(&self, fut: F) -> ApiResult<T>
    where
        F: std::future::Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result.map_err(ApiError::from),
            Err(_) => Err(ApiError::Timeout),
        }
    }

    /// Create a tenant partition and seed its config document.
    ///
    /// Any stale table under the same name (left by a crashed teardown) is
    /// dropped first so the partition always starts fresh.
    pub async fn create_partition(&self, partition_id: &str, admin_email: &str) -> ApiResult<()> {
        check_identifier(partition_id)?;
        self.drop_partition(partition_id).await?;
        self.deadline(
            sqlx::query(&format!(
                r#"CREATE TABLE "{partition_id}" (
                    id  INTEGER PRIMARY KEY AUTOINCREMENT,
                    doc TEXT NOT NULL
                )"#
            ))
            .execute(&self.pool),
        )
        .await?;

        let config = json!({
            "type": "config",
            "created_at": Utc::now().to_rfc3339(),
            "admin_email": admin_email,
        });
        self.deadline(
            sqlx::query(&format!(r#"INSERT INTO "{partition_id}" (doc) VALUES (?)"#))
                .bind(config.to_string())
                .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    /// Drop a tenant partition. A missing partition is a no-op.
    pub async fn drop_partition(&self, partition_id: &str) -> ApiResult<()> {
        check_identifier(partition_id)?;
        self.deadline(
            sqlx::query(&format!(r#"DROP TABLE IF EXISTS "{partition_id}""#)).execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    /// Whether a partition table currently exists.
    pub async fn partition_exists(&self, partition_id: &str) -> ApiResult<bool> {
        let row = self
            .deadline(
                sqlx::query("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?")
                    .bind(partition_id)
                    .fetch_optional(&self.pool),
            )
            .await?;
        Ok(row.is_some())
    }

    /// All documents in a partition, insertion order.
    pub async fn partition_docs(&self, partition_id: &str) -> ApiResult<Vec<serde_json::Value>> {
        check_identifier(partition_id)?;
        let rows = self
            .deadline(
                sqlx::query(&format!(r#"SELECT doc FROM "{partition_id}" ORDER BY id"#))
                    .fetch_all(&self.pool),
            )
            .await?;
        rows.into_iter()
            .map(|row| {
                let doc: String = row.get("doc");
                serde_json::from_str(&doc)
                    .map_err(|e| ApiError::Internal(format!("corrupt partition document: {e}")))
            })
            .collect()
    }
}

/// Refuse to splice anything that did not come out of the naming scheme.
fn check_identifier(partition_id: &str) -> ApiResult<()> {
    if naming::is_valid_partition_id(partition_id) {
        Ok(())
    } else {
        Err(ApiError::Internal(format!(
            "unsafe partition identifier: {partition_id:?}"
        )))
    }
}
