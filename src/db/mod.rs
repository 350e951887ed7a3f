//! Persistent store bootstrap for the hedge fund backend.
//!
//! The store is a local SQLite file by default (`DATABASE_URL` overrides it),
//! opened as a process-wide async connection pool. Domain schema objects are
//! created idempotently at startup; the schema itself belongs to the domain
//! layer and is opaque to this module beyond the bootstrap statements.
//!
//! Connections are checked out through [`Database::with_connection`], which
//! guarantees the connection returns to the pool on every exit path.

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};

use crate::config::Settings;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Pool construction or connection checkout failed.
    #[error("connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// A query failed after a connection was obtained.
    #[error("query error: {0}")]
    Query(#[source] sqlx::Error),

    /// Schema bootstrap failed; fatal at startup.
    #[error("schema bootstrap failed: {0}")]
    Schema(#[source] sqlx::Error),
}

/// Default on-disk store, relative to the working directory.
pub const DEFAULT_DATABASE_PATH: &str = "hedgefund.db";

const MAX_POOL_SIZE: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Idempotent bootstrap statements for the domain schema. Create-if-absent
/// only; never destructive, safe to run on every process start.
const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS hedge_fund_flows (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        nodes TEXT,
        edges TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    )",
    "CREATE TABLE IF NOT EXISTS hedge_fund_flow_runs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        flow_id INTEGER REFERENCES hedge_fund_flows(id),
        status TEXT NOT NULL,
        request TEXT,
        result TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    )",
    "CREATE TABLE IF NOT EXISTS api_keys (
        provider TEXT PRIMARY KEY,
        key_value TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    )",
];

/// Pool health statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoolStats {
    /// Total connections currently open.
    pub size: u32,
    /// Connections idle in the pool.
    pub idle: usize,
    /// Configured pool ceiling.
    pub max_size: u32,
}

/// Resolve the store connection string from settings.
///
/// An explicit `DATABASE_URL` wins; otherwise the default local file store is
/// used (created on first connect).
pub fn connection_string(settings: &Settings) -> String {
    settings
        .database_url
        .clone()
        .unwrap_or_else(|| format!("sqlite://{DEFAULT_DATABASE_PATH}"))
}

/// Process-wide handle to the persistent store.
///
/// Cloning is cheap; all clones share the same underlying pool.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the connection pool described by `settings`.
    pub async fn connect(settings: &Settings) -> StoreResult<Self> {
        Self::connect_url(&connection_string(settings)).await
    }

    /// Open the connection pool for an explicit connection string.
    pub async fn connect_url(url: &str) -> StoreResult<Self> {
        // WAL keeps readers and the writer from rejecting each other when
        // independent request tasks hit the same local file.
        let options = SqliteConnectOptions::from_str(url)
            .map_err(StoreError::Connection)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_POOL_SIZE)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(StoreError::Connection)?;

        Ok(Self { pool })
    }

    /// Create missing schema objects.
    ///
    /// Safe to invoke on every process start; existing objects are left
    /// untouched. A failure here means the store is unusable and the caller
    /// must not serve traffic.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        for statement in SCHEMA_STATEMENTS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(StoreError::Schema)?;
        }
        Ok(())
    }

    /// Run `f` with a pooled connection, releasing it on every exit path.
    ///
    /// The connection is an owned pool guard; it returns to the pool when
    /// dropped, whether `f` completes, errors, or the future is cancelled.
    pub async fn with_connection<T, F, Fut>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(PoolConnection<Sqlite>) -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let conn = self.pool.acquire().await.map_err(StoreError::Connection)?;
        f(conn).await
    }

    /// Cheap connectivity probe used by the health endpoint.
    pub async fn health_check(&self) -> StoreResult<bool> {
        self.with_connection(|mut conn| async move {
            sqlx::query("SELECT 1")
                .execute(&mut *conn)
                .await
                .map_err(StoreError::Query)?;
            Ok(true)
        })
        .await
    }

    /// Current pool state for monitoring.
    pub fn pool_stats(&self) -> PoolStats {
        PoolStats {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
            max_size: MAX_POOL_SIZE,
        }
    }

    /// Direct access to the underlying pool for the domain layer.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_string_prefers_explicit_url() {
        let settings = Settings {
            database_url: Some("sqlite:///tmp/override.db".to_string()),
            ..Settings::default()
        };
        assert_eq!(connection_string(&settings), "sqlite:///tmp/override.db");
    }

    #[test]
    fn test_connection_string_defaults_to_local_file() {
        let settings = Settings::default();
        assert_eq!(
            connection_string(&settings),
            format!("sqlite://{DEFAULT_DATABASE_PATH}")
        );
    }
}
