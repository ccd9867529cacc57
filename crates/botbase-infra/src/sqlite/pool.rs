//! Database pool with split reader/writer connections in WAL mode.
//!
//! SQLite allows only one writer at a time. This module provides a `DatabasePool`
//! with a read-only pool for SELECT queries and a single-connection writer pool
//! for serialized writes. Both use WAL journal mode, `synchronous=FULL` and
//! enforce foreign keys.

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

use botbase_types::config::StoreConfig;

const SCHEMA: &str = include_str!("schema.sql");

/// Probes run after bootstrap. A pre-existing file whose tables lack these
/// columns is not a usable store.
const SHAPE_PROBES: [&str; 2] = [
    "SELECT id, name, description FROM bots LIMIT 0",
    "SELECT id, bot_id, content, metadata FROM knowledge_base LIMIT 0",
];

/// Split read/write pool for SQLite with WAL mode.
///
/// - `reader`: read-only pool (`StoreConfig::max_readers` connections).
/// - `writer`: single-connection pool for serialized INSERT/UPDATE/DELETE.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open the store file at `location`, creating it when missing.
    ///
    /// Bootstraps the schema on the writer before opening the reader pool,
    /// then checks that both tables have the expected columns.
    pub async fn open(location: &Path, config: &StoreConfig) -> Result<Self, sqlx::Error> {
        let base_opts = SqliteConnectOptions::new()
            .filename(location)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(config.busy_timeout_secs))
            .create_if_missing(true);

        let read_opts = base_opts.clone().read_only(true);
        let write_opts = base_opts;

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(write_opts)
            .await?;

        let reader = close_on_error(
            &writer,
            open_reader(&writer, read_opts, config.max_readers).await,
        )
        .await?;

        Ok(Self { reader, writer })
    }

    /// Close both pools. Safe to call more than once.
    pub async fn close(&self) {
        self.writer.close().await;
        self.reader.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_closed()
    }
}

/// Bootstrap the schema through `writer`, then open the read-only pool.
async fn open_reader(
    writer: &SqlitePool,
    read_opts: SqliteConnectOptions,
    max_readers: u32,
) -> Result<SqlitePool, sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(writer).await?;
    for probe in SHAPE_PROBES {
        sqlx::query(probe).execute(writer).await?;
    }

    SqlitePoolOptions::new()
        .max_connections(max_readers.max(1))
        .connect_with(read_opts)
        .await
}

/// Close the already-open writer before handing back a failed open.
async fn close_on_error<T>(
    writer: &SqlitePool,
    result: Result<T, sqlx::Error>,
) -> Result<T, sqlx::Error> {
    if let Err(e) = &result {
        tracing::debug!(error = %e, "store open failed, closing writer");
        writer.close().await;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open_temp() -> (tempfile::TempDir, DatabasePool) {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::open(&dir.path().join("test.db"), &StoreConfig::default())
            .await
            .unwrap();
        (dir, pool)
    }

    #[tokio::test]
    async fn test_pool_creates_tables() {
        let (_dir, pool) = open_temp().await;

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool.reader)
        .await
        .unwrap();

        let table_names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        assert_eq!(table_names, vec!["bots", "knowledge_base"]);
    }

    #[tokio::test]
    async fn test_pool_wal_mode() {
        let (_dir, pool) = open_temp().await;

        let result: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool.writer)
            .await
            .unwrap();

        assert_eq!(result.0.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn test_pool_foreign_keys_enforced() {
        let (_dir, pool) = open_temp().await;

        let result: (i32,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool.writer)
            .await
            .unwrap();

        assert_eq!(result.0, 1, "foreign keys should be enabled");
    }

    #[tokio::test]
    async fn test_reopen_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        let pool = DatabasePool::open(&path, &StoreConfig::default()).await.unwrap();
        sqlx::query("INSERT INTO bots (name) VALUES ('Helper')")
            .execute(&pool.writer)
            .await
            .unwrap();
        pool.close().await;

        let pool = DatabasePool::open(&path, &StoreConfig::default()).await.unwrap();
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bots")
            .fetch_one(&pool.reader)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_incompatible_tables_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.db");

        let pool = DatabasePool::open(&path, &StoreConfig::default()).await.unwrap();
        sqlx::raw_sql("DROP TABLE knowledge_base; CREATE TABLE knowledge_base (ID INTEGER, Content TEXT);")
            .execute(&pool.writer)
            .await
            .unwrap();
        pool.close().await;

        assert!(DatabasePool::open(&path, &StoreConfig::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_failed_open_closes_writer() {
        let (_dir, pool) = open_temp().await;

        let result: Result<(), sqlx::Error> =
            close_on_error(&pool.writer, Err(sqlx::Error::PoolTimedOut)).await;
        assert!(result.is_err());
        assert!(pool.writer.is_closed());

        let (_dir, pool) = open_temp().await;
        close_on_error(&pool.writer, Ok(())).await.unwrap();
        assert!(!pool.writer.is_closed());
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (_dir, pool) = open_temp().await;
        pool.close().await;
        pool.close().await;
        assert!(pool.is_closed());
    }
}
