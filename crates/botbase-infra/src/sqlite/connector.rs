//! Store connector: atomic statement execution over the split pools.
//!
//! Reads stream rows lazily from the read-only pool. Every write runs inside a
//! transaction on the single writer connection and is either committed as a
//! whole or rolled back. SQLite failures are folded into `StoreError` kinds.

use std::path::Path;

use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use sqlx::error::ErrorKind;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row, Sqlite, TypeInfo, ValueRef};

use botbase_types::config::StoreConfig;
use botbase_types::error::StoreError;

use super::pool::DatabasePool;

// SQLite primary result codes that mean the store itself is unusable.
const SQLITE_PERM: i32 = 3;
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;
const SQLITE_READONLY: i32 = 8;
const SQLITE_IOERR: i32 = 10;
const SQLITE_CORRUPT: i32 = 11;
const SQLITE_FULL: i32 = 13;
const SQLITE_CANTOPEN: i32 = 14;
const SQLITE_CONSTRAINT: i32 = 19;
const SQLITE_NOTADB: i32 = 26;

/// A single column value.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<i64> for StoreValue {
    fn from(v: i64) -> Self {
        StoreValue::Integer(v)
    }
}

impl From<&str> for StoreValue {
    fn from(v: &str) -> Self {
        StoreValue::Text(v.to_string())
    }
}

impl From<String> for StoreValue {
    fn from(v: String) -> Self {
        StoreValue::Text(v)
    }
}

impl<T: Into<StoreValue>> From<Option<T>> for StoreValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(StoreValue::Null, Into::into)
    }
}

/// One result row: column names mapped to values, in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreRow {
    columns: Vec<(String, StoreValue)>,
}

impl StoreRow {
    pub fn get(&self, column: &str) -> Option<&StoreValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn integer(&self, column: &str) -> Result<i64, StoreError> {
        match self.get(column) {
            Some(StoreValue::Integer(v)) => Ok(*v),
            other => Err(unexpected(column, "integer", other)),
        }
    }

    pub fn text(&self, column: &str) -> Result<String, StoreError> {
        match self.get(column) {
            Some(StoreValue::Text(v)) => Ok(v.clone()),
            other => Err(unexpected(column, "text", other)),
        }
    }

    pub fn optional_text(&self, column: &str) -> Result<Option<String>, StoreError> {
        match self.get(column) {
            Some(StoreValue::Null) => Ok(None),
            Some(StoreValue::Text(v)) => Ok(Some(v.clone())),
            other => Err(unexpected(column, "text or NULL", other)),
        }
    }
}

fn unexpected(column: &str, wanted: &str, found: Option<&StoreValue>) -> StoreError {
    match found {
        None => StoreError::Query(format!("column '{column}' missing from row")),
        Some(value) => StoreError::Query(format!(
            "column '{column}': expected {wanted}, found {value:?}"
        )),
    }
}

/// A mutating statement for `execute_transaction`.
#[derive(Debug, Clone)]
pub struct WriteStatement {
    pub sql: String,
    pub params: Vec<StoreValue>,
    /// Fail the whole transaction with `StoreError::NotFound` when this
    /// statement touches no rows.
    pub require_rows: bool,
}

impl WriteStatement {
    pub fn new(sql: impl Into<String>, params: Vec<StoreValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
            require_rows: false,
        }
    }

    pub fn require_rows(mut self) -> Self {
        self.require_rows = true;
        self
    }
}

/// Result of one committed statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    pub rows_affected: u64,
    /// Rowid of the most recent successful INSERT on the writer connection.
    pub last_insert_rowid: i64,
}

/// Owns the connection to one store file.
///
/// Clones share the same pools; closing one closes them all.
#[derive(Clone)]
pub struct StoreConnector {
    pool: DatabasePool,
}

impl StoreConnector {
    /// Open the store at `location`.
    ///
    /// Fails with `StoreError::Unavailable` when the path cannot be opened for
    /// reading and writing, the file is not an SQLite database, or its tables
    /// do not match the expected shape.
    pub async fn open(location: &Path, config: &StoreConfig) -> Result<Self, StoreError> {
        let pool = DatabasePool::open(location, config).await.map_err(|e| {
            StoreError::Unavailable(format!("cannot open store '{}': {e}", location.display()))
        })?;
        tracing::debug!(location = %location.display(), "store opened");
        Ok(Self { pool })
    }

    /// Run a read-only query and stream its rows.
    ///
    /// The stream is lazy (rows are fetched as it is polled), finite, and
    /// cannot be restarted.
    pub fn execute_read<'a>(
        &'a self,
        query: &'a str,
        params: Vec<StoreValue>,
    ) -> BoxStream<'a, Result<StoreRow, StoreError>> {
        let reader = self.pool.reader.clone();
        Box::pin(async_stream::stream! {
            if reader.is_closed() {
                yield Err(closed());
                return;
            }
            tracing::debug!(sql = query, "read");
            let mut rows = bind_all(sqlx::query(query), params).fetch(&reader);
            while let Some(next) = rows.next().await {
                yield next.map_err(map_read_error).and_then(|row| decode_row(&row));
            }
        })
    }

    /// Run one mutating statement in its own transaction.
    pub async fn execute_write(
        &self,
        statement: &str,
        params: Vec<StoreValue>,
    ) -> Result<WriteOutcome, StoreError> {
        let mut outcomes = self
            .execute_transaction(vec![WriteStatement::new(statement, params)])
            .await?;
        outcomes
            .pop()
            .ok_or_else(|| StoreError::Query("statement produced no outcome".to_string()))
    }

    /// Run several statements in one transaction. Any failure, including a
    /// `require_rows` statement that touched nothing, rolls back all of them.
    pub async fn execute_transaction(
        &self,
        statements: Vec<WriteStatement>,
    ) -> Result<Vec<WriteOutcome>, StoreError> {
        if self.is_closed() {
            return Err(closed());
        }

        let mut tx = self.pool.writer.begin().await.map_err(map_sqlx_error)?;
        let mut outcomes = Vec::with_capacity(statements.len());

        for statement in statements {
            tracing::debug!(sql = %statement.sql, params = statement.params.len(), "write");
            let result = bind_all(sqlx::query(&statement.sql), statement.params)
                .execute(&mut *tx)
                .await;

            let result = match result {
                Ok(result) => result,
                Err(e) => {
                    let err = map_sqlx_error(e);
                    tracing::debug!(error = %err, "write failed, rolling back");
                    if let Err(e) = tx.rollback().await {
                        tracing::warn!(error = %e, "rollback failed");
                    }
                    return Err(err);
                }
            };

            if statement.require_rows && result.rows_affected() == 0 {
                if let Err(e) = tx.rollback().await {
                    tracing::warn!(error = %e, "rollback failed");
                }
                return Err(StoreError::NotFound);
            }

            outcomes.push(WriteOutcome {
                rows_affected: result.rows_affected(),
                last_insert_rowid: result.last_insert_rowid(),
            });
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(outcomes)
    }

    /// Release both pools. Idempotent.
    pub async fn close(&self) {
        if !self.pool.is_closed() {
            tracing::debug!("closing store");
        }
        self.pool.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

fn closed() -> StoreError {
    StoreError::Unavailable("store connection is closed".to_string())
}

fn bind_all<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: Vec<StoreValue>,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            StoreValue::Null => query.bind(None::<String>),
            StoreValue::Integer(v) => query.bind(v),
            StoreValue::Real(v) => query.bind(v),
            StoreValue::Text(v) => query.bind(v),
            StoreValue::Blob(v) => query.bind(v),
        };
    }
    query
}

fn decode_row(row: &SqliteRow) -> Result<StoreRow, StoreError> {
    let mut columns = Vec::with_capacity(row.len());

    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index).map_err(map_sqlx_error)?;

        let value = if raw.is_null() {
            StoreValue::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" | "BOOLEAN" => StoreValue::Integer(
                    row.try_get_unchecked::<i64, _>(index)
                        .map_err(map_sqlx_error)?,
                ),
                "REAL" => StoreValue::Real(
                    row.try_get_unchecked::<f64, _>(index)
                        .map_err(map_sqlx_error)?,
                ),
                "BLOB" => StoreValue::Blob(
                    row.try_get_unchecked::<Vec<u8>, _>(index)
                        .map_err(map_sqlx_error)?,
                ),
                _ => StoreValue::Text(
                    row.try_get_unchecked::<String, _>(index)
                        .map_err(map_sqlx_error)?,
                ),
            }
        };

        columns.push((column.name().to_string(), value));
    }

    Ok(StoreRow { columns })
}

fn primary_code(db_err: &dyn sqlx::error::DatabaseError) -> Option<i32> {
    db_err
        .code()
        .and_then(|code| code.parse::<i32>().ok())
        .map(|code| code & 0xff)
}

/// Like `map_sqlx_error`, but a statement that tries to write through the
/// read-only pool is a bad query, not a lost store.
fn map_read_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if primary_code(&**db_err) == Some(SQLITE_READONLY) {
            return StoreError::Query(format!(
                "read query attempted a write: {}",
                db_err.message()
            ));
        }
    }
    map_sqlx_error(e)
}

/// Fold an sqlx error into a `StoreError` kind.
pub(crate) fn map_sqlx_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::Database(db_err) => {
            let message = db_err.message().to_string();
            match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => StoreError::IntegrityViolation(message),
                _ => match primary_code(&*db_err) {
                    Some(SQLITE_CONSTRAINT) => StoreError::IntegrityViolation(message),
                    Some(
                        SQLITE_PERM | SQLITE_BUSY | SQLITE_LOCKED | SQLITE_READONLY
                        | SQLITE_IOERR | SQLITE_CORRUPT | SQLITE_FULL | SQLITE_CANTOPEN
                        | SQLITE_NOTADB,
                    ) => StoreError::Unavailable(message),
                    _ => StoreError::Query(message),
                },
            }
        }
        sqlx::Error::RowNotFound => StoreError::NotFound,
        e @ (sqlx::Error::Io(_)
        | sqlx::Error::PoolClosed
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::WorkerCrashed) => StoreError::Unavailable(e.to_string()),
        other => StoreError::Query(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;

    async fn open_temp() -> (tempfile::TempDir, StoreConnector) {
        let dir = tempfile::tempdir().unwrap();
        let store = StoreConnector::open(&dir.path().join("test.db"), &StoreConfig::default())
            .await
            .unwrap();
        (dir, store)
    }

    async fn read_all(store: &StoreConnector, sql: &str, params: Vec<StoreValue>) -> Vec<StoreRow> {
        store.execute_read(sql, params).try_collect().await.unwrap()
    }

    #[tokio::test]
    async fn test_write_then_read_rows() {
        let (_dir, store) = open_temp().await;

        let outcome = store
            .execute_write(
                "INSERT INTO bots (name, description) VALUES (?, ?)",
                vec!["Helper".into(), StoreValue::Null],
            )
            .await
            .unwrap();
        assert_eq!(outcome.rows_affected, 1);
        assert_eq!(outcome.last_insert_rowid, 1);

        let rows = read_all(&store, "SELECT id, name, description FROM bots", vec![]).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].integer("id").unwrap(), 1);
        assert_eq!(rows[0].text("name").unwrap(), "Helper");
        assert_eq!(rows[0].optional_text("description").unwrap(), None);
        assert_eq!(
            rows[0].column_names().collect::<Vec<_>>(),
            vec!["id", "name", "description"]
        );
    }

    #[tokio::test]
    async fn test_read_binds_params() {
        let (_dir, store) = open_temp().await;
        for name in ["a", "b", "c"] {
            store
                .execute_write("INSERT INTO bots (name) VALUES (?)", vec![name.into()])
                .await
                .unwrap();
        }

        let rows = read_all(
            &store,
            "SELECT name FROM bots WHERE id > ? ORDER BY id",
            vec![1i64.into()],
        )
        .await;
        let names: Vec<String> = rows.iter().map(|r| r.text("name").unwrap()).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_decode_real_and_blob() {
        let (_dir, store) = open_temp().await;

        let rows = read_all(&store, "SELECT 1.5 AS r, x'0102' AS b, NULL AS n", vec![]).await;
        assert_eq!(rows[0].get("r"), Some(&StoreValue::Real(1.5)));
        assert_eq!(rows[0].get("b"), Some(&StoreValue::Blob(vec![1, 2])));
        assert_eq!(rows[0].get("n"), Some(&StoreValue::Null));
        assert!(rows[0].integer("missing").is_err());
    }

    #[tokio::test]
    async fn test_constraint_failure_is_integrity_violation() {
        let (_dir, store) = open_temp().await;

        let err = store
            .execute_write(
                "INSERT INTO knowledge_base (bot_id, content) VALUES (?, ?)",
                vec![99i64.into(), "orphan".into()],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::IntegrityViolation(_)), "{err:?}");

        let err = store
            .execute_write("INSERT INTO bots (name) VALUES (?)", vec![StoreValue::Null])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::IntegrityViolation(_)), "{err:?}");

        let rows = read_all(&store, "SELECT id FROM knowledge_base", vec![]).await;
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_read_never_mutates() {
        let (_dir, store) = open_temp().await;
        store
            .execute_write("INSERT INTO bots (name) VALUES (?)", vec!["Helper".into()])
            .await
            .unwrap();

        let err = store
            .execute_read("DELETE FROM bots", vec![])
            .try_collect::<Vec<_>>()
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Query(_)), "{err:?}");

        let rows = read_all(&store, "SELECT id FROM bots", vec![]).await;
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_statement_is_query_error() {
        let (_dir, store) = open_temp().await;

        let err = store
            .execute_write("DELETE FROM no_such_table", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Query(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_transaction_rolls_back_on_failure() {
        let (_dir, store) = open_temp().await;

        let err = store
            .execute_transaction(vec![
                WriteStatement::new("INSERT INTO bots (name) VALUES (?)", vec!["kept?".into()]),
                WriteStatement::new(
                    "INSERT INTO knowledge_base (bot_id, content) VALUES (?, ?)",
                    vec![404i64.into(), "x".into()],
                ),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::IntegrityViolation(_)));

        let rows = read_all(&store, "SELECT id FROM bots", vec![]).await;
        assert!(rows.is_empty(), "first insert must be rolled back");
    }

    #[tokio::test]
    async fn test_transaction_require_rows_rolls_back() {
        let (_dir, store) = open_temp().await;
        store
            .execute_write("INSERT INTO bots (name) VALUES (?)", vec!["Helper".into()])
            .await
            .unwrap();

        let err = store
            .execute_transaction(vec![
                WriteStatement::new("DELETE FROM bots WHERE id = ?", vec![1i64.into()]),
                WriteStatement::new("DELETE FROM bots WHERE id = ?", vec![2i64.into()])
                    .require_rows(),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));

        let rows = read_all(&store, "SELECT id FROM bots", vec![]).await;
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_close_twice_then_operations_unavailable() {
        let (_dir, store) = open_temp().await;

        store.close().await;
        store.close().await;
        assert!(store.is_closed());

        let err = store
            .execute_write("INSERT INTO bots (name) VALUES ('x')", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        let err = store
            .execute_read("SELECT id FROM bots", vec![])
            .try_collect::<Vec<_>>()
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_open_rejects_non_sqlite_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "not an sqlite database\n".repeat(200)).unwrap();

        let err = StoreConnector::open(&path, &StoreConfig::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_open_rejects_missing_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("store.db");

        let err = StoreConnector::open(&path, &StoreConfig::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
