use std::fmt;

use thiserror::Error;

/// The two record kinds held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Bot,
    KnowledgeBaseEntry,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Bot => write!(f, "bot"),
            RecordKind::KnowledgeBaseEntry => write!(f, "knowledge base entry"),
        }
    }
}

/// Errors from the store connector and the repositories built on it.
///
/// Every SQLite failure is folded into one of these kinds.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store cannot be opened or reached (I/O, locking, closed connection,
    /// not a valid store file).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness, NOT NULL, CHECK or foreign key constraint rejected the write.
    /// The statement's transaction was rolled back.
    #[error("integrity violation: {0}")]
    IntegrityViolation(String),

    /// The targeted row does not exist.
    #[error("row not found")]
    NotFound,

    /// The statement itself failed or a row could not be decoded.
    #[error("query error: {0}")]
    Query(String),
}

/// Errors surfaced by the record service to the UI.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Caller-supplied data failed a field rule. Raised before any store access.
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// The referenced record does not exist.
    #[error("no such {kind} with id {id}")]
    NotFound { kind: RecordKind, id: i64 },

    /// The store rejected the write; nothing was applied.
    #[error("integrity violation: {0}")]
    IntegrityViolation(String),

    /// The store could not be reached for this operation.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Unexpected statement or decoding failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl RecordError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        RecordError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(kind: RecordKind, id: i64) -> Self {
        RecordError::NotFound { kind, id }
    }

    /// Whether the operator can fix the problem by changing their input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RecordError::Validation { .. }
                | RecordError::NotFound { .. }
                | RecordError::IntegrityViolation(_)
        )
    }
}

impl From<StoreError> for RecordError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(msg) => RecordError::StoreUnavailable(msg),
            StoreError::IntegrityViolation(msg) => RecordError::IntegrityViolation(msg),
            // Repositories report missing rows as `NotFound` without an id;
            // services that know the id map it themselves before this fallback.
            StoreError::NotFound => RecordError::Storage("row not found".to_string()),
            StoreError::Query(msg) => RecordError::Storage(msg),
        }
    }
}

/// Errors resolving startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("store location is not set (set {0} or pass --db)")]
    MissingLocation(&'static str),

    #[error("store location '{0}' is a directory, expected a database file")]
    IsDirectory(String),

    #[error("parent directory of store location '{0}' does not exist")]
    MissingParent(String),
}
