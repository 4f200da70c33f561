/// Tabula Error Module
///
/// This module defines the error taxonomy for table access. Driver errors are
/// classified into the kinds the table layer knows how to recover from
/// (aborted transactions, uniqueness violations, structural DDL errors) and
/// the unclassified remainder that callers must handle.
use rusqlite::ffi;
use rusqlite::ErrorCode;
use thiserror::Error;

/// Store messages that mark a statement as structurally invalid: bad syntax,
/// or a reference to a table, column or type the store does not know.
const STRUCTURAL_MARKERS: &[&str] = &[
    "syntax error",
    "incomplete input",
    "unrecognized token",
    "no such column",
    "no such table",
];

/// Error type for every fallible operation in the crate.
///
/// Recoverable kinds (`TransactionAborted`, `UniqueViolation`, `Structural`)
/// are absorbed by the table operations that expect them (see
/// [`StoreError::is_recoverable`]); anywhere else they propagate like the
/// remaining kinds.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The connection could not be established.
    #[error("Connection error: cannot connect to {target}: {source}")]
    Connection {
        target: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A statement was issued while the transaction was already failed.
    #[error("Transaction error: current transaction is aborted, statements ignored until rollback")]
    TransactionAborted,

    /// A row with the same key already exists.
    #[error("Unique violation: {0}")]
    UniqueViolation(String),

    /// Invalid syntax, or a reference to an unknown column, table or type.
    #[error("Structural error: {0}")]
    Structural(String),

    /// Any other driver error.
    #[error("Database error: {0}")]
    Database(#[source] rusqlite::Error),

    /// The caller supplied an ill-formed request.
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Classifies a raw driver error.
    pub fn from_driver(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, _) = &err {
            if failure.code == ErrorCode::ConstraintViolation
                && matches!(
                    failure.extended_code,
                    ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE
                )
            {
                return StoreError::UniqueViolation(err.to_string());
            }
        }

        let message = err.to_string();
        if STRUCTURAL_MARKERS.iter().any(|marker| message.contains(marker)) {
            return StoreError::Structural(message);
        }

        StoreError::Database(err)
    }

    pub fn is_transaction_aborted(&self) -> bool {
        matches!(self, StoreError::TransactionAborted)
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation(_))
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, StoreError::Structural(_))
    }

    /// Whether this kind can be absorbed into an empty outcome.
    ///
    /// Each kind is absorbed only where it is expected: `TransactionAborted`
    /// by every table operation, `Structural` by the DDL operations, and
    /// `UniqueViolation` by `insert` alone. A uniqueness conflict raised by
    /// `update` reaches the caller.
    pub fn is_recoverable(&self) -> bool {
        self.is_transaction_aborted() || self.is_unique_violation() || self.is_structural()
    }

    /// Machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::Connection { .. } => "CONNECTION_ERROR",
            StoreError::TransactionAborted => "TRANSACTION_ABORTED",
            StoreError::UniqueViolation(_) => "UNIQUE_VIOLATION",
            StoreError::Structural(_) => "STRUCTURAL_ERROR",
            StoreError::Database(_) => "DATABASE_ERROR",
            StoreError::Query(_) => "QUERY_ERROR",
            StoreError::Config(_) | StoreError::Toml(_) => "CONFIG_ERROR",
            StoreError::Io(_) => "IO_ERROR",
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::from_driver(err)
    }
}

/// Type alias for Result to use StoreError as the error type.
pub type Result<T> = std::result::Result<T, StoreError>;
