//! Core error types for Pledgeboard.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use chrono::ParseError as ChronoParseError;
use thiserror::Error;

use crate::extraction::ExtractionFailure;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the intake pipeline.
///
/// Recoverable errors (`Validation`, `ConfirmationConflict`) are meant to be
/// surfaced to the human actor for correction. `EventClosed` is final.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Confirmation conflict: {0}")]
    ConfirmationConflict(String),

    #[error("Event {0} is closed")]
    EventClosed(String),

    #[error("Ledger write failed after {attempts} attempt(s): {message}")]
    LedgerWriteFailure { attempts: u32, message: String },

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionFailure),

    #[error("Report export failed: {0}")]
    Export(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Shorthand for a `DatabaseError::NotFound` wrapped in `Error`.
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::Database(DatabaseError::NotFound(what.into()))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Database(DatabaseError::NotFound(_)))
    }

    /// Stable machine-readable code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Database(DatabaseError::NotFound(_)) => "NOT_FOUND",
            Error::Database(_) => "DATABASE_ERROR",
            Error::Validation(v) => v.code(),
            Error::ConfirmationConflict(_) => "CONFIRMATION_CONFLICT",
            Error::EventClosed(_) => "EVENT_CLOSED",
            Error::LedgerWriteFailure { .. } => "LEDGER_WRITE_FAILURE",
            Error::Extraction(_) => "EXTRACTION_FAILURE",
            Error::Export(_) => "EXPORT_FAILURE",
            Error::InvalidConfigValue(_) => "INVALID_CONFIG",
            Error::Unexpected(_) => "UNEXPECTED",
        }
    }
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors (Diesel, SQLite, etc.) into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A foreign key constraint was violated.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// A database transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Validation errors for user input and extracted fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Donor name is missing")]
    MissingName,

    #[error("Invalid goal: {0}")]
    InvalidGoal(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::InvalidAmount(_) => "INVALID_AMOUNT",
            ValidationError::MissingName => "MISSING_NAME",
            ValidationError::InvalidGoal(_) => "INVALID_GOAL",
            ValidationError::InvalidInput(_) => "INVALID_INPUT",
            ValidationError::MissingField(_) => "MISSING_FIELD",
        }
    }
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::InvalidAmount(err.to_string()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Unexpected(err.to_string())
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
