//! Error types for the database client

use slotbook_common::{HttpStatusCode, SlotbookError};
use thiserror::Error;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// A stored value could not be turned back into a domain record
    #[error("Database decode error: {0}")]
    DecodeError(String),

    /// A uniqueness constraint rejected the write
    #[error("Database constraint violation: {0}")]
    UniqueViolation(String),

    /// Error with database transaction
    #[error("Database transaction error: {0}")]
    TransactionError(String),
}

impl DbError {
    /// Classifies a query failure, keeping unique-constraint hits distinguishable.
    pub(crate) fn from_query(err: sqlx::Error) -> Self {
        let is_unique = err
            .as_database_error()
            .map(|db_err| db_err.is_unique_violation())
            .unwrap_or(false);
        if is_unique {
            DbError::UniqueViolation(err.to_string())
        } else {
            DbError::QueryError(err.to_string())
        }
    }
}

impl HttpStatusCode for DbError {
    fn status_code(&self) -> u16 {
        match self {
            DbError::UniqueViolation(_) => 409,
            _ => 500,
        }
    }
}

impl From<DbError> for SlotbookError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation(msg) => SlotbookError::ConflictError(msg),
            DbError::ConfigError(msg) | DbError::UrlError(msg) => SlotbookError::ConfigError(msg),
            other => SlotbookError::DatabaseError(other.to_string()),
        }
    }
}
