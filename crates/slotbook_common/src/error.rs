// --- File: crates/slotbook_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for all Slotbook errors.
///
/// Each crate keeps its own domain error and implements `From<CrateError> for SlotbookError`
/// so handlers can bubble everything up with `?`.
#[derive(Error, Debug)]
pub enum SlotbookError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during authentication or authorization
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to a conflict (e.g., slot already taken)
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to rate limiting
    #[error("Rate limited: {0}")]
    RateLimitError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for SlotbookError {
    fn status_code(&self) -> u16 {
        match self {
            SlotbookError::HttpError(_) => 500,
            SlotbookError::ParseError(_) => 400,
            SlotbookError::ConfigError(_) => 500,
            SlotbookError::AuthError(_) => 401,
            SlotbookError::ValidationError(_) => 400,
            SlotbookError::DatabaseError(_) => 500,
            SlotbookError::ExternalServiceError { .. } => 502,
            SlotbookError::ConflictError(_) => 409,
            SlotbookError::NotFoundError(_) => 404,
            SlotbookError::RateLimitError(_) => 429,
            SlotbookError::InternalError(_) => 500,
        }
    }
}

// Common error conversions
impl From<reqwest::Error> for SlotbookError {
    fn from(err: reqwest::Error) -> Self {
        SlotbookError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for SlotbookError {
    fn from(err: serde_json::Error) -> Self {
        SlotbookError::ParseError(err.to_string())
    }
}

// Utility functions for error handling
pub fn conflict<T: fmt::Display>(message: T) -> SlotbookError {
    SlotbookError::ConflictError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> SlotbookError {
    SlotbookError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}
