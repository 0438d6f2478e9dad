// --- File: crates/slotbook_admin/src/error.rs ---
use slotbook_booking::BookingError;
use slotbook_common::{HttpStatusCode, SlotbookError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Too many failed login attempts, retry in {retry_after_secs} seconds")]
    TooManyAttempts { retry_after_secs: i64 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Booking(#[from] BookingError),
}

impl HttpStatusCode for AdminError {
    fn status_code(&self) -> u16 {
        match self {
            AdminError::NotAuthenticated | AdminError::InvalidCredentials => 401,
            AdminError::TooManyAttempts { .. } => 429,
            AdminError::Validation(_) => 400,
            AdminError::Booking(e) => e.status_code(),
        }
    }
}

impl From<AdminError> for SlotbookError {
    fn from(err: AdminError) -> Self {
        match err {
            e @ (AdminError::NotAuthenticated | AdminError::InvalidCredentials) => {
                SlotbookError::AuthError(e.to_string())
            }
            e @ AdminError::TooManyAttempts { .. } => SlotbookError::RateLimitError(e.to_string()),
            AdminError::Validation(msg) => SlotbookError::ValidationError(msg),
            AdminError::Booking(e) => e.into(),
        }
    }
}
