// --- File: crates/slotbook_booking/src/error.rs ---
use chrono::{NaiveDate, NaiveTime};
use slotbook_common::models::AppointmentStatus;
use slotbook_common::{HttpStatusCode, SlotbookError};
use slotbook_db::DbError;
use thiserror::Error;

/// Errors raised by the slot calendar and the reservation workflow.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Slot {date} {time} is not available")]
    SlotUnavailable { date: NaiveDate, time: NaiveTime },

    #[error("Slot {date} {time} is held by a live appointment")]
    SlotBooked { date: NaiveDate, time: NaiveTime },

    #[error("Slot {date} {time} does not exist")]
    SlotNotFound { date: NaiveDate, time: NaiveTime },

    #[error("Appointment {0} not found")]
    AppointmentNotFound(i64),

    #[error("Appointment {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: i64,
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Catalog unavailable: {0}")]
    Catalog(String),

    /// The checkout handoff failed; the reservation was rolled back.
    #[error("Booking failed: {0}")]
    BookingFailed(String),

    /// A rollback step failed after a forward step had failed. Needs an operator.
    #[error("Booking rollback incomplete: {0}")]
    CompensationFailed(String),

    #[error("Store error: {0}")]
    Store(#[from] DbError),
}

impl HttpStatusCode for BookingError {
    fn status_code(&self) -> u16 {
        match self {
            BookingError::Validation(_) => 400,
            BookingError::SlotUnavailable { .. }
            | BookingError::SlotBooked { .. }
            | BookingError::InvalidTransition { .. } => 409,
            BookingError::SlotNotFound { .. } | BookingError::AppointmentNotFound(_) => 404,
            BookingError::Catalog(_) | BookingError::BookingFailed(_) => 502,
            BookingError::CompensationFailed(_) => 500,
            BookingError::Store(e) => e.status_code(),
        }
    }
}

impl From<BookingError> for SlotbookError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Validation(msg) => SlotbookError::ValidationError(msg),
            e @ (BookingError::SlotUnavailable { .. }
            | BookingError::SlotBooked { .. }
            | BookingError::InvalidTransition { .. }) => SlotbookError::ConflictError(e.to_string()),
            e @ (BookingError::SlotNotFound { .. } | BookingError::AppointmentNotFound(_)) => {
                SlotbookError::NotFoundError(e.to_string())
            }
            BookingError::Catalog(msg) => SlotbookError::ExternalServiceError {
                service_name: "Catalog".to_string(),
                message: msg,
            },
            BookingError::BookingFailed(msg) => SlotbookError::ExternalServiceError {
                service_name: "Checkout".to_string(),
                message: msg,
            },
            e @ BookingError::CompensationFailed(_) => SlotbookError::InternalError(e.to_string()),
            BookingError::Store(e) => e.into(),
        }
    }
}
