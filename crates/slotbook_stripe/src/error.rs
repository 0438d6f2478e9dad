// --- File: crates/slotbook_stripe/src/error.rs ---
use slotbook_booking::BookingError;
use slotbook_common::{external_service_error, HttpStatusCode, SlotbookError};
use thiserror::Error;

/// Stripe-specific error types.
#[derive(Error, Debug)]
pub enum StripeError {
    /// Error occurred during a Stripe API request
    #[error("Stripe API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the Stripe API
    #[error("Stripe API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// Error parsing Stripe API response
    #[error("Failed to parse Stripe API response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Missing or incomplete Stripe configuration
    #[error("Stripe configuration missing or incomplete: {0}")]
    ConfigError(String),

    /// Webhook signature verification failed
    #[error("Stripe webhook signature verification failed: {0}")]
    WebhookSignatureError(String),

    /// Webhook event processing error
    #[error("Stripe webhook event processing error: {0}")]
    WebhookProcessingError(String),

    /// The reservation core could not record the payment
    #[error("Appointment update failed: {0}")]
    Booking(#[from] BookingError),
}

impl From<StripeError> for SlotbookError {
    fn from(err: StripeError) -> Self {
        match err {
            StripeError::RequestError(e) => {
                SlotbookError::HttpError(format!("Stripe request error: {}", e))
            }
            StripeError::ApiError {
                status_code,
                message,
            } => external_service_error(
                "Stripe API",
                format!("Status: {}, Message: {}", status_code, message),
            ),
            StripeError::ParseError(e) => {
                SlotbookError::ParseError(format!("Stripe payload parse error: {}", e))
            }
            StripeError::ConfigError(msg) => SlotbookError::ConfigError(msg),
            StripeError::WebhookSignatureError(msg) => {
                SlotbookError::ValidationError(format!("Stripe webhook signature error: {}", msg))
            }
            StripeError::WebhookProcessingError(msg) => external_service_error("Stripe webhook", msg),
            StripeError::Booking(e) => e.into(),
        }
    }
}

impl HttpStatusCode for StripeError {
    fn status_code(&self) -> u16 {
        match self {
            StripeError::RequestError(_) => 500,
            StripeError::ApiError { .. } => 502,
            StripeError::ParseError(_) => 400,
            StripeError::ConfigError(_) => 500,
            StripeError::WebhookSignatureError(_) => 400,
            StripeError::WebhookProcessingError(_) => 502,
            StripeError::Booking(e) => e.status_code(),
        }
    }
}
