// --- File: crates/slotbook_stripe/src/lib.rs ---
pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod routes;
pub mod service;

pub use error::StripeError;
pub use logic::{process_stripe_webhook, verify_stripe_signature, WebhookOutcome};
pub use service::{StripeCheckoutService, StripeCredentials};
