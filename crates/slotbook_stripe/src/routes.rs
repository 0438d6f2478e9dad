// --- File: crates/slotbook_stripe/src/routes.rs ---
use crate::handlers::{
    stripe_checkout_cancel_handler, stripe_checkout_success_handler, stripe_webhook_handler,
    StripeState,
};
use axum::{
    routing::{get, post},
    Router,
};
use slotbook_booking::ReservationWorkflow;
use std::sync::Arc;

/// Creates the router for the Stripe webhook and redirect pages.
pub fn routes(workflow: Arc<ReservationWorkflow>, webhook_secret: String) -> Router {
    let state = Arc::new(StripeState {
        workflow,
        webhook_secret,
    });

    Router::new()
        .route("/stripe/webhook", post(stripe_webhook_handler))
        .route("/stripe/checkout-success", get(stripe_checkout_success_handler))
        .route("/stripe/checkout-cancel", get(stripe_checkout_cancel_handler))
        .with_state(state)
}
