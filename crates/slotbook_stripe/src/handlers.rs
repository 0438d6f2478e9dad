// --- File: crates/slotbook_stripe/src/handlers.rs ---
use crate::error::StripeError;
use crate::logic::{process_stripe_webhook, verify_stripe_signature, StripeEvent, WebhookOutcome};
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{Html, Json},
};
use chrono::Utc;
use serde::Deserialize;
use slotbook_booking::ReservationWorkflow;
use slotbook_common::SlotbookError;
use std::sync::Arc;
use tracing::{info, warn};

// --- State for Stripe Handlers ---
#[derive(Clone)]
pub struct StripeState {
    pub workflow: Arc<ReservationWorkflow>,
    pub webhook_secret: String,
}

/// Stripe server-to-server notifications. Needs the raw body for the signature.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/stripe/webhook",
    request_body(content = String, description = "Raw Stripe event JSON", content_type = "application/json"),
    responses(
        (status = 200, description = "Webhook received and acknowledged", body = WebhookOutcome),
        (status = 400, description = "Invalid signature or payload"),
        (status = 500, description = "Store failure; Stripe will retry")
    ),
    tag = "Stripe Webhooks"
))]
pub async fn stripe_webhook_handler(
    State(state): State<Arc<StripeState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookOutcome>, SlotbookError> {
    let sig_header = headers
        .get("Stripe-Signature")
        .and_then(|h| h.to_str().ok());

    if let Err(e) = verify_stripe_signature(
        body.as_bytes(),
        sig_header,
        &state.webhook_secret,
        Utc::now().timestamp(),
    ) {
        warn!("Rejected Stripe webhook: {}", e);
        return Err(e.into());
    }

    let event: StripeEvent = serde_json::from_str(&body).map_err(StripeError::from)?;
    let outcome = process_stripe_webhook(event, &state.workflow).await?;
    Ok(Json(outcome))
}

// --- Redirect Handlers (Client-Side) ---

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
pub struct StripeRedirectQuery {
    #[cfg_attr(feature = "openapi", param(example = "cs_test_a1..."))]
    pub session_id: Option<String>,
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/stripe/checkout-success",
    params(StripeRedirectQuery),
    responses((status = 200, description = "Checkout success page", content_type = "text/html")),
    tag = "Stripe Redirects"
))]
pub async fn stripe_checkout_success_handler(
    Query(params): Query<StripeRedirectQuery>,
) -> Html<&'static str> {
    info!("Customer returned from Stripe checkout, session {:?}", params.session_id);
    Html("<h1>Deposit received</h1><p>Thank you. Your appointment will be confirmed as soon as the payment clears.</p><a href='/'>Back to Home</a>")
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/stripe/checkout-cancel",
    params(StripeRedirectQuery),
    responses((status = 200, description = "Checkout cancellation page", content_type = "text/html")),
    tag = "Stripe Redirects"
))]
pub async fn stripe_checkout_cancel_handler(
    Query(params): Query<StripeRedirectQuery>,
) -> Html<&'static str> {
    info!("Customer left Stripe checkout, session {:?}", params.session_id);
    Html("<h1>Payment cancelled</h1><p>You have not been charged. Your slot is released once the checkout session expires.</p><a href='/'>Back to Home</a>")
}
