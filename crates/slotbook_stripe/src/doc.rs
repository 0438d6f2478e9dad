// File: crates/slotbook_stripe/src/doc.rs
#![cfg(feature = "openapi")]

use crate::handlers::StripeRedirectQuery;
use crate::logic::{StripeCheckoutSessionObject, StripeEvent, StripeEventData, WebhookOutcome};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::stripe_webhook_handler,
        crate::handlers::stripe_checkout_success_handler,
        crate::handlers::stripe_checkout_cancel_handler
    ),
    components(schemas(
        StripeEvent,
        StripeEventData,
        StripeCheckoutSessionObject,
        WebhookOutcome,
        StripeRedirectQuery
    )),
    tags(
        (name = "Stripe Webhooks", description = "Payment confirmation from Stripe"),
        (name = "Stripe Redirects", description = "Pages the customer lands on after checkout")
    )
)]
pub struct StripeApiDoc;
