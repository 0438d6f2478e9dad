// --- File: crates/slotbook_stripe/src/logic.rs ---
use crate::error::StripeError;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use slotbook_booking::{BookingError, ReservationWorkflow};
use slotbook_common::services::{CheckoutRequest, CheckoutSession};
use slotbook_common::HTTP_CLIENT;
use slotbook_config::StripeConfig;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Maximum age, in seconds, of a signed webhook delivery.
pub const TOLERANCE_SECONDS: i64 = 300;

/// Metadata key carrying our appointment id through Stripe.
pub const APPOINTMENT_METADATA_KEY: &str = "appointment_id";

// --- Data Structures ---

#[derive(Deserialize, Debug)]
struct StripeCheckoutSessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Deserialize, Debug)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize, Debug)]
struct StripeErrorDetail {
    message: Option<String>,
}

/// Stripe webhook event envelope.
#[derive(Deserialize, Debug, Serialize, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub livemode: bool,
    pub data: StripeEventData,
}

#[derive(Deserialize, Debug, Serialize, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StripeEventData {
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub object: serde_json::Value,
}

/// The subset of a Checkout Session object we act on.
#[derive(Deserialize, Debug, Serialize, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StripeCheckoutSessionObject {
    pub id: String,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub payment_intent: Option<String>,
    pub payment_status: Option<String>,
    pub status: Option<String>,
    pub client_reference_id: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
}

/// What a webhook delivery did to the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WebhookOutcome {
    Confirmed { appointment_id: i64 },
    Expired { appointment_id: i64 },
    Ignored { reason: String },
}

impl WebhookOutcome {
    fn ignored(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        info!("Stripe webhook ignored: {}", reason);
        WebhookOutcome::Ignored { reason }
    }
}

// --- Checkout Session ---

/// Form fields for `POST /v1/checkout/sessions`: a single deposit line item.
pub fn build_checkout_form(
    config: &StripeConfig,
    request: &CheckoutRequest,
) -> Vec<(String, String)> {
    let currency = config
        .currency
        .clone()
        .unwrap_or_else(|| request.currency.clone())
        .to_lowercase();
    let appointment_id = request.appointment_id.to_string();

    let mut form_body: Vec<(String, String)> = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), config.success_url.clone()),
        ("cancel_url".to_string(), config.cancel_url.clone()),
        ("client_reference_id".to_string(), appointment_id.clone()),
        (
            format!("metadata[{}]", APPOINTMENT_METADATA_KEY),
            appointment_id,
        ),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
        ("line_items[0][price_data][currency]".to_string(), currency),
        (
            "line_items[0][price_data][unit_amount]".to_string(),
            request.deposit_cents.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]".to_string(),
            config.product_name.clone(),
        ),
    ];
    if !request.customer_email.is_empty() {
        form_body.push((
            "customer_email".to_string(),
            request.customer_email.clone(),
        ));
    }
    form_body
}

/// Creates a Stripe Checkout Session collecting the deposit for one appointment.
pub async fn create_checkout_session(
    config: &StripeConfig,
    secret_key: &str,
    request: &CheckoutRequest,
) -> Result<CheckoutSession, StripeError> {
    if secret_key.trim().is_empty() {
        return Err(StripeError::ConfigError(
            "STRIPE_SECRET_KEY is not set".to_string(),
        ));
    }
    if request.deposit_cents <= 0 {
        return Err(StripeError::ConfigError(format!(
            "deposit for appointment {} is {} cents; Stripe needs a positive amount",
            request.appointment_id, request.deposit_cents
        )));
    }

    let endpoint = format!(
        "{}/v1/checkout/sessions",
        config.api_base.trim_end_matches('/')
    );
    let form_body = build_checkout_form(config, request);
    debug!(
        "Creating Stripe checkout session for appointment {}",
        request.appointment_id
    );

    let response = HTTP_CLIENT
        .post(&endpoint)
        .basic_auth(secret_key, None::<&str>)
        .form(&form_body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<StripeErrorBody>(&body)
            .ok()
            .and_then(|b| b.error.message)
            .unwrap_or_else(|| body.clone());
        error!("Stripe API error ({}): {}", status, message);
        return Err(StripeError::ApiError {
            status_code: status.as_u16(),
            message,
        });
    }

    let session: StripeCheckoutSessionResponse = response.json().await?;
    let redirect_url = session.url.ok_or_else(|| StripeError::ApiError {
        status_code: status.as_u16(),
        message: format!("checkout session {} has no url", session.id),
    })?;
    info!(
        "Stripe checkout session {} created for appointment {}",
        session.id, request.appointment_id
    );
    Ok(CheckoutSession {
        redirect_url,
        session_id: Some(session.id),
    })
}

// --- Webhook ---

/// Verifies a `Stripe-Signature` header against the raw payload.
///
/// The header carries `t=<unix>` and one or more `v1=<hex>`; any matching `v1`
/// is accepted as long as `t` lies within [`TOLERANCE_SECONDS`] of `now_unix`.
pub fn verify_stripe_signature(
    payload_bytes: &[u8],
    sig_header: Option<&str>,
    secret: &str,
    now_unix: i64,
) -> Result<(), StripeError> {
    if secret.is_empty() {
        return Err(StripeError::ConfigError(
            "STRIPE_WEBHOOK_SECRET is not set".to_string(),
        ));
    }
    let sig_header_value = sig_header.ok_or_else(|| {
        StripeError::WebhookSignatureError("Missing Stripe-Signature header".to_string())
    })?;

    let mut timestamp_str: Option<&str> = None;
    let mut v1_signatures_hex: Vec<&str> = Vec::new();
    for item in sig_header_value.split(',') {
        match item.trim().split_once('=') {
            Some(("t", value)) => timestamp_str = Some(value),
            Some(("v1", value)) => v1_signatures_hex.push(value),
            _ => {} // v0 and unknown schemes
        }
    }

    let timestamp = timestamp_str
        .ok_or_else(|| {
            StripeError::WebhookSignatureError(
                "Missing timestamp 't' in Stripe-Signature".to_string(),
            )
        })?
        .parse::<i64>()
        .map_err(|_| {
            StripeError::WebhookSignatureError(
                "Invalid timestamp format in Stripe-Signature".to_string(),
            )
        })?;
    if v1_signatures_hex.is_empty() {
        return Err(StripeError::WebhookSignatureError(
            "Missing v1 signature in Stripe-Signature".to_string(),
        ));
    }

    let age = (now_unix - timestamp).abs();
    if age > TOLERANCE_SECONDS {
        warn!(
            "Stripe webhook timestamp outside tolerance (t={}, now={})",
            timestamp, now_unix
        );
        return Err(StripeError::WebhookSignatureError(format!(
            "Timestamp is {}s away from server time",
            age
        )));
    }

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|e| StripeError::ConfigError(format!("Invalid webhook secret: {}", e)))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload_bytes);
    let expected_hex = hex::encode(mac.finalize().into_bytes());

    let matched = v1_signatures_hex
        .iter()
        .any(|candidate| constant_time_eq::constant_time_eq(candidate.as_bytes(), expected_hex.as_bytes()));
    if matched {
        debug!("Stripe webhook signature verified");
        Ok(())
    } else {
        Err(StripeError::WebhookSignatureError(
            "No v1 signature matches the payload".to_string(),
        ))
    }
}

/// The appointment a checkout session pays for.
///
/// `metadata[appointment_id]` wins; `client_reference_id` is the fallback.
pub fn appointment_reference(session: &StripeCheckoutSessionObject) -> Option<i64> {
    session
        .metadata
        .as_ref()
        .and_then(|m| m.get(APPOINTMENT_METADATA_KEY))
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .or_else(|| {
            session
                .client_reference_id
                .as_deref()
                .and_then(|raw| raw.trim().parse::<i64>().ok())
        })
}

/// Applies a verified webhook event to the reservation workflow.
///
/// Events that refer to unknown or already-settled appointments are acknowledged
/// as `Ignored`; only store failures come back as errors so Stripe retries.
pub async fn process_stripe_webhook(
    event: StripeEvent,
    workflow: &ReservationWorkflow,
) -> Result<WebhookOutcome, StripeError> {
    info!(
        "Processing Stripe event {} of type {}",
        event.id, event.event_type
    );

    match event.event_type.as_str() {
        "checkout.session.completed" | "checkout.session.async_payment_succeeded" => {
            let session: StripeCheckoutSessionObject = serde_json::from_value(event.data.object)?;
            if session.payment_status.as_deref() != Some("paid") {
                return Ok(WebhookOutcome::ignored(format!(
                    "session {} not paid yet (payment_status={:?})",
                    session.id, session.payment_status
                )));
            }
            let Some(appointment_id) = appointment_reference(&session) else {
                return Ok(WebhookOutcome::ignored(format!(
                    "session {} carries no appointment reference",
                    session.id
                )));
            };
            let order_reference = session
                .payment_intent
                .clone()
                .unwrap_or_else(|| session.id.clone());

            match workflow
                .confirm_appointment(appointment_id, &order_reference)
                .await
            {
                Ok(_) => Ok(WebhookOutcome::Confirmed { appointment_id }),
                Err(e @ BookingError::AppointmentNotFound(_))
                | Err(e @ BookingError::InvalidTransition { .. }) => {
                    warn!("Payment for appointment {} not applied: {}", appointment_id, e);
                    Ok(WebhookOutcome::ignored(e.to_string()))
                }
                Err(e) => Err(e.into()),
            }
        }
        "checkout.session.expired" => {
            let session: StripeCheckoutSessionObject = serde_json::from_value(event.data.object)?;
            let Some(appointment_id) = appointment_reference(&session) else {
                return Ok(WebhookOutcome::ignored(format!(
                    "expired session {} carries no appointment reference",
                    session.id
                )));
            };
            // Conditional on pending, so a payment that lands first always wins.
            match workflow.expire_pending_appointment(appointment_id).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    return Ok(WebhookOutcome::ignored(format!(
                        "appointment {} is no longer pending",
                        appointment_id
                    )));
                }
                Err(BookingError::AppointmentNotFound(_)) => {
                    return Ok(WebhookOutcome::ignored(format!(
                        "appointment {} no longer exists",
                        appointment_id
                    )));
                }
                Err(e) => return Err(e.into()),
            }
            info!(
                "Checkout expired; appointment {} cancelled and slot released",
                appointment_id
            );
            Ok(WebhookOutcome::Expired { appointment_id })
        }
        other => Ok(WebhookOutcome::ignored(format!(
            "unhandled event type {}",
            other
        ))),
    }
}
