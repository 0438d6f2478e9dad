// --- File: crates/slotbook_stripe/src/service.rs ---
use crate::error::StripeError;
use crate::logic::create_checkout_session;
use slotbook_common::services::{
    BoxFuture, BoxedError, CheckoutRequest, CheckoutService, CheckoutSession,
};
use slotbook_config::StripeConfig;
use std::env;

/// Secrets for the Stripe API, kept out of the config files.
#[derive(Clone)]
pub struct StripeCredentials {
    pub secret_key: String,
    pub webhook_secret: String,
}

impl StripeCredentials {
    /// Reads `STRIPE_SECRET_KEY` and `STRIPE_WEBHOOK_SECRET`.
    pub fn from_env() -> Result<Self, StripeError> {
        let secret_key = env::var("STRIPE_SECRET_KEY")
            .map_err(|_| StripeError::ConfigError("STRIPE_SECRET_KEY is not set".to_string()))?;
        let webhook_secret = env::var("STRIPE_WEBHOOK_SECRET").map_err(|_| {
            StripeError::ConfigError("STRIPE_WEBHOOK_SECRET is not set".to_string())
        })?;
        Ok(Self {
            secret_key,
            webhook_secret,
        })
    }
}

// Secrets never reach the logs.
impl std::fmt::Debug for StripeCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeCredentials")
            .field("secret_key", &"<redacted>")
            .field("webhook_secret", &"<redacted>")
            .finish()
    }
}

/// Stripe implementation of the checkout handoff.
#[derive(Debug, Clone)]
pub struct StripeCheckoutService {
    config: StripeConfig,
    secret_key: String,
}

impl StripeCheckoutService {
    pub fn new(config: StripeConfig, secret_key: impl Into<String>) -> Self {
        Self {
            config,
            secret_key: secret_key.into(),
        }
    }
}

impl CheckoutService for StripeCheckoutService {
    fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> BoxFuture<'_, CheckoutSession, BoxedError> {
        Box::pin(async move {
            create_checkout_session(&self.config, &self.secret_key, &request)
                .await
                .map_err(BoxedError::new)
        })
    }
}
