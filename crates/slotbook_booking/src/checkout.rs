// --- File: crates/slotbook_booking/src/checkout.rs ---
use slotbook_common::services::{
    BoxFuture, BoxedError, CheckoutRequest, CheckoutService, CheckoutSession,
};
use tracing::info;

/// Checkout used when no payment provider is enabled.
///
/// Sends the customer to a fixed page; the appointment stays pending until an
/// administrator confirms it.
#[derive(Debug, Clone)]
pub struct DirectCheckoutService {
    base_url: String,
}

impl DirectCheckoutService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl CheckoutService for DirectCheckoutService {
    fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> BoxFuture<'_, CheckoutSession, BoxedError> {
        Box::pin(async move {
            if self.base_url.trim().is_empty() {
                return Err(BoxedError::msg("fallback checkout URL is not configured"));
            }
            let separator = if self.base_url.contains('?') { '&' } else { '?' };
            let redirect_url = format!(
                "{}{}appointment_id={}&deposit={}",
                self.base_url, separator, request.appointment_id, request.deposit_cents
            );
            info!(
                "Direct checkout for appointment {}; awaiting manual confirmation",
                request.appointment_id
            );
            Ok(CheckoutSession {
                redirect_url,
                session_id: None,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            appointment_id: 42,
            deposit_cents: 1600,
            currency: "usd".to_string(),
            customer_name: "Ana".to_string(),
            customer_email: "ana@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_redirect_carries_appointment_and_deposit() {
        let service = DirectCheckoutService::new("https://shop.test/pending");
        let session = service.create_checkout_session(request()).await.unwrap();
        assert_eq!(
            session.redirect_url,
            "https://shop.test/pending?appointment_id=42&deposit=1600"
        );
        assert!(session.session_id.is_none());
    }

    #[tokio::test]
    async fn test_existing_query_string_is_extended() {
        let service = DirectCheckoutService::new("https://shop.test/pending?src=web");
        let session = service.create_checkout_session(request()).await.unwrap();
        assert!(session.redirect_url.ends_with("?src=web&appointment_id=42&deposit=1600"));
    }

    #[tokio::test]
    async fn test_missing_base_url_fails() {
        let service = DirectCheckoutService::new("");
        assert!(service.create_checkout_session(request()).await.is_err());
    }
}
