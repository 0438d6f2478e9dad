// --- File: crates/slotbook_common/src/services.rs ---
//! Service abstractions for external collaborators.
//!
//! The reservation core talks to the product catalog and to the payment/checkout
//! provider only through these traits, so both can be swapped (or mocked) without
//! touching the workflow.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl BoxedError {
    pub fn new<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        BoxedError(Box::new(err))
    }

    pub fn msg(message: impl Into<String>) -> Self {
        BoxedError(Box::from(message.into()))
    }
}

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// A sellable service as published by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CatalogEntry {
    pub id: String,
    pub display_name: String,
    /// Authoritative price in cents.
    pub price_cents: i64,
}

/// The product catalog. Prices come from here, never from the client.
pub trait CatalogService: Send + Sync {
    fn list_bookable_services(&self) -> BoxFuture<'_, Vec<CatalogEntry>, BoxedError>;
}

/// Everything the checkout provider needs to collect a deposit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutRequest {
    pub appointment_id: i64,
    pub deposit_cents: i64,
    pub currency: String,
    pub customer_name: String,
    pub customer_email: String,
}

/// Where to send the customer to pay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutSession {
    pub redirect_url: String,
    /// Provider-side session id, when the provider issues one.
    pub session_id: Option<String>,
}

/// The payment/cart collaborator that takes over after a slot is reserved.
///
/// Order confirmation flows back asynchronously (webhook or admin action).
pub trait CheckoutService: Send + Sync {
    fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> BoxFuture<'_, CheckoutSession, BoxedError>;
}

#[cfg(any(test, feature = "test-util"))]
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Catalog backed by a fixed list.
    pub struct MockCatalogService {
        entries: Vec<CatalogEntry>,
        fail: bool,
    }

    impl MockCatalogService {
        pub fn new(entries: Vec<CatalogEntry>) -> Self {
            Self {
                entries,
                fail: false,
            }
        }

        pub fn with_prices(prices: &[(&str, i64)]) -> Self {
            Self::new(
                prices
                    .iter()
                    .map(|(id, price_cents)| CatalogEntry {
                        id: id.to_string(),
                        display_name: id.to_string(),
                        price_cents: *price_cents,
                    })
                    .collect(),
            )
        }

        pub fn failing() -> Self {
            Self {
                entries: Vec::new(),
                fail: true,
            }
        }
    }

    impl CatalogService for MockCatalogService {
        fn list_bookable_services(&self) -> BoxFuture<'_, Vec<CatalogEntry>, BoxedError> {
            Box::pin(async move {
                if self.fail {
                    return Err(BoxedError::msg("catalog unavailable"));
                }
                Ok(self.entries.clone())
            })
        }
    }

    /// How the mock checkout answers.
    #[derive(Debug, Clone)]
    pub enum CheckoutBehavior {
        Redirect(String),
        Fail(String),
        /// Returns an empty redirect target.
        EmptyRedirect,
        /// Sleeps before redirecting, to exercise timeouts.
        Delay(Duration),
    }

    /// Checkout that records every request it receives.
    pub struct MockCheckoutService {
        behavior: Mutex<CheckoutBehavior>,
        pub requests: Mutex<Vec<CheckoutRequest>>,
    }

    impl MockCheckoutService {
        pub fn new(behavior: CheckoutBehavior) -> Self {
            Self {
                behavior: Mutex::new(behavior),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn redirecting_to(url: &str) -> Self {
            Self::new(CheckoutBehavior::Redirect(url.to_string()))
        }

        pub fn set_behavior(&self, behavior: CheckoutBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl CheckoutService for MockCheckoutService {
        fn create_checkout_session(
            &self,
            request: CheckoutRequest,
        ) -> BoxFuture<'_, CheckoutSession, BoxedError> {
            Box::pin(async move {
                let appointment_id = request.appointment_id;
                self.requests.lock().unwrap().push(request);
                let behavior = self.behavior.lock().unwrap().clone();
                match behavior {
                    CheckoutBehavior::Redirect(url) => Ok(CheckoutSession {
                        redirect_url: format!("{}?appointment_id={}", url, appointment_id),
                        session_id: Some(format!("mock_session_{}", appointment_id)),
                    }),
                    CheckoutBehavior::Fail(message) => Err(BoxedError::msg(message)),
                    CheckoutBehavior::EmptyRedirect => Ok(CheckoutSession {
                        redirect_url: String::new(),
                        session_id: None,
                    }),
                    CheckoutBehavior::Delay(delay) => {
                        tokio::time::sleep(delay).await;
                        Ok(CheckoutSession {
                            redirect_url: format!("https://checkout.test/late/{}", appointment_id),
                            session_id: None,
                        })
                    }
                }
            })
        }
    }
}
