// --- File: crates/services/slotbook_backend/src/service_factory.rs ---
//! Service factory implementation.
//!
//! Picks the catalog and checkout collaborators from the configuration so the
//! workflow never needs to know which payment provider is live.
use crate::app_state::StartupError;
use slotbook_booking::{ConfigCatalog, DirectCheckoutService};
use slotbook_common::services::{CatalogService, CheckoutService};
use slotbook_config::AppConfig;
use std::sync::Arc;
use tracing::info;

#[cfg(feature = "stripe")]
use slotbook_stripe::{StripeCheckoutService, StripeCredentials};

pub struct SlotbookServiceFactory {
    catalog: Arc<dyn CatalogService>,
    checkout: Arc<dyn CheckoutService>,
    /// Present only when Stripe is the checkout provider.
    webhook_secret: Option<String>,
}

impl SlotbookServiceFactory {
    pub fn new(config: &AppConfig) -> Result<Self, StartupError> {
        let catalog: Arc<dyn CatalogService> = Arc::new(ConfigCatalog::from_config(&config.catalog));

        if config.use_stripe {
            return Self::with_stripe(config, catalog);
        }

        info!(
            "Stripe disabled; checkout redirects to {}",
            config.booking.fallback_checkout_url
        );
        Ok(Self {
            catalog,
            checkout: Arc::new(DirectCheckoutService::new(
                config.booking.fallback_checkout_url.clone(),
            )),
            webhook_secret: None,
        })
    }

    #[cfg(feature = "stripe")]
    fn with_stripe(
        config: &AppConfig,
        catalog: Arc<dyn CatalogService>,
    ) -> Result<Self, StartupError> {
        let stripe_config = config.stripe.clone().ok_or_else(|| {
            StartupError::Config("use_stripe is set but [stripe] is missing".to_string())
        })?;
        let credentials = StripeCredentials::from_env()?;
        info!("Stripe checkout enabled against {}", stripe_config.api_base);
        Ok(Self {
            catalog,
            checkout: Arc::new(StripeCheckoutService::new(
                stripe_config,
                credentials.secret_key,
            )),
            webhook_secret: Some(credentials.webhook_secret),
        })
    }

    #[cfg(not(feature = "stripe"))]
    fn with_stripe(
        _config: &AppConfig,
        _catalog: Arc<dyn CatalogService>,
    ) -> Result<Self, StartupError> {
        Err(StartupError::Config(
            "use_stripe is set but this build lacks the `stripe` feature".to_string(),
        ))
    }

    /// Assemble a factory from ready-made collaborators.
    pub fn from_parts(
        catalog: Arc<dyn CatalogService>,
        checkout: Arc<dyn CheckoutService>,
        webhook_secret: Option<String>,
    ) -> Self {
        Self {
            catalog,
            checkout,
            webhook_secret,
        }
    }

    pub fn catalog_service(&self) -> Arc<dyn CatalogService> {
        self.catalog.clone()
    }

    pub fn checkout_service(&self) -> Arc<dyn CheckoutService> {
        self.checkout.clone()
    }

    pub fn webhook_secret(&self) -> Option<&str> {
        self.webhook_secret.as_deref()
    }
}
