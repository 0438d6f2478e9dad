// --- File: crates/services/slotbook_backend/src/app_state.rs ---
use crate::service_factory::SlotbookServiceFactory;
use chrono::Local;
use slotbook_admin::SessionStore;
use slotbook_booking::{
    BookingError, ProvisionPlan, ReservationWorkflow, SlotCalendar, WorkflowSettings,
};
use slotbook_common::logging;
use slotbook_config::AppConfig;
use slotbook_db::{init_schema, DbClient, DbError};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Anything that stops the server from coming up.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Booking setup error: {0}")]
    Booking(#[from] BookingError),

    #[cfg(feature = "stripe")]
    #[error("Stripe setup error: {0}")]
    Stripe(#[from] slotbook_stripe::StripeError),
}

/// Application state that is shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbClient,
    pub workflow: Arc<ReservationWorkflow>,
    pub sessions: Arc<SessionStore>,
    /// Set when Stripe webhooks should be served.
    pub webhook_secret: Option<String>,
}

impl AppState {
    /// Opens the store, reconciles the slot calendar and wires the collaborators.
    pub async fn new(config: Arc<AppConfig>) -> Result<Self, StartupError> {
        let db = DbClient::new(&config).await?;
        let factory = SlotbookServiceFactory::new(&config)?;
        Self::with_factory(config, db, factory).await
    }

    /// Same as [`AppState::new`] over an already opened store and chosen collaborators.
    pub async fn with_factory(
        config: Arc<AppConfig>,
        db: DbClient,
        factory: SlotbookServiceFactory,
    ) -> Result<Self, StartupError> {
        init_schema(&db).await?;

        if config.schedule.provision_on_startup {
            let today = Local::now().date_naive();
            let plan = ProvisionPlan::from_schedule(&config.schedule, today)?;
            let inserted = logging::log_result(
                SlotCalendar::new(db.clone()).provision(&plan).await,
                "Startup provisioning finished",
                "Startup provisioning failed",
            )?;
            info!(
                "Provisioned {} new slots for the next {} days",
                inserted, plan.days
            );
        }

        let settings = WorkflowSettings::from_config(&config.booking)?;
        let workflow = Arc::new(ReservationWorkflow::new(
            db.clone(),
            factory.catalog_service(),
            factory.checkout_service(),
            settings,
        ));
        let sessions = Arc::new(SessionStore::new(&config.admin));

        Ok(Self {
            webhook_secret: factory.webhook_secret().map(str::to_string),
            config,
            db,
            workflow,
            sessions,
        })
    }
}
