//! Persistence for Slotbook
//!
//! Two tables back the reservation core: `slots`, the authoritative availability
//! calendar keyed by (date, time), and `appointments`, the customer bookings that
//! reference them. Both are reached through repository traits with SQLx
//! implementations that run on any `sqlx::Any` backend (SQLite by default).
//!
//! # Example
//!
//! ```rust,no_run
//! use slotbook_db::{init_schema, DbClient};
//!
//! async fn setup_db() -> Result<DbClient, Box<dyn std::error::Error>> {
//!     let db_client = DbClient::in_memory().await?;
//!     init_schema(&db_client).await?;
//!     Ok(db_client)
//! }
//! ```

pub mod client;
pub mod error;
pub mod repositories;

pub use client::DbClient;
pub use error::DbError;
pub use repositories::{
    AppointmentRepository, GuardedUpdate, SlotRepository, SlotReservation, SlotTransition,
    SqlAppointmentRepository, SqlSlotRepository,
};

/// Creates every table the service needs, in dependency order.
pub async fn init_schema(db_client: &DbClient) -> Result<(), DbError> {
    SqlSlotRepository::new(db_client.clone()).init_schema().await?;
    SqlAppointmentRepository::new(db_client.clone())
        .init_schema()
        .await?;
    Ok(())
}
