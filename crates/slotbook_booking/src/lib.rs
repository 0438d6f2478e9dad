// --- File: crates/slotbook_booking/src/lib.rs ---
pub mod calendar;
#[cfg(test)]
mod calendar_test;
pub mod catalog;
pub mod checkout;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
#[cfg(test)]
mod logic_proptest;
pub mod routes;
pub mod workflow;
#[cfg(test)]
mod workflow_test;

pub use calendar::{ProvisionPlan, SlotCalendar};
pub use catalog::ConfigCatalog;
pub use checkout::DirectCheckoutService;
pub use error::BookingError;
pub use logic::DepositPolicy;
pub use workflow::{ReservationWorkflow, WorkflowSettings};
