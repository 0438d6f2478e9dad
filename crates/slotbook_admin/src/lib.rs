// --- File: crates/slotbook_admin/src/lib.rs ---
pub mod auth;
pub mod blocker;
#[cfg(test)]
mod blocker_proptest;
#[cfg(test)]
mod blocker_test;
pub mod dashboard;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod session;

pub use blocker::{BlockRangeSummary, SlotBlocker};
pub use error::AdminError;
pub use session::{AdminSession, SessionStore};
