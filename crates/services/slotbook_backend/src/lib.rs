// --- File: crates/services/slotbook_backend/src/lib.rs ---
pub mod app_state;
pub mod router;
pub mod service_factory;

pub use app_state::{AppState, StartupError};
pub use router::build_router;
