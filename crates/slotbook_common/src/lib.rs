// --- File: crates/slotbook_common/src/lib.rs ---
pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Shared domain records
pub mod services; // Collaborator abstractions

// Re-export error types and utilities for easier access
pub use error::{conflict, external_service_error, HttpStatusCode, SlotbookError};

// Re-export HTTP utilities for easier access
pub use http::{
    client::{create_client, HTTP_CLIENT},
    IntoHttpResponse,
};

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level, log_error, log_result, parse_level};
