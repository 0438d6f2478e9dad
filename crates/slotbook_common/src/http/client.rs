// --- File: crates/slotbook_common/src/http/client.rs ---
use once_cell::sync::Lazy;
use reqwest::{Client, Error as ReqwestError};
use std::time::Duration;

/// Default timeout for HTTP requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A static HTTP client reused for every outbound call (payment provider API).
pub static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    create_client(DEFAULT_TIMEOUT_SECS).unwrap_or_else(|e| {
        tracing::warn!("Falling back to default HTTP client: {}", e);
        Client::new()
    })
});

/// Creates a new HTTP client with the given timeout and no redirect following.
pub fn create_client(timeout_secs: u64) -> Result<Client, ReqwestError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .redirect(reqwest::redirect::Policy::none())
        .build()
}
