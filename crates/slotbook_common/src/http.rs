// --- File: crates/slotbook_common/src/http.rs ---
//! Rendering of [`SlotbookError`] as the `{"error": {"message", "code"}}` body that every
//! booking, admin and webhook route answers with on failure.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error};

use crate::error::{HttpStatusCode, SlotbookError};

pub mod client;

/// Extension trait for SlotbookError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for SlotbookError {
    /// Server-side faults (a failed rollback, a store outage, a checkout timeout) are
    /// logged at `error` before they leave; client mistakes only at `debug`.
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = self.to_string();

        if status_code.is_server_error() {
            error!("Request failed with {}: {}", status_code, message);
        } else {
            debug!("Request rejected with {}: {}", status_code, message);
        }

        let body = Json(json!({
            "error": {
                "message": message,
                "code": status_code.as_u16(),
            }
        }));

        (status_code, body).into_response()
    }
}

/// Lets handlers return `Result<Json<T>, SlotbookError>` directly.
impl IntoResponse for SlotbookError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}
