// --- File: crates/slotbook_admin/src/auth.rs ---

use crate::error::AdminError;
use crate::session::SessionStore;
use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use slotbook_common::SlotbookError;
use std::sync::Arc;
use tracing::debug;

/// The token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Axum middleware that lets a request through only with a live admin session.
///
/// The session is added to the request extensions for the handlers.
pub async fn require_admin_session(
    State(store): State<Arc<SessionStore>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let session = match bearer_token(req.headers()) {
        Some(token) => store.validate(token).await,
        None => Err(AdminError::NotAuthenticated),
    };

    match session {
        Ok(session) => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        Err(e) => {
            debug!("Admin request rejected: {}", e);
            SlotbookError::from(e).into_response()
        }
    }
}
