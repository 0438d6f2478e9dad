// --- File: crates/slotbook_admin/src/routes.rs ---

use crate::auth::require_admin_session;
use crate::blocker::SlotBlocker;
use crate::handlers::{
    block_range_handler, block_slot_handler, cancel_appointment_handler,
    confirm_appointment_handler, dashboard_handler, login_handler, logout_handler,
    provision_handler, unblock_slot_handler, AdminState,
};
use crate::session::SessionStore;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use slotbook_booking::ReservationWorkflow;
use slotbook_config::ScheduleConfig;
use std::sync::Arc;

/// Creates the router for the admin API.
///
/// Everything except `/admin/login` requires a bearer session token.
pub fn routes(
    sessions: Arc<SessionStore>,
    workflow: Arc<ReservationWorkflow>,
    schedule: ScheduleConfig,
) -> Router {
    let state = Arc::new(AdminState {
        sessions: sessions.clone(),
        blocker: SlotBlocker::new(workflow.calendar().clone()),
        workflow,
        schedule,
    });

    let protected = Router::new()
        .route("/admin/logout", post(logout_handler))
        .route("/admin/slots/block", post(block_slot_handler))
        .route("/admin/slots/unblock", post(unblock_slot_handler))
        .route("/admin/slots/block-range", post(block_range_handler))
        .route("/admin/slots/provision", post(provision_handler))
        .route("/admin/dashboard", get(dashboard_handler))
        .route(
            "/admin/appointments/{id}/confirm",
            post(confirm_appointment_handler),
        )
        .route(
            "/admin/appointments/{id}/cancel",
            post(cancel_appointment_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            sessions,
            require_admin_session,
        ));

    Router::new()
        .route("/admin/login", post(login_handler))
        .merge(protected)
        .with_state(state)
}
