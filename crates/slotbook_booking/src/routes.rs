// --- File: crates/slotbook_booking/src/routes.rs ---
use crate::handlers::{
    book_slot_handler, get_availability_handler, list_services_handler, BookingState,
};
use crate::workflow::ReservationWorkflow;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Creates the router for the public booking routes.
pub fn routes(workflow: Arc<ReservationWorkflow>) -> Router {
    let state = Arc::new(BookingState { workflow });

    Router::new()
        .route("/availability", get(get_availability_handler))
        .route("/services", get(list_services_handler))
        .route("/book", post(book_slot_handler))
        .with_state(state)
}
