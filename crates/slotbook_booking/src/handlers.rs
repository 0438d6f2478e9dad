// --- File: crates/slotbook_booking/src/handlers.rs ---
use crate::logic::{
    parse_date, AvailabilityQuery, AvailableSlot, BookingRequest, BookingResponse, ServiceListing,
};
use crate::workflow::ReservationWorkflow;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use slotbook_common::SlotbookError;
use std::sync::Arc;
use tracing::{info, warn};

// Shared state for the public booking routes
#[derive(Clone)]
pub struct BookingState {
    pub workflow: Arc<ReservationWorkflow>,
}

/// Handler to list the open slots of one day.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Open slots, ascending", body = Vec<AvailableSlot>),
        (status = 400, description = "Invalid date format"),
        (status = 500, description = "Internal error")
    ),
    tag = "Booking"
))]
pub async fn get_availability_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<AvailableSlot>>, SlotbookError> {
    let date = parse_date(&query.date)?;
    let times = state.workflow.calendar().list_available(date).await?;
    Ok(Json(times.into_iter().map(AvailableSlot::from).collect()))
}

/// Handler to list the bookable services with their deposit.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/services",
    responses(
        (status = 200, description = "Bookable services", body = Vec<ServiceListing>),
        (status = 502, description = "Catalog unavailable")
    ),
    tag = "Booking"
))]
pub async fn list_services_handler(
    State(state): State<Arc<BookingState>>,
) -> Result<Json<Vec<ServiceListing>>, SlotbookError> {
    let policy = state.workflow.deposit_policy();
    let services = state.workflow.list_services().await?;
    Ok(Json(
        services
            .into_iter()
            .map(|entry| ServiceListing::new(entry, policy))
            .collect(),
    ))
}

/// Handler to reserve a slot and start checkout.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/book",
    request_body = BookingRequest,
    responses(
        (status = 201, description = "Slot reserved, continue at redirect_url", body = BookingResponse),
        (status = 400, description = "Invalid customer data, service, date or time"),
        (status = 409, description = "Slot not available"),
        (status = 502, description = "Checkout handoff failed, nothing was reserved"),
        (status = 500, description = "Internal error")
    ),
    tag = "Booking"
))]
pub async fn book_slot_handler(
    State(state): State<Arc<BookingState>>,
    Json(payload): Json<BookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), SlotbookError> {
    info!(
        "Booking request for {} at {} {}",
        payload.service_id, payload.date, payload.time
    );
    match state.workflow.book(payload).await {
        Ok(response) => Ok((StatusCode::CREATED, Json(response))),
        Err(e) => {
            warn!("Booking rejected: {}", e);
            Err(e.into())
        }
    }
}
