// File: crates/slotbook_booking/src/doc.rs
#![cfg(feature = "openapi")]

use crate::logic::{AvailabilityQuery, AvailableSlot, BookingRequest, BookingResponse, ServiceListing};
use slotbook_common::models::AppointmentStatus;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::get_availability_handler,
        crate::handlers::list_services_handler,
        crate::handlers::book_slot_handler
    ),
    components(schemas(
        AvailabilityQuery,
        AvailableSlot,
        ServiceListing,
        BookingRequest,
        BookingResponse,
        AppointmentStatus
    )),
    tags(
        (name = "Booking", description = "Slot availability and reservations")
    )
)]
pub struct BookingApiDoc;
