// --- File: crates/slotbook_admin/src/doc.rs ---
#![cfg(feature = "openapi")]

use crate::blocker::{BlockFailure, BlockRangeSummary};
use crate::dashboard::{DashboardView, SlotState, SlotStateEntry};
use crate::handlers::{
    ActionResponse, BlockRangeRequest, ConfirmRequest, LoginRequest, LoginResponse,
    ProvisionRequest, ProvisionResponse, SlotRequest,
};
use slotbook_common::models::{Appointment, AppointmentStatus};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::login_handler,
        crate::handlers::logout_handler,
        crate::handlers::block_slot_handler,
        crate::handlers::unblock_slot_handler,
        crate::handlers::block_range_handler,
        crate::handlers::provision_handler,
        crate::handlers::dashboard_handler,
        crate::handlers::confirm_appointment_handler,
        crate::handlers::cancel_appointment_handler
    ),
    components(schemas(
        LoginRequest,
        LoginResponse,
        ActionResponse,
        SlotRequest,
        BlockRangeRequest,
        BlockRangeSummary,
        BlockFailure,
        ProvisionRequest,
        ProvisionResponse,
        ConfirmRequest,
        DashboardView,
        SlotStateEntry,
        SlotState,
        Appointment,
        AppointmentStatus
    )),
    tags(
        (name = "Admin", description = "Administrator sessions, slot blocking and appointments")
    )
)]
pub struct AdminApiDoc;
