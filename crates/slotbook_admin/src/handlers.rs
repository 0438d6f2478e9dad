// --- File: crates/slotbook_admin/src/handlers.rs ---
use crate::auth::bearer_token;
use crate::blocker::{parse_timestamp, BlockRangeSummary, SlotBlocker};
use crate::dashboard::{build_dashboard, DashboardView, DEFAULT_DAYS};
use crate::error::AdminError;
use crate::session::{AdminSession, SessionStore};
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Json,
    Extension,
};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use slotbook_booking::logic::{parse_date, parse_time};
use slotbook_booking::{ProvisionPlan, ReservationWorkflow};
use slotbook_common::models::Appointment;
use slotbook_common::SlotbookError;
use slotbook_config::ScheduleConfig;
use std::sync::Arc;
use tracing::info;

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

// Shared state for the admin routes
#[derive(Clone)]
pub struct AdminState {
    pub sessions: Arc<SessionStore>,
    pub workflow: Arc<ReservationWorkflow>,
    pub blocker: SlotBlocker,
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SlotRequest {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM` or `HH:MM:SS`
    pub time: String,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BlockRangeRequest {
    /// RFC 3339 or `YYYY-MM-DDTHH:MM`
    pub start: String,
    pub end: String,
}

#[derive(Debug, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ProvisionRequest {
    /// First day to provision, defaults to today.
    pub from: Option<String>,
    /// Defaults to the configured horizon.
    pub days: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ProvisionResponse {
    pub inserted: u64,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(IntoParams, ToSchema))]
pub struct DashboardQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ConfirmRequest {
    /// Defaults to a manual reference naming the administrator.
    pub order_reference: Option<String>,
}

/// Handler to exchange admin credentials for a session token.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 429, description = "Too many failed attempts")
    ),
    tag = "Admin"
))]
pub async fn login_handler(
    State(state): State<Arc<AdminState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, SlotbookError> {
    let issued = state
        .sessions
        .login(&payload.username, &payload.password)
        .await?;
    Ok(Json(LoginResponse {
        token: issued.token,
        username: issued.session.username,
        expires_at: issued.session.expires_at,
    }))
}

/// Handler to destroy the caller's session.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/admin/logout",
    responses((status = 200, description = "Logged out", body = ActionResponse)),
    tag = "Admin"
))]
pub async fn logout_handler(
    State(state): State<Arc<AdminState>>,
    headers: HeaderMap,
) -> Json<ActionResponse> {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.logout(token).await;
    }
    ActionResponse::ok("Logged out.")
}

/// Handler to make one slot unbookable.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/admin/slots/block",
    request_body = SlotRequest,
    responses(
        (status = 200, description = "Slot blocked", body = ActionResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Slot does not exist"),
        (status = 409, description = "Slot is held by an appointment")
    ),
    tag = "Admin"
))]
pub async fn block_slot_handler(
    State(state): State<Arc<AdminState>>,
    Extension(session): Extension<AdminSession>,
    Json(payload): Json<SlotRequest>,
) -> Result<Json<ActionResponse>, SlotbookError> {
    let date = parse_date(&payload.date).map_err(AdminError::from)?;
    let time = parse_time(&payload.time).map_err(AdminError::from)?;
    state.blocker.block_slot(date, time).await?;
    info!("Slot {} {} blocked by {}", date, time, session.username);
    Ok(ActionResponse::ok(format!("Slot {} {} blocked.", date, time)))
}

/// Handler to reopen one slot.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/admin/slots/unblock",
    request_body = SlotRequest,
    responses(
        (status = 200, description = "Slot unblocked", body = ActionResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Slot does not exist"),
        (status = 409, description = "Slot is held by an appointment")
    ),
    tag = "Admin"
))]
pub async fn unblock_slot_handler(
    State(state): State<Arc<AdminState>>,
    Extension(session): Extension<AdminSession>,
    Json(payload): Json<SlotRequest>,
) -> Result<Json<ActionResponse>, SlotbookError> {
    let date = parse_date(&payload.date).map_err(AdminError::from)?;
    let time = parse_time(&payload.time).map_err(AdminError::from)?;
    state.blocker.unblock_slot(date, time).await?;
    info!("Slot {} {} unblocked by {}", date, time, session.username);
    Ok(ActionResponse::ok(format!("Slot {} {} unblocked.", date, time)))
}

/// Handler to block every hourly slot in a time range.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/admin/slots/block-range",
    request_body = BlockRangeRequest,
    responses(
        (status = 200, description = "Per-slot outcome", body = BlockRangeSummary),
        (status = 400, description = "Invalid or oversized range"),
        (status = 401, description = "Not authenticated")
    ),
    tag = "Admin"
))]
pub async fn block_range_handler(
    State(state): State<Arc<AdminState>>,
    Json(payload): Json<BlockRangeRequest>,
) -> Result<Json<BlockRangeSummary>, SlotbookError> {
    let start = parse_timestamp(&payload.start)?;
    let end = parse_timestamp(&payload.end)?;
    Ok(Json(state.blocker.block_range(start, end).await?))
}

/// Handler to create missing slots for the configured schedule.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/admin/slots/provision",
    request_body = ProvisionRequest,
    responses(
        (status = 200, description = "Number of slots created", body = ProvisionResponse),
        (status = 401, description = "Not authenticated")
    ),
    tag = "Admin"
))]
pub async fn provision_handler(
    State(state): State<Arc<AdminState>>,
    Json(payload): Json<ProvisionRequest>,
) -> Result<Json<ProvisionResponse>, SlotbookError> {
    let from = match payload.from.as_deref() {
        Some(raw) => parse_date(raw).map_err(AdminError::from)?,
        None => Local::now().date_naive(),
    };
    let mut plan = ProvisionPlan::from_schedule(&state.schedule, from).map_err(AdminError::from)?;
    if let Some(days) = payload.days {
        plan.days = days;
    }
    let inserted = state
        .workflow
        .calendar()
        .provision(&plan)
        .await
        .map_err(AdminError::from)?;
    Ok(Json(ProvisionResponse { inserted }))
}

/// Handler for the admin overview.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/admin/dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Upcoming appointments and slot states", body = DashboardView),
        (status = 401, description = "Not authenticated")
    ),
    tag = "Admin"
))]
pub async fn dashboard_handler(
    State(state): State<Arc<AdminState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardView>, SlotbookError> {
    let today = Local::now().date_naive();
    let days = query.days.unwrap_or(DEFAULT_DAYS);
    Ok(Json(build_dashboard(&state.workflow, today, days).await?))
}

/// Handler to confirm a pending appointment by hand.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/admin/appointments/{id}/confirm",
    params(("id" = i64, Path, description = "Appointment id")),
    request_body = ConfirmRequest,
    responses(
        (status = 200, description = "Confirmed appointment", body = Appointment),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Appointment was cancelled")
    ),
    tag = "Admin"
))]
pub async fn confirm_appointment_handler(
    State(state): State<Arc<AdminState>>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<i64>,
    Json(payload): Json<ConfirmRequest>,
) -> Result<Json<Appointment>, SlotbookError> {
    let order_reference = payload
        .order_reference
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| format!("manual:{}", session.username));
    let appointment = state
        .workflow
        .confirm_appointment(id, &order_reference)
        .await
        .map_err(AdminError::from)?;
    Ok(Json(appointment))
}

/// Handler to cancel an appointment and reopen its slot.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/admin/appointments/{id}/cancel",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Cancelled appointment", body = Appointment),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Appointment already cancelled")
    ),
    tag = "Admin"
))]
pub async fn cancel_appointment_handler(
    State(state): State<Arc<AdminState>>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<i64>,
) -> Result<Json<Appointment>, SlotbookError> {
    let appointment = state
        .workflow
        .cancel_appointment(id)
        .await
        .map_err(AdminError::from)?;
    info!("Appointment {} cancelled by {}", id, session.username);
    Ok(Json(appointment))
}
