// --- File: crates/slotbook_admin/src/dashboard.rs ---
use crate::error::AdminError;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use slotbook_booking::ReservationWorkflow;
use slotbook_common::models::{slot_label, Appointment, DATE_FORMAT, TIME_FORMAT};
use std::collections::HashMap;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

pub const DEFAULT_DAYS: i64 = 30;
pub const MAX_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    Available,
    Blocked,
    Booked,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SlotStateEntry {
    pub date: String,
    pub time: String,
    pub label: String,
    pub state: SlotState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct DashboardView {
    /// Live appointments from `today` on, by date then time.
    pub appointments: Vec<Appointment>,
    pub slot_states: Vec<SlotStateEntry>,
}

/// Upcoming appointments and the state of every slot in `[today, today + days)`.
pub async fn build_dashboard(
    workflow: &ReservationWorkflow,
    today: NaiveDate,
    days: i64,
) -> Result<DashboardView, AdminError> {
    if !(1..=MAX_DAYS).contains(&days) {
        return Err(AdminError::Validation(format!(
            "days must be between 1 and {}",
            MAX_DAYS
        )));
    }

    let appointments = workflow.upcoming_appointments(today).await?;
    let slots = workflow
        .calendar()
        .slots_between(today, today + Duration::days(days))
        .await?;

    let by_slot: HashMap<_, &Appointment> = appointments
        .iter()
        .map(|a| ((a.date, a.time), a))
        .collect();

    let slot_states = slots
        .into_iter()
        .map(|slot| {
            let holder = by_slot.get(&(slot.date, slot.time));
            let state = match (holder, slot.is_available) {
                (Some(_), _) => SlotState::Booked,
                (None, true) => SlotState::Available,
                (None, false) => SlotState::Blocked,
            };
            SlotStateEntry {
                date: slot.date.format(DATE_FORMAT).to_string(),
                time: slot.time.format(TIME_FORMAT).to_string(),
                label: slot_label(slot.time),
                state,
                appointment_id: holder.map(|a| a.id),
                customer_name: holder.map(|a| a.customer_name.clone()),
            }
        })
        .collect();

    Ok(DashboardView {
        appointments,
        slot_states,
    })
}
