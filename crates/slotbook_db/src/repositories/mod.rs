//! Repositories for the slot calendar and appointments.

pub mod appointment;
pub mod appointment_sql;
pub mod slot;
pub mod slot_sql;

pub use appointment::{AppointmentRepository, SlotReservation};
pub use appointment_sql::SqlAppointmentRepository;
pub use slot::{GuardedUpdate, SlotRepository, SlotTransition};
pub use slot_sql::SqlSlotRepository;

use crate::error::DbError;
use chrono::{NaiveDate, NaiveTime};
use slotbook_common::models::{DATE_FORMAT, TIME_FORMAT};

pub(crate) fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn time_key(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| DbError::DecodeError(format!("date '{}': {}", raw, e)))
}

pub(crate) fn parse_time(raw: &str) -> Result<NaiveTime, DbError> {
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .map_err(|e| DbError::DecodeError(format!("time '{}': {}", raw, e)))
}
