//! Repository for appointments

use crate::error::DbError;
use chrono::{NaiveDate, NaiveTime};

pub use slotbook_common::models::{Appointment, AppointmentStatus, NewAppointment};

/// Outcome of [`AppointmentRepository::insert_reserving_slot`].
#[derive(Debug, Clone, PartialEq)]
pub enum SlotReservation {
    /// The slot flipped to unavailable and the pending appointment was stored.
    Reserved(Appointment),
    /// The slot exists but was not available, or a live appointment already holds it.
    Unavailable,
    SlotNotFound,
}

/// Repository for appointments
pub trait AppointmentRepository: Send + Sync {
    /// Create the `appointments` table and its live-slot index if they don't exist.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Insert a `pending` appointment.
    ///
    /// Fails with [`DbError::UniqueViolation`] if a live appointment already holds the slot.
    fn insert(
        &self,
        appointment: NewAppointment,
    ) -> impl std::future::Future<Output = Result<Appointment, DbError>> + Send;

    /// Flips the slot from available to unavailable and inserts a `pending`
    /// appointment for it in one transaction. Either both take effect or neither does.
    fn insert_reserving_slot(
        &self,
        appointment: NewAppointment,
    ) -> impl std::future::Future<Output = Result<SlotReservation, DbError>> + Send;

    /// Deletes the appointment and makes its slot available again, in one transaction.
    ///
    /// Returns `false` if the appointment was already gone.
    fn delete_releasing_slot(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<bool, DbError>> + Send;

    /// Cancels a `pending` appointment and frees its slot, in one transaction.
    ///
    /// Returns `false` and changes nothing unless the appointment is still pending.
    fn expire_pending(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<bool, DbError>> + Send;

    fn find_by_id(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<Appointment>, DbError>> + Send;

    /// Moves a `pending` appointment to `confirmed`, recording the order reference.
    ///
    /// Returns `false` if the appointment is missing or not pending.
    fn confirm(
        &self,
        id: i64,
        order_reference: &str,
    ) -> impl std::future::Future<Output = Result<bool, DbError>> + Send;

    /// Moves a live appointment to `cancelled`. Returns `false` if missing or already cancelled.
    fn cancel(&self, id: i64) -> impl std::future::Future<Output = Result<bool, DbError>> + Send;

    /// The live appointment holding (date, time), if any.
    fn find_live_for_slot(
        &self,
        date: NaiveDate,
        time: NaiveTime,
    ) -> impl std::future::Future<Output = Result<Option<Appointment>, DbError>> + Send;

    /// Live appointments on or after `from`, ordered by date then time.
    fn list_live_from(
        &self,
        from: NaiveDate,
    ) -> impl std::future::Future<Output = Result<Vec<Appointment>, DbError>> + Send;
}
