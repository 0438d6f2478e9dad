//! Repository for the slot calendar
//!
//! One row per provisioned (date, time) pair with its availability flag.

use crate::error::DbError;
use chrono::{NaiveDate, NaiveTime};

pub use slotbook_common::models::Slot;

/// Outcome of a compare-and-set on a slot's availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotTransition {
    /// The slot was in the expected state and now holds the new one.
    Applied,
    /// The slot exists but was not in the expected state; nothing changed.
    PreconditionFailed,
    /// No such slot was ever provisioned.
    NotFound,
}

/// Outcome of an availability write that refuses to touch booked slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedUpdate {
    Updated,
    NotFound,
    /// A pending or confirmed appointment holds the slot.
    Booked,
}

/// Repository for the slot calendar
pub trait SlotRepository: Send + Sync {
    /// Create the `slots` table if it doesn't exist.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Times of all available slots on `date`, ascending.
    fn list_available(
        &self,
        date: NaiveDate,
    ) -> impl std::future::Future<Output = Result<Vec<NaiveTime>, DbError>> + Send;

    fn find(
        &self,
        date: NaiveDate,
        time: NaiveTime,
    ) -> impl std::future::Future<Output = Result<Option<Slot>, DbError>> + Send;

    /// Unconditionally overwrite the flag. Returns `false` if the slot does not exist.
    fn set_availability(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        available: bool,
    ) -> impl std::future::Future<Output = Result<bool, DbError>> + Send;

    /// Set the flag to `to` only if it currently equals `from`, in a single statement.
    fn transition(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        from: bool,
        to: bool,
    ) -> impl std::future::Future<Output = Result<SlotTransition, DbError>> + Send;

    /// Set the flag unless a live appointment references the slot, in a single statement.
    fn set_availability_unless_booked(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        available: bool,
    ) -> impl std::future::Future<Output = Result<GuardedUpdate, DbError>> + Send;

    /// Insert every missing key as available; existing rows are left untouched.
    ///
    /// Returns the number of rows inserted.
    fn provision(
        &self,
        keys: &[(NaiveDate, NaiveTime)],
    ) -> impl std::future::Future<Output = Result<u64, DbError>> + Send;

    /// All slots with `from <= date < until`, ordered by date then time.
    fn list_between(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> impl std::future::Future<Output = Result<Vec<Slot>, DbError>> + Send;
}
