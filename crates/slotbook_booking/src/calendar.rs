// --- File: crates/slotbook_booking/src/calendar.rs ---
//! The slot calendar: the single source of truth for which (date, time) pairs are bookable.

use crate::error::BookingError;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use slotbook_common::models::Slot;
use slotbook_config::ScheduleConfig;
use slotbook_db::{DbClient, GuardedUpdate, SlotRepository, SlotTransition, SqlSlotRepository};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct SlotCalendar {
    slots: SqlSlotRepository,
}

impl SlotCalendar {
    pub fn new(db_client: DbClient) -> Self {
        Self {
            slots: SqlSlotRepository::new(db_client),
        }
    }

    /// Available times on `date`, ascending. Unknown dates yield an empty list.
    pub async fn list_available(&self, date: NaiveDate) -> Result<Vec<NaiveTime>, BookingError> {
        Ok(self.slots.list_available(date).await?)
    }

    /// `false` for slots that were never provisioned.
    pub async fn is_available(&self, date: NaiveDate, time: NaiveTime) -> Result<bool, BookingError> {
        Ok(self
            .slots
            .find(date, time)
            .await?
            .map(|slot| slot.is_available)
            .unwrap_or(false))
    }

    pub async fn set_availability(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        available: bool,
    ) -> Result<(), BookingError> {
        if self.slots.set_availability(date, time, available).await? {
            Ok(())
        } else {
            Err(BookingError::SlotNotFound { date, time })
        }
    }

    /// Atomically flips an available slot to unavailable.
    ///
    /// Of any number of concurrent callers for the same slot, exactly one succeeds.
    pub async fn reserve(&self, date: NaiveDate, time: NaiveTime) -> Result<(), BookingError> {
        match self.slots.transition(date, time, true, false).await? {
            SlotTransition::Applied => {
                debug!("Reserved slot {} {}", date, time);
                Ok(())
            }
            SlotTransition::PreconditionFailed | SlotTransition::NotFound => {
                Err(BookingError::SlotUnavailable { date, time })
            }
        }
    }

    /// Returns a reserved slot to the pool. Already-available slots are left as they are.
    pub async fn release(&self, date: NaiveDate, time: NaiveTime) -> Result<(), BookingError> {
        match self.slots.transition(date, time, false, true).await? {
            SlotTransition::Applied => {
                debug!("Released slot {} {}", date, time);
                Ok(())
            }
            SlotTransition::PreconditionFailed => {
                warn!("Slot {} {} was already available on release", date, time);
                Ok(())
            }
            SlotTransition::NotFound => Err(BookingError::SlotNotFound { date, time }),
        }
    }

    /// Writes the flag unless a pending or confirmed appointment holds the slot.
    pub async fn set_availability_unless_booked(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        available: bool,
    ) -> Result<(), BookingError> {
        match self
            .slots
            .set_availability_unless_booked(date, time, available)
            .await?
        {
            GuardedUpdate::Updated => Ok(()),
            GuardedUpdate::NotFound => Err(BookingError::SlotNotFound { date, time }),
            GuardedUpdate::Booked => Err(BookingError::SlotBooked { date, time }),
        }
    }

    /// Every slot with `from <= date < until`, ordered by date then time.
    pub async fn slots_between(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<Slot>, BookingError> {
        Ok(self.slots.list_between(from, until).await?)
    }

    /// Inserts every slot of the plan that does not exist yet. Existing slots keep their state.
    pub async fn provision(&self, plan: &ProvisionPlan) -> Result<u64, BookingError> {
        let keys = plan.keys();
        let inserted = self.slots.provision(&keys).await?;
        info!(
            "Provisioned {} of {} planned slots from {} over {} days",
            inserted,
            keys.len(),
            plan.from,
            plan.days
        );
        Ok(inserted)
    }
}

/// Which slots should exist: `times` on every matching weekday in `[from, from + days)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionPlan {
    pub from: NaiveDate,
    pub days: u32,
    pub times: Vec<NaiveTime>,
    pub weekdays: Vec<Weekday>,
}

impl ProvisionPlan {
    pub fn from_schedule(schedule: &ScheduleConfig, from: NaiveDate) -> Result<Self, BookingError> {
        Ok(Self {
            from,
            days: schedule.horizon_days,
            times: schedule.times_of_day().map_err(BookingError::Validation)?,
            weekdays: schedule.weekday_filter().map_err(BookingError::Validation)?,
        })
    }

    pub fn keys(&self) -> Vec<(NaiveDate, NaiveTime)> {
        (0..i64::from(self.days))
            .map(|offset| self.from + Duration::days(offset))
            .filter(|date| self.weekdays.is_empty() || self.weekdays.contains(&date.weekday()))
            .flat_map(|date| self.times.iter().map(move |time| (date, *time)))
            .collect()
    }
}
