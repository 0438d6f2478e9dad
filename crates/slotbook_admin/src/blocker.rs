// --- File: crates/slotbook_admin/src/blocker.rs ---
//! Administrative blocking of slots, one at a time or over a time range.
//!
//! Range blocking is deliberately not atomic: every hour in the range is attempted,
//! failures are collected, and slots already blocked stay blocked.

use crate::error::AdminError;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use slotbook_booking::{BookingError, SlotCalendar};
use slotbook_common::models::{DATE_FORMAT, TIME_FORMAT};
use tracing::{info, warn};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Longest range a single block request may cover.
pub const MAX_RANGE_DAYS: i64 = 62;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// RFC 3339 (the offset is ignored) or a naive `YYYY-MM-DDTHH:MM[:SS]`.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, AdminError> {
    let raw = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Ok(with_offset.naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| AdminError::Validation(format!("Invalid timestamp '{}'", raw)))
}

/// Every whole-hour instant `t` with `start <= t < end`, as (date, time) pairs.
pub fn hourly_boundaries(
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Vec<(NaiveDate, NaiveTime)>, AdminError> {
    if end <= start {
        return Err(AdminError::Validation(
            "end must be after start".to_string(),
        ));
    }
    if end - start > Duration::days(MAX_RANGE_DAYS) {
        return Err(AdminError::Validation(format!(
            "range may span at most {} days",
            MAX_RANGE_DAYS
        )));
    }

    let floor = start
        - Duration::minutes(i64::from(start.minute()))
        - Duration::seconds(i64::from(start.second()))
        - Duration::nanoseconds(i64::from(start.nanosecond()));
    let mut cursor = if floor < start {
        floor + Duration::hours(1)
    } else {
        floor
    };

    let mut boundaries = Vec::new();
    while cursor < end {
        boundaries.push((cursor.date(), cursor.time()));
        cursor += Duration::hours(1);
    }
    Ok(boundaries)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BlockFailure {
    pub date: String,
    pub time: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BlockRangeSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: Vec<BlockFailure>,
}

fn failure_reason(err: &BookingError) -> String {
    match err {
        BookingError::SlotNotFound { .. } => "NotFound".to_string(),
        BookingError::SlotBooked { .. } => "SlotBooked".to_string(),
        other => format!("StoreError: {}", other),
    }
}

#[derive(Debug, Clone)]
pub struct SlotBlocker {
    calendar: SlotCalendar,
}

impl SlotBlocker {
    pub fn new(calendar: SlotCalendar) -> Self {
        Self { calendar }
    }

    pub async fn block_slot(&self, date: NaiveDate, time: NaiveTime) -> Result<(), AdminError> {
        self.calendar
            .set_availability_unless_booked(date, time, false)
            .await?;
        info!("Blocked slot {} {}", date, time);
        Ok(())
    }

    /// Fails with `SlotBooked` while a pending or confirmed appointment holds the slot.
    pub async fn unblock_slot(&self, date: NaiveDate, time: NaiveTime) -> Result<(), AdminError> {
        self.calendar
            .set_availability_unless_booked(date, time, true)
            .await?;
        info!("Unblocked slot {} {}", date, time);
        Ok(())
    }

    pub async fn block_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<BlockRangeSummary, AdminError> {
        let boundaries = hourly_boundaries(start, end)?;
        let mut summary = BlockRangeSummary {
            attempted: boundaries.len(),
            ..BlockRangeSummary::default()
        };

        for (date, time) in boundaries {
            match self
                .calendar
                .set_availability_unless_booked(date, time, false)
                .await
            {
                Ok(()) => summary.succeeded += 1,
                Err(e) => {
                    if !matches!(e, BookingError::SlotNotFound { .. }) {
                        warn!("Could not block {} {}: {}", date, time, e);
                    }
                    summary.failed.push(BlockFailure {
                        date: date.format(DATE_FORMAT).to_string(),
                        time: time.format(TIME_FORMAT).to_string(),
                        reason: failure_reason(&e),
                    });
                }
            }
        }

        info!(
            "Range block {} .. {}: {} of {} slots blocked",
            start, end, summary.succeeded, summary.attempted
        );
        Ok(summary)
    }
}
