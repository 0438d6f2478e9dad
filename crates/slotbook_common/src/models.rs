// --- File: crates/slotbook_common/src/models.rs ---
//! Domain records shared between the store, the workflows and the HTTP layer.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Storage format for slot dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Storage format for slot times.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// One bookable (date, time-of-day) unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Slot {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub is_available: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    /// Pending and confirmed appointments hold their slot.
    pub fn is_live(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("unknown appointment status '{}'", other)),
        }
    }
}

/// A customer's booking of one slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Appointment {
    pub id: i64,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub service_id: String,
    pub service_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub total_price_cents: i64,
    pub deposit_cents: i64,
    pub status: AppointmentStatus,
    pub order_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to insert an appointment; the store assigns id, status and timestamp.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub service_id: String,
    pub service_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub total_price_cents: i64,
    pub deposit_cents: i64,
}

/// Formats an amount in cents as `$12.34`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}

/// Customer-facing label for a slot time, e.g. `9:00 AM`.
pub fn slot_label(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(1600), "$16.00");
        assert_eq!(format_cents(5), "$0.05");
        assert_eq!(format_cents(-250), "-$2.50");
    }

    #[test]
    fn test_slot_label() {
        assert_eq!(slot_label(NaiveTime::from_hms_opt(9, 0, 0).unwrap()), "9:00 AM");
        assert_eq!(slot_label(NaiveTime::from_hms_opt(14, 0, 0).unwrap()), "2:00 PM");
        assert_eq!(slot_label(NaiveTime::from_hms_opt(12, 0, 0).unwrap()), "12:00 PM");
    }

    #[test]
    fn test_status_round_trips_through_storage_text() {
        for status in [
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<AppointmentStatus>(), Ok(status));
        }
        assert!("booked".parse::<AppointmentStatus>().is_err());
        assert!(!AppointmentStatus::Cancelled.is_live());
    }
}
