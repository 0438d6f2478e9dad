// --- File: crates/slotbook_booking/src/logic.rs ---
//! Request/response types, input validation and the deposit policy.

use crate::error::BookingError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use slotbook_common::models::{format_cents, slot_label, AppointmentStatus, DATE_FORMAT, TIME_FORMAT};
use slotbook_common::services::CatalogEntry;
use validator::Validate;

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

// --- Deposit Policy ---

/// Share of the price collected up front, held in basis points so all money math stays integral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositPolicy {
    basis_points: i64,
}

impl DepositPolicy {
    pub const FULL: i64 = 10_000;

    pub fn from_basis_points(basis_points: i64) -> Result<Self, BookingError> {
        if !(0..=Self::FULL).contains(&basis_points) {
            return Err(BookingError::Validation(format!(
                "deposit must be between 0 and {} basis points, got {}",
                Self::FULL,
                basis_points
            )));
        }
        Ok(Self { basis_points })
    }

    /// `0.2` becomes 2000 basis points. Precision below one basis point is rounded away.
    pub fn from_fraction(fraction: f64) -> Result<Self, BookingError> {
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            return Err(BookingError::Validation(format!(
                "deposit fraction must be within 0.0..=1.0, got {}",
                fraction
            )));
        }
        Self::from_basis_points((fraction * Self::FULL as f64).round() as i64)
    }

    pub fn basis_points(&self) -> i64 {
        self.basis_points
    }

    /// Deposit for a price in cents, rounded half-up to the cent.
    pub fn deposit_for(&self, price_cents: i64) -> i64 {
        let half = i128::from(Self::FULL / 2);
        let scaled = i128::from(price_cents) * i128::from(self.basis_points);
        let rounded = if scaled >= 0 {
            (scaled + half) / i128::from(Self::FULL)
        } else {
            (scaled - half) / i128::from(Self::FULL)
        };
        rounded as i64
    }
}

impl Default for DepositPolicy {
    fn default() -> Self {
        Self { basis_points: 2_000 }
    }
}

// --- Parsing ---

pub fn parse_date(raw: &str) -> Result<NaiveDate, BookingError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| BookingError::Validation(format!("Invalid date '{}' (YYYY-MM-DD)", raw)))
}

/// Accepts `HH:MM:SS` and `HH:MM`.
pub fn parse_time(raw: &str) -> Result<NaiveTime, BookingError> {
    let raw_trimmed = raw.trim();
    NaiveTime::parse_from_str(raw_trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw_trimmed, "%H:%M"))
        .map_err(|_| BookingError::Validation(format!("Invalid time '{}' (HH:MM)", raw)))
}

// --- Availability ---

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(IntoParams, ToSchema))]
pub struct AvailabilityQuery {
    /// `YYYY-MM-DD`
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AvailableSlot {
    /// `HH:MM:SS`
    pub time: String,
    /// e.g. `9:00 AM`
    pub label: String,
}

impl From<NaiveTime> for AvailableSlot {
    fn from(time: NaiveTime) -> Self {
        Self {
            time: time.format(TIME_FORMAT).to_string(),
            label: slot_label(time),
        }
    }
}

// --- Catalog listing ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ServiceListing {
    pub id: String,
    pub display_name: String,
    pub price_cents: i64,
    pub price_display: String,
    pub deposit_cents: i64,
    pub deposit_display: String,
}

impl ServiceListing {
    pub fn new(entry: CatalogEntry, policy: DepositPolicy) -> Self {
        let deposit_cents = policy.deposit_for(entry.price_cents);
        Self {
            price_display: format_cents(entry.price_cents),
            deposit_display: format_cents(deposit_cents),
            id: entry.id,
            display_name: entry.display_name,
            price_cents: entry.price_cents,
            deposit_cents,
        }
    }
}

// --- Booking ---

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookingRequest {
    #[serde(alias = "name")]
    #[validate(length(min = 1, message = "customer name is required"))]
    pub customer_name: String,
    #[validate(email(message = "email address is not valid"))]
    pub email: String,
    #[validate(length(min = 1, message = "phone number is required"))]
    pub phone: String,
    #[serde(alias = "service")]
    #[validate(length(min = 1, message = "service is required"))]
    pub service_id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM` or `HH:MM:SS`
    pub time: String,
}

/// A booking request whose fields passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBooking {
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub service_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// Trims the customer fields, checks them, and rejects slots at or before `now`.
pub fn validate_booking(
    request: &BookingRequest,
    now: NaiveDateTime,
) -> Result<ValidatedBooking, BookingError> {
    let trimmed = BookingRequest {
        customer_name: request.customer_name.trim().to_string(),
        email: request.email.trim().to_string(),
        phone: request.phone.trim().to_string(),
        service_id: request.service_id.trim().to_string(),
        date: request.date.clone(),
        time: request.time.clone(),
    };
    trimmed
        .validate()
        .map_err(|e| BookingError::Validation(e.to_string()))?;

    let date = parse_date(&trimmed.date)?;
    let time = parse_time(&trimmed.time)?;
    if date.and_time(time) <= now {
        return Err(BookingError::Validation(format!(
            "Cannot book {} {}: the slot is in the past",
            date, time
        )));
    }

    Ok(ValidatedBooking {
        customer_name: trimmed.customer_name,
        email: trimmed.email,
        phone: trimmed.phone,
        service_id: trimmed.service_id,
        date,
        time,
    })
}

/// Result of a successful reservation: the customer continues at `redirect_url`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookingResponse {
    pub appointment_id: i64,
    pub redirect_url: String,
    pub deposit_cents: i64,
    pub deposit_display: String,
    pub status: AppointmentStatus,
}
