//! Test fixtures for booking tests

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use slotbook_booking::{
    ConfigCatalog, DirectCheckoutService, ProvisionPlan, ReservationWorkflow, SlotCalendar,
    WorkflowSettings,
};
use slotbook_booking::logic::BookingRequest;
use slotbook_config::{BookingConfig, CatalogConfig};
use slotbook_db::{init_schema, DbClient};
use std::sync::Arc;

pub const FALLBACK_URL: &str = "https://shop.test/booking/pending";

/// Monday, 5 May 2025
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()
}

pub fn at(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
}

/// A moment safely before every provisioned slot.
pub fn before_week() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 5, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

/// Weekdays only, {09:00, 10:00}, for `days` days from Monday.
pub fn weekday_plan(days: u32) -> ProvisionPlan {
    ProvisionPlan {
        from: monday(),
        days,
        times: vec![at(9), at(10)],
        weekdays: vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ],
    }
}

/// An in-memory store with the schema created and nothing provisioned.
pub async fn empty_store() -> DbClient {
    let db = DbClient::in_memory().await.unwrap();
    init_schema(&db).await.unwrap();
    db
}

/// The workflow wired the way the server wires it without a payment provider.
pub fn direct_workflow(db: DbClient) -> ReservationWorkflow {
    let settings = WorkflowSettings::from_config(&BookingConfig::default()).unwrap();
    ReservationWorkflow::new(
        db,
        Arc::new(ConfigCatalog::from_config(&CatalogConfig::default())),
        Arc::new(DirectCheckoutService::new(FALLBACK_URL)),
        settings,
    )
}

pub async fn provisioned_calendar(db: &DbClient, days: u32) -> SlotCalendar {
    let calendar = SlotCalendar::new(db.clone());
    calendar.provision(&weekday_plan(days)).await.unwrap();
    calendar
}

pub fn booking_request(service_id: &str, date: NaiveDate, time: &str) -> BookingRequest {
    BookingRequest {
        customer_name: "Maria Souza".to_string(),
        email: "maria@example.com".to_string(),
        phone: "+1 555 0123".to_string(),
        service_id: service_id.to_string(),
        date: date.format("%Y-%m-%d").to_string(),
        time: time.to_string(),
    }
}
