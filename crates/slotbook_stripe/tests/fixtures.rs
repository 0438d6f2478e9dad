//! Test fixtures for the Stripe webhook route tests

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use slotbook_booking::logic::BookingRequest;
use slotbook_booking::{ProvisionPlan, ReservationWorkflow, SlotCalendar, WorkflowSettings};
use slotbook_common::services::mock::{MockCatalogService, MockCheckoutService};
use slotbook_db::{init_schema, DbClient};
use std::sync::Arc;
use tower::ServiceExt;

pub const WEBHOOK_SECRET: &str = "whsec_route_test";

pub fn slot_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()
}

pub fn nine() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap()
}

pub struct TestApp {
    pub router: Router,
    pub workflow: Arc<ReservationWorkflow>,
    pub appointment_id: i64,
}

/// Stripe router over a store holding one pending appointment.
pub async fn stripe_app() -> TestApp {
    let db = DbClient::in_memory().await.unwrap();
    init_schema(&db).await.unwrap();
    SlotCalendar::new(db.clone())
        .provision(&ProvisionPlan {
            from: slot_date(),
            days: 1,
            times: vec![nine()],
            weekdays: Vec::new(),
        })
        .await
        .unwrap();

    let workflow = Arc::new(ReservationWorkflow::new(
        db,
        Arc::new(MockCatalogService::with_prices(&[("eyebrow_wax", 2500)])),
        Arc::new(MockCheckoutService::redirecting_to("https://pay.test/checkout")),
        WorkflowSettings::default(),
    ));
    let booked = workflow
        .book_at(
            BookingRequest {
                customer_name: "Bea Costa".to_string(),
                email: "bea@example.com".to_string(),
                phone: "555 0111".to_string(),
                service_id: "eyebrow_wax".to_string(),
                date: "2025-05-05".to_string(),
                time: "09:00".to_string(),
            },
            NaiveDate::from_ymd_opt(2025, 5, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        )
        .await
        .unwrap();

    TestApp {
        router: slotbook_stripe::routes::routes(workflow.clone(), WEBHOOK_SECRET.to_string()),
        workflow,
        appointment_id: booked.appointment_id,
    }
}

pub fn completed_event(appointment_id: i64) -> String {
    json!({
        "id": "evt_route_1",
        "type": "checkout.session.completed",
        "created": Utc::now().timestamp(),
        "livemode": false,
        "data": { "object": {
            "id": "cs_test_route",
            "payment_status": "paid",
            "payment_intent": "pi_route",
            "metadata": { "appointment_id": appointment_id.to_string() }
        }}
    })
    .to_string()
}

pub fn signature_header(payload: &str, secret: &str) -> String {
    let timestamp = Utc::now().timestamp();
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{}.{}", timestamp, payload).as_bytes());
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

pub fn webhook_request(payload: &str, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/stripe/webhook")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header("Stripe-Signature", signature);
    }
    builder.body(Body::from(payload.to_string())).unwrap()
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}
