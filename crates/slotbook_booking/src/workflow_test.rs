#[cfg(test)]
mod tests {
    use crate::calendar::{ProvisionPlan, SlotCalendar};
    use crate::error::BookingError;
    use crate::logic::{BookingRequest, DepositPolicy};
    use crate::workflow::{ReservationWorkflow, WorkflowSettings};
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
    use slotbook_common::models::AppointmentStatus;
    use slotbook_common::services::mock::{
        CheckoutBehavior, MockCatalogService, MockCheckoutService,
    };
    use slotbook_common::services::{
        BoxFuture, BoxedError, CatalogService, CheckoutRequest, CheckoutService, CheckoutSession,
    };
    use slotbook_db::{init_schema, DbClient};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const CHECKOUT_URL: &str = "https://pay.test/checkout";

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()
    }

    fn at(hour: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn request(time: &str) -> BookingRequest {
        BookingRequest {
            customer_name: "Ana Lima".to_string(),
            email: "ana@example.com".to_string(),
            phone: "555 0100".to_string(),
            service_id: "full_leg".to_string(),
            date: "2025-05-05".to_string(),
            time: time.to_string(),
        }
    }

    fn settings(timeout: Duration) -> WorkflowSettings {
        WorkflowSettings {
            deposit: DepositPolicy::from_fraction(0.20).unwrap(),
            currency: "usd".to_string(),
            checkout_timeout: timeout,
        }
    }

    async fn provisioned_db() -> DbClient {
        let db = DbClient::in_memory().await.unwrap();
        init_schema(&db).await.unwrap();
        let plan = ProvisionPlan {
            from: monday(),
            days: 1,
            times: vec![at(9), at(10)],
            weekdays: vec![Weekday::Mon],
        };
        SlotCalendar::new(db.clone())
            .provision(&plan)
            .await
            .unwrap();
        db
    }

    async fn setup_with(
        checkout: Arc<dyn CheckoutService>,
        catalog: Arc<dyn CatalogService>,
        timeout: Duration,
    ) -> ReservationWorkflow {
        let db = provisioned_db().await;
        ReservationWorkflow::new(db, catalog, checkout, settings(timeout))
    }

    async fn setup(checkout: Arc<MockCheckoutService>) -> ReservationWorkflow {
        setup_with(
            checkout,
            Arc::new(MockCatalogService::with_prices(&[("full_leg", 8000), ("bikini", 3500)])),
            Duration::from_secs(5),
        )
        .await
    }

    async fn assert_rolled_back(workflow: &ReservationWorkflow) {
        assert!(workflow.calendar().is_available(monday(), at(9)).await.unwrap());
        assert!(workflow
            .appointment_for_slot(monday(), at(9))
            .await
            .unwrap()
            .is_none());
        assert!(workflow.upcoming_appointments(monday()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_successful_booking_reserves_slot() {
        let checkout = Arc::new(MockCheckoutService::redirecting_to(CHECKOUT_URL));
        let workflow = setup(checkout.clone()).await;

        let response = workflow.book_at(request("09:00"), now()).await.unwrap();
        assert_eq!(response.deposit_cents, 1600);
        assert_eq!(response.deposit_display, "$16.00");
        assert_eq!(response.status, AppointmentStatus::Pending);
        assert_eq!(
            response.redirect_url,
            format!("{}?appointment_id={}", CHECKOUT_URL, response.appointment_id)
        );

        let appointment = workflow.get_appointment(response.appointment_id).await.unwrap();
        assert_eq!(appointment.total_price_cents, 8000);
        assert_eq!(appointment.deposit_cents, 1600);
        assert_eq!(appointment.service_name, "full_leg");
        assert!(!workflow.calendar().is_available(monday(), at(9)).await.unwrap());
        assert_eq!(
            workflow.calendar().list_available(monday()).await.unwrap(),
            vec![at(10)]
        );

        let sent = checkout.requests.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].appointment_id, response.appointment_id);
        assert_eq!(sent[0].deposit_cents, 1600);
        assert_eq!(sent[0].currency, "usd");
    }

    #[tokio::test]
    async fn test_unavailable_slot_is_rejected_without_side_effects() {
        let checkout = Arc::new(MockCheckoutService::redirecting_to(CHECKOUT_URL));
        let workflow = setup(checkout.clone()).await;
        workflow
            .calendar()
            .set_availability(monday(), at(9), false)
            .await
            .unwrap();

        let result = workflow.book_at(request("09:00"), now()).await;
        assert!(matches!(result, Err(BookingError::SlotUnavailable { .. })));
        assert_eq!(checkout.request_count(), 0);
        assert!(workflow.upcoming_appointments(monday()).await.unwrap().is_empty());

        let unknown = workflow.book_at(request("13:00"), now()).await;
        assert!(matches!(unknown, Err(BookingError::SlotUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_unknown_service_and_catalog_outage() {
        let checkout = Arc::new(MockCheckoutService::redirecting_to(CHECKOUT_URL));
        let workflow = setup(checkout.clone()).await;
        let mut req = request("09:00");
        req.service_id = "massage".to_string();
        assert!(matches!(
            workflow.book_at(req, now()).await,
            Err(BookingError::Validation(_))
        ));

        let workflow = setup_with(
            checkout.clone(),
            Arc::new(MockCatalogService::failing()),
            Duration::from_secs(5),
        )
        .await;
        assert!(matches!(
            workflow.book_at(request("09:00"), now()).await,
            Err(BookingError::Catalog(_))
        ));
        assert!(workflow.calendar().is_available(monday(), at(9)).await.unwrap());
        assert_eq!(checkout.request_count(), 0);
    }

    #[tokio::test]
    async fn test_checkout_failure_is_compensated() {
        let checkout = Arc::new(MockCheckoutService::new(CheckoutBehavior::Fail(
            "card processor down".to_string(),
        )));
        let workflow = setup(checkout.clone()).await;

        let result = workflow.book_at(request("09:00"), now()).await;
        assert!(matches!(result, Err(BookingError::BookingFailed(msg)) if msg.contains("card processor down")));
        assert_eq!(checkout.request_count(), 1);
        assert_rolled_back(&workflow).await;

        // The slot is bookable again once checkout recovers.
        checkout.set_behavior(CheckoutBehavior::Redirect(CHECKOUT_URL.to_string()));
        assert!(workflow.book_at(request("09:00"), now()).await.is_ok());
    }

    #[tokio::test]
    async fn test_empty_redirect_is_compensated() {
        let checkout = Arc::new(MockCheckoutService::new(CheckoutBehavior::EmptyRedirect));
        let workflow = setup(checkout).await;

        let result = workflow.book_at(request("09:00"), now()).await;
        assert!(matches!(result, Err(BookingError::BookingFailed(_))));
        assert_rolled_back(&workflow).await;
    }

    #[tokio::test]
    async fn test_checkout_timeout_is_compensated() {
        let checkout = Arc::new(MockCheckoutService::new(CheckoutBehavior::Delay(
            Duration::from_millis(500),
        )));
        let workflow = setup_with(
            checkout,
            Arc::new(MockCatalogService::with_prices(&[("full_leg", 8000)])),
            Duration::from_millis(50),
        )
        .await;

        let result = workflow.book_at(request("09:00"), now()).await;
        assert!(matches!(result, Err(BookingError::BookingFailed(msg)) if msg.contains("50 ms")));
        assert_rolled_back(&workflow).await;
    }

    /// Breaks the store mid-flight so the rollback itself cannot complete.
    struct SabotagingCheckout {
        db: DbClient,
    }

    impl CheckoutService for SabotagingCheckout {
        fn create_checkout_session(
            &self,
            _request: CheckoutRequest,
        ) -> BoxFuture<'_, CheckoutSession, BoxedError> {
            Box::pin(async move {
                if let Err(e) = self.db.execute("DROP TABLE appointments").await {
                    return Err(BoxedError::new(e));
                }
                Err::<CheckoutSession, _>(BoxedError::msg("checkout rejected"))
            })
        }
    }

    #[tokio::test]
    async fn test_failed_compensation_is_a_hard_failure() {
        let db = provisioned_db().await;
        let workflow = ReservationWorkflow::new(
            db.clone(),
            Arc::new(MockCatalogService::with_prices(&[("full_leg", 8000)])),
            Arc::new(SabotagingCheckout { db }),
            settings(Duration::from_secs(5)),
        );

        let result = workflow.book_at(request("09:00"), now()).await;
        assert!(matches!(result, Err(BookingError::CompensationFailed(_))));
        // Release and delete share a transaction, so the slot stays taken.
        assert!(!workflow.calendar().is_available(monday(), at(9)).await.unwrap());
    }

    /// An administrator tries to block and then unblock the slot while the customer
    /// is at checkout, which then rejects the customer.
    struct AdminDuringCheckout {
        calendar: SlotCalendar,
        refused: Mutex<Vec<bool>>,
    }

    impl CheckoutService for AdminDuringCheckout {
        fn create_checkout_session(
            &self,
            request: CheckoutRequest,
        ) -> BoxFuture<'_, CheckoutSession, BoxedError> {
            Box::pin(async move {
                for available in [false, true] {
                    let outcome = self
                        .calendar
                        .set_availability_unless_booked(monday(), at(9), available)
                        .await;
                    self.refused
                        .lock()
                        .unwrap()
                        .push(matches!(outcome, Err(BookingError::SlotBooked { .. })));
                }
                Err::<CheckoutSession, _>(BoxedError::msg(format!(
                    "checkout rejected appointment {}",
                    request.appointment_id
                )))
            })
        }
    }

    #[tokio::test]
    async fn test_admin_cannot_touch_slot_during_checkout() {
        let db = provisioned_db().await;
        let checkout = Arc::new(AdminDuringCheckout {
            calendar: SlotCalendar::new(db.clone()),
            refused: Mutex::new(Vec::new()),
        });
        let workflow = ReservationWorkflow::new(
            db,
            Arc::new(MockCatalogService::with_prices(&[("full_leg", 8000)])),
            checkout.clone(),
            settings(Duration::from_secs(5)),
        );

        let result = workflow.book_at(request("09:00"), now()).await;
        assert!(matches!(result, Err(BookingError::BookingFailed(_))));
        assert_eq!(*checkout.refused.lock().unwrap(), vec![true, true]);
        assert_rolled_back(&workflow).await;

        // With the booking gone the block goes through and sticks.
        workflow
            .calendar()
            .set_availability_unless_booked(monday(), at(9), false)
            .await
            .unwrap();
        assert!(!workflow.calendar().is_available(monday(), at(9)).await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_bookings_for_one_slot() {
        let checkout = Arc::new(MockCheckoutService::redirecting_to(CHECKOUT_URL));
        let workflow = Arc::new(setup(checkout.clone()).await);

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let workflow = workflow.clone();
                tokio::spawn(async move {
                    let mut req = request("09:00");
                    req.customer_name = format!("Customer {}", i);
                    workflow.book_at(req, now()).await
                })
            })
            .collect();

        let mut successes = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(BookingError::SlotUnavailable { .. }) => conflicts += 1,
                Err(other) => panic!("unexpected error: {}", other),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(conflicts, 9);
        assert_eq!(checkout.request_count(), 1);
        assert_eq!(workflow.upcoming_appointments(monday()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_confirm_appointment_transitions() {
        let checkout = Arc::new(MockCheckoutService::redirecting_to(CHECKOUT_URL));
        let workflow = setup(checkout).await;
        let booked = workflow.book_at(request("09:00"), now()).await.unwrap();

        let confirmed = workflow
            .confirm_appointment(booked.appointment_id, "pi_123")
            .await
            .unwrap();
        assert_eq!(confirmed.status, AppointmentStatus::Confirmed);
        assert_eq!(confirmed.order_reference.as_deref(), Some("pi_123"));

        // Idempotent: the first order reference is kept.
        let again = workflow
            .confirm_appointment(booked.appointment_id, "pi_456")
            .await
            .unwrap();
        assert_eq!(again.order_reference.as_deref(), Some("pi_123"));
        // Confirmation never frees the slot.
        assert!(!workflow.calendar().is_available(monday(), at(9)).await.unwrap());

        assert!(matches!(
            workflow.confirm_appointment(9_999, "pi_1").await,
            Err(BookingError::AppointmentNotFound(9_999))
        ));
        assert!(matches!(
            workflow.confirm_appointment(booked.appointment_id, "  ").await,
            Err(BookingError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_restores_slot() {
        let checkout = Arc::new(MockCheckoutService::redirecting_to(CHECKOUT_URL));
        let workflow = setup(checkout).await;
        let booked = workflow.book_at(request("10:00"), now()).await.unwrap();

        let cancelled = workflow
            .cancel_appointment(booked.appointment_id)
            .await
            .unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
        assert!(workflow.calendar().is_available(monday(), at(10)).await.unwrap());
        assert!(workflow.upcoming_appointments(monday()).await.unwrap().is_empty());

        assert!(matches!(
            workflow.cancel_appointment(booked.appointment_id).await,
            Err(BookingError::InvalidTransition { .. })
        ));
        assert!(matches!(
            workflow.confirm_appointment(booked.appointment_id, "pi_9").await,
            Err(BookingError::InvalidTransition {
                from: AppointmentStatus::Cancelled,
                ..
            })
        ));

        // A cancelled appointment does not block a new booking of the same slot.
        assert!(workflow.book_at(request("10:00"), now()).await.is_ok());
    }

    #[tokio::test]
    async fn test_expiry_cancels_only_pending() {
        let checkout = Arc::new(MockCheckoutService::redirecting_to(CHECKOUT_URL));
        let workflow = setup(checkout).await;
        let abandoned = workflow.book_at(request("09:00"), now()).await.unwrap();
        let paid = workflow.book_at(request("10:00"), now()).await.unwrap();
        workflow
            .confirm_appointment(paid.appointment_id, "pi_paid")
            .await
            .unwrap();

        let expired = workflow
            .expire_pending_appointment(abandoned.appointment_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(expired.status, AppointmentStatus::Cancelled);
        assert!(workflow.calendar().is_available(monday(), at(9)).await.unwrap());
        assert!(workflow
            .expire_pending_appointment(abandoned.appointment_id)
            .await
            .unwrap()
            .is_none());

        assert!(workflow
            .expire_pending_appointment(paid.appointment_id)
            .await
            .unwrap()
            .is_none());
        let kept = workflow.get_appointment(paid.appointment_id).await.unwrap();
        assert_eq!(kept.status, AppointmentStatus::Confirmed);
        assert!(!workflow.calendar().is_available(monday(), at(10)).await.unwrap());

        assert!(matches!(
            workflow.expire_pending_appointment(9_999).await,
            Err(BookingError::AppointmentNotFound(9_999))
        ));
    }

    #[tokio::test]
    async fn test_upcoming_is_ordered() {
        let checkout = Arc::new(MockCheckoutService::redirecting_to(CHECKOUT_URL));
        let workflow = setup(checkout).await;
        workflow.book_at(request("10:00"), now()).await.unwrap();
        workflow.book_at(request("09:00"), now()).await.unwrap();

        let upcoming = workflow.upcoming_appointments(monday()).await.unwrap();
        let times: Vec<_> = upcoming.iter().map(|a| a.time).collect();
        assert_eq!(times, vec![at(9), at(10)]);
    }
}
