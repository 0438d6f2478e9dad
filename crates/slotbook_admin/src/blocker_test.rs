#[cfg(test)]
mod tests {
    use crate::blocker::{hourly_boundaries, parse_timestamp, SlotBlocker};
    use crate::error::AdminError;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use slotbook_booking::{BookingError, ProvisionPlan, SlotCalendar};
    use slotbook_common::models::NewAppointment;
    use slotbook_db::{
        init_schema, AppointmentRepository, DbClient, SlotReservation, SqlAppointmentRepository,
    };

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()
    }

    fn at(hour: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
    }

    fn ts(raw: &str) -> NaiveDateTime {
        parse_timestamp(raw).unwrap()
    }

    async fn setup() -> (SlotBlocker, SlotCalendar, DbClient) {
        let db = DbClient::in_memory().await.unwrap();
        init_schema(&db).await.unwrap();
        let calendar = SlotCalendar::new(db.clone());
        calendar
            .provision(&ProvisionPlan {
                from: monday(),
                days: 1,
                times: vec![at(9), at(10), at(11), at(12)],
                weekdays: Vec::new(),
            })
            .await
            .unwrap();
        (SlotBlocker::new(calendar.clone()), calendar, db)
    }

    fn appointment_at(time: NaiveTime) -> NewAppointment {
        NewAppointment {
            customer_name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            phone: "555".to_string(),
            service_id: "bikini".to_string(),
            service_name: "Bikini".to_string(),
            date: monday(),
            time,
            total_price_cents: 3500,
            deposit_cents: 700,
        }
    }

    async fn book(db: &DbClient, time: NaiveTime) {
        SqlAppointmentRepository::new(db.clone())
            .insert(appointment_at(time))
            .await
            .unwrap();
    }

    #[test]
    fn test_boundaries_are_half_open() {
        let hours = hourly_boundaries(ts("2025-05-05T09:00"), ts("2025-05-05T12:00")).unwrap();
        assert_eq!(
            hours,
            vec![(monday(), at(9)), (monday(), at(10)), (monday(), at(11))]
        );
    }

    #[test]
    fn test_boundaries_round_start_up() {
        let hours = hourly_boundaries(ts("2025-05-05T09:30"), ts("2025-05-05T11:00:01")).unwrap();
        assert_eq!(hours, vec![(monday(), at(10)), (monday(), at(11))]);
    }

    #[test]
    fn test_boundaries_cross_midnight() {
        let hours = hourly_boundaries(ts("2025-05-05T23:00"), ts("2025-05-06T01:00")).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2025, 5, 6).unwrap();
        assert_eq!(hours, vec![(monday(), at(23)), (tuesday, at(0))]);
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(matches!(
            hourly_boundaries(ts("2025-05-05T10:00"), ts("2025-05-05T10:00")),
            Err(AdminError::Validation(_))
        ));
        assert!(matches!(
            hourly_boundaries(ts("2025-05-05T10:00"), ts("2025-05-05T09:00")),
            Err(AdminError::Validation(_))
        ));
        assert!(matches!(
            hourly_boundaries(ts("2025-01-01T00:00"), ts("2025-05-01T00:00")),
            Err(AdminError::Validation(_))
        ));
        // Inside an hour: valid, but nothing to block.
        assert!(hourly_boundaries(ts("2025-05-05T09:10"), ts("2025-05-05T09:50"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(ts("2025-05-05T09:00:00+02:00"), ts("2025-05-05T09:00"));
        assert_eq!(ts("2025-05-05 09:00"), ts("2025-05-05T09:00:00"));
        assert!(matches!(
            parse_timestamp("next tuesday"),
            Err(AdminError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_block_range_continues_past_booked_slot() {
        let (blocker, calendar, db) = setup().await;
        calendar.reserve(monday(), at(11)).await.unwrap();
        book(&db, at(11)).await;

        let summary = blocker
            .block_range(ts("2025-05-05T09:00"), ts("2025-05-05T13:00"))
            .await
            .unwrap();
        assert_eq!(summary.attempted, 4);
        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].time, "11:00:00");
        assert_eq!(summary.failed[0].reason, "SlotBooked");

        // No rollback of the slots that were blocked.
        assert!(calendar.list_available(monday()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_block_range_reports_missing_slots() {
        let (blocker, calendar, _db) = setup().await;
        let summary = blocker
            .block_range(ts("2025-05-05T12:00"), ts("2025-05-05T14:00"))
            .await
            .unwrap();
        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed[0].reason, "NotFound");
        assert_eq!(
            calendar.list_available(monday()).await.unwrap(),
            vec![at(9), at(10), at(11)]
        );
    }

    #[tokio::test]
    async fn test_unblock_refuses_booked_slot() {
        let (blocker, calendar, db) = setup().await;
        calendar.reserve(monday(), at(9)).await.unwrap();
        book(&db, at(9)).await;

        assert!(matches!(
            blocker.unblock_slot(monday(), at(9)).await,
            Err(AdminError::Booking(BookingError::SlotBooked { .. }))
        ));
        assert!(!calendar.is_available(monday(), at(9)).await.unwrap());
    }

    #[tokio::test]
    async fn test_block_then_unblock() {
        let (blocker, calendar, _db) = setup().await;
        blocker.block_slot(monday(), at(10)).await.unwrap();
        assert!(!calendar.is_available(monday(), at(10)).await.unwrap());
        blocker.unblock_slot(monday(), at(10)).await.unwrap();
        assert!(calendar.is_available(monday(), at(10)).await.unwrap());

        assert!(matches!(
            blocker.block_slot(monday(), at(18)).await,
            Err(AdminError::Booking(BookingError::SlotNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_block_during_checkout_is_refused() {
        let (blocker, calendar, db) = setup().await;
        let appointments = SqlAppointmentRepository::new(db);

        // A customer holds 10:00 while their checkout is open.
        let pending = match appointments
            .insert_reserving_slot(appointment_at(at(10)))
            .await
            .unwrap()
        {
            SlotReservation::Reserved(appointment) => appointment,
            other => panic!("expected a reservation, got {:?}", other),
        };

        assert!(matches!(
            blocker.block_slot(monday(), at(10)).await,
            Err(AdminError::Booking(BookingError::SlotBooked { .. }))
        ));
        assert!(matches!(
            blocker.unblock_slot(monday(), at(10)).await,
            Err(AdminError::Booking(BookingError::SlotBooked { .. }))
        ));
        assert!(!calendar.is_available(monday(), at(10)).await.unwrap());

        // Checkout fails and the booking is rolled back.
        assert!(appointments.delete_releasing_slot(pending.id).await.unwrap());
        assert!(calendar.is_available(monday(), at(10)).await.unwrap());

        blocker.block_slot(monday(), at(10)).await.unwrap();
        assert!(!calendar.is_available(monday(), at(10)).await.unwrap());
    }
}
