#[cfg(test)]
mod tests {
    use crate::calendar::{ProvisionPlan, SlotCalendar};
    use crate::error::BookingError;
    use chrono::{NaiveDate, NaiveTime, Weekday};
    use slotbook_common::models::NewAppointment;
    use slotbook_config::ScheduleConfig;
    use slotbook_db::{init_schema, AppointmentRepository, DbClient, SqlAppointmentRepository};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()
    }

    fn at(hour: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
    }

    fn plan(days: u32) -> ProvisionPlan {
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

    async fn calendar() -> (SlotCalendar, DbClient) {
        let db = DbClient::in_memory().await.unwrap();
        init_schema(&db).await.unwrap();
        (SlotCalendar::new(db.clone()), db)
    }

    #[test]
    fn test_plan_skips_weekends() {
        let keys = plan(7).keys();
        // Mon..Fri, two times each
        assert_eq!(keys.len(), 10);
        assert_eq!(keys[0], (monday(), at(9)));
        assert!(keys
            .iter()
            .all(|(date, _)| *date < NaiveDate::from_ymd_opt(2025, 5, 10).unwrap()));
    }

    #[test]
    fn test_plan_from_schedule() {
        let schedule = ScheduleConfig {
            horizon_days: 3,
            times: vec!["10:00".to_string(), "09:00".to_string()],
            weekdays: vec!["Mon".to_string()],
            provision_on_startup: false,
        };
        let plan = ProvisionPlan::from_schedule(&schedule, monday()).unwrap();
        assert_eq!(plan.times, vec![at(9), at(10)]);
        assert_eq!(plan.keys(), vec![(monday(), at(9)), (monday(), at(10))]);

        let broken = ScheduleConfig {
            weekdays: vec!["Funday".to_string()],
            ..schedule
        };
        assert!(matches!(
            ProvisionPlan::from_schedule(&broken, monday()),
            Err(BookingError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_provision_is_idempotent_and_keeps_state() {
        let (calendar, _db) = calendar().await;
        assert_eq!(calendar.provision(&plan(7)).await.unwrap(), 10);

        calendar.set_availability(monday(), at(9), false).await.unwrap();
        assert_eq!(calendar.provision(&plan(7)).await.unwrap(), 0);
        assert!(!calendar.is_available(monday(), at(9)).await.unwrap());
        assert_eq!(calendar.list_available(monday()).await.unwrap(), vec![at(10)]);
    }

    #[tokio::test]
    async fn test_unknown_slot_is_unavailable_and_not_settable() {
        let (calendar, _db) = calendar().await;
        calendar.provision(&plan(1)).await.unwrap();

        assert!(!calendar.is_available(monday(), at(15)).await.unwrap());
        assert!(matches!(
            calendar.set_availability(monday(), at(15), true).await,
            Err(BookingError::SlotNotFound { .. })
        ));
        let saturday = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        assert!(calendar.list_available(saturday).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reserve_only_once_and_release_restores() {
        let (calendar, _db) = calendar().await;
        calendar.provision(&plan(1)).await.unwrap();

        calendar.reserve(monday(), at(9)).await.unwrap();
        assert!(matches!(
            calendar.reserve(monday(), at(9)).await,
            Err(BookingError::SlotUnavailable { .. })
        ));

        calendar.release(monday(), at(9)).await.unwrap();
        assert!(calendar.is_available(monday(), at(9)).await.unwrap());
        // Releasing an available slot is a no-op.
        calendar.release(monday(), at(9)).await.unwrap();
        assert!(matches!(
            calendar.reserve(monday(), at(16)).await,
            Err(BookingError::SlotUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_guarded_update_refuses_booked_slot() {
        let (calendar, db) = calendar().await;
        calendar.provision(&plan(1)).await.unwrap();
        calendar.reserve(monday(), at(9)).await.unwrap();
        SqlAppointmentRepository::new(db)
            .insert(NewAppointment {
                customer_name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                phone: "555".to_string(),
                service_id: "bikini".to_string(),
                service_name: "Bikini".to_string(),
                date: monday(),
                time: at(9),
                total_price_cents: 3500,
                deposit_cents: 700,
            })
            .await
            .unwrap();

        assert!(matches!(
            calendar.set_availability_unless_booked(monday(), at(9), true).await,
            Err(BookingError::SlotBooked { .. })
        ));
        assert!(!calendar.is_available(monday(), at(9)).await.unwrap());

        calendar
            .set_availability_unless_booked(monday(), at(10), false)
            .await
            .unwrap();
        assert!(calendar.list_available(monday()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_slots_between_is_ordered() {
        let (calendar, _db) = calendar().await;
        calendar.provision(&plan(7)).await.unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2025, 5, 6).unwrap();
        let wednesday = NaiveDate::from_ymd_opt(2025, 5, 7).unwrap();
        let slots = calendar.slots_between(tuesday, wednesday).await.unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!((slots[0].date, slots[0].time), (tuesday, at(9)));
        assert_eq!((slots[1].date, slots[1].time), (tuesday, at(10)));
    }
}
