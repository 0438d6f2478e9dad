#[cfg(test)]
mod tests {
    use crate::blocker::hourly_boundaries;
    use chrono::{Duration, NaiveDate, Timelike};
    use proptest::prelude::*;

    proptest! {
        // Every boundary is a whole hour inside [start, end), one hour apart
        #[test]
        fn test_boundaries_are_whole_hours_in_range(
            start_minutes in 0..(60 * 24 * 30i64),
            length_minutes in 1..(60 * 24 * 14i64),
        ) {
            let base = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
            let start = base + Duration::minutes(start_minutes);
            let end = start + Duration::minutes(length_minutes);

            let hours = hourly_boundaries(start, end).unwrap();
            for (date, time) in &hours {
                let instant = date.and_time(*time);
                prop_assert!(instant >= start && instant < end);
                prop_assert_eq!(time.minute(), 0);
                prop_assert_eq!(time.second(), 0);
            }
            for pair in hours.windows(2) {
                let a = pair[0].0.and_time(pair[0].1);
                let b = pair[1].0.and_time(pair[1].1);
                prop_assert_eq!(b - a, Duration::hours(1));
            }

            // Nothing was skipped at either end.
            let whole_hours = (start_minutes + length_minutes - 1) / 60 - (start_minutes + 59) / 60 + 1;
            prop_assert_eq!(hours.len() as i64, whole_hours.max(0));
        }
    }
}
