#[cfg(test)]
mod tests {
    use crate::logic::DepositPolicy;
    use proptest::prelude::*;

    proptest! {
        // The deposit never exceeds the price and is within half a cent of the exact value
        #[test]
        fn test_deposit_is_nearest_cent(
            price_cents in 0..10_000_000i64,
            basis_points in 0..=10_000i64,
        ) {
            let policy = DepositPolicy::from_basis_points(basis_points).unwrap();
            let deposit = policy.deposit_for(price_cents);
            prop_assert!(deposit >= 0);
            prop_assert!(deposit <= price_cents);

            let exact_times_basis = price_cents as i128 * basis_points as i128;
            let diff = (deposit as i128 * 10_000 - exact_times_basis).abs();
            prop_assert!(diff <= 5_000);
        }

        // Ties go up
        #[test]
        fn test_deposit_ties_round_up(cents in 0..1_000_000i64) {
            let half = DepositPolicy::from_basis_points(5_000).unwrap();
            let odd_price = cents * 2 + 1;
            prop_assert_eq!(half.deposit_for(odd_price), cents + 1);
        }

        #[test]
        fn test_deposit_is_monotonic(
            price_cents in 0..1_000_000i64,
            extra in 0..1_000i64,
            basis_points in 0..=10_000i64,
        ) {
            let policy = DepositPolicy::from_basis_points(basis_points).unwrap();
            prop_assert!(policy.deposit_for(price_cents) <= policy.deposit_for(price_cents + extra));
        }
    }
}
