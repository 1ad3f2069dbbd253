//! Property-based tests for entry value math.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::value::{VALUE_SCALE, entry_value, rate_from_total};

fn arb_quantity() -> impl Strategy<Value = Decimal> {
    // Positive, at most three decimal places, bounded like a real submission.
    (1i64..=1_000_000, 0u32..=3).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

fn arb_rate() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000_000, 0u32..=6).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

proptest! {
    // Property 1: positive quantity and rate never produce a negative value.
    #[test]
    fn prop_value_sign_follows_rate(quantity in arb_quantity(), rate in arb_rate()) {
        prop_assert!(entry_value(quantity, rate) >= Decimal::ZERO);
        prop_assert!(entry_value(quantity, -rate) <= Decimal::ZERO);
    }

    // Property 2: the computed value never exceeds the value scale.
    #[test]
    fn prop_value_scale_bounded(quantity in arb_quantity(), rate in arb_rate()) {
        let value = entry_value(quantity, rate);
        prop_assert!(value.scale() <= VALUE_SCALE);
    }

    // Property 3: value grows monotonically with quantity at a fixed rate.
    #[test]
    fn prop_value_monotone_in_quantity(
        quantity in arb_quantity(),
        extra in arb_quantity(),
        rate in arb_rate(),
    ) {
        let smaller = entry_value(quantity, rate);
        let larger = entry_value(quantity + extra, rate);
        prop_assert!(larger >= smaller);
    }

    // Property 4: rounding the value moves it by at most half a unit in
    // the last kept place.
    #[test]
    fn prop_value_close_to_exact_product(quantity in arb_quantity(), rate in arb_rate()) {
        let exact = quantity * rate;
        let diff = (entry_value(quantity, rate) - exact).abs();
        prop_assert!(diff <= dec!(0.00005));
    }

    // Property 5: a rate derived from a scoring total reprices back to
    // nearly the original total.
    #[test]
    fn prop_derived_rate_reprices_total(
        total_cents in 0i64..=100_000_000,
        quantity in arb_quantity(),
    ) {
        let total = Decimal::new(total_cents, 2);
        let rate = rate_from_total(total, quantity).expect("quantity is positive");
        let repriced = entry_value(quantity, rate);
        // Rate rounding error is at most 5e-7 per unit, plus value rounding.
        let bound = quantity * dec!(0.0000005) + dec!(0.00005);
        prop_assert!((repriced - total).abs() <= bound);
    }

    // Property 6: reversal value exactly cancels the original value.
    #[test]
    fn prop_negated_value_cancels(quantity in arb_quantity(), rate in arb_rate()) {
        let value = entry_value(quantity, rate);
        prop_assert_eq!(value + (-value), Decimal::ZERO);
    }
}
