//! Property-based tests for submission validation.

use daura_shared::types::AccountId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::types::{ActivityKind, ActivityRequest, Unit};
use super::validation::{
    MAX_QUANTITY_SCALE, validate_quantity, validate_request, validate_unit,
};

fn arb_kind() -> impl Strategy<Value = ActivityKind> {
    prop_oneof![
        Just(ActivityKind::WasteSale),
        Just(ActivityKind::EmissionReport),
    ]
}

fn arb_unit() -> impl Strategy<Value = Unit> {
    prop_oneof![
        Just(Unit::Kg),
        Just(Unit::Kwh),
        Just(Unit::Liter),
        Just(Unit::Km),
    ]
}

proptest! {
    // Property 1: every positive quantity within the scale limit validates.
    #[test]
    fn prop_positive_quantity_validates(
        mantissa in 1i64..=1_000_000_000,
        scale in 0u32..=MAX_QUANTITY_SCALE,
    ) {
        let quantity = Decimal::new(mantissa, scale);
        prop_assert!(validate_quantity(quantity).is_ok());
    }

    // Property 2: zero and negative quantities never validate.
    #[test]
    fn prop_non_positive_quantity_rejected(
        mantissa in 0i64..=1_000_000_000,
        scale in 0u32..=6,
    ) {
        let quantity = -Decimal::new(mantissa, scale);
        prop_assert!(validate_quantity(quantity).is_err());
    }

    // Property 3: quantities with a significant digit past the scale limit
    // never validate.
    #[test]
    fn prop_too_precise_quantity_rejected(
        mantissa in 0i64..=1_000_000,
        last_digit in 1i64..=9,
        extra_scale in 1u32..=4,
    ) {
        let quantity = Decimal::new(
            mantissa * 10 + last_digit,
            MAX_QUANTITY_SCALE + extra_scale,
        );
        prop_assert!(validate_quantity(quantity).is_err());
    }

    // Property 4: the unit check accepts exactly the kind's allowed units.
    #[test]
    fn prop_unit_check_matches_allowed_set(kind in arb_kind(), unit in arb_unit()) {
        let accepted = validate_unit(kind, unit).is_ok();
        prop_assert_eq!(accepted, kind.allowed_units().contains(&unit));
    }

    // Property 5: a well-formed request passes end-to-end validation for
    // any idempotency key within the length limit.
    #[test]
    fn prop_well_formed_request_validates(
        mantissa in 1i64..=1_000_000,
        key in proptest::option::of("[a-z0-9-]{1,128}"),
    ) {
        let request = ActivityRequest {
            account_id: AccountId::new(),
            kind: ActivityKind::WasteSale,
            code: "cardboard".to_string(),
            quantity: Decimal::new(mantissa, MAX_QUANTITY_SCALE),
            unit: Unit::Kg,
            idempotency_key: key,
        };
        prop_assert!(validate_request(&request).is_ok());
    }
}
