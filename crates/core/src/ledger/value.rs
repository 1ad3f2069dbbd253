//! Entry value computation.
//!
//! CRITICAL: all value math uses `Decimal` with banker's rounding. Points
//! and CO2e totals must not drift under repeated pricing.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept on a computed entry value.
pub const VALUE_SCALE: u32 = 4;

/// Decimal places kept on a rate derived from a scoring total.
pub const RATE_SCALE: u32 = 6;

/// Computes the value credited (or debited) for a priced activity.
///
/// Uses banker's rounding (round half to even) to minimize cumulative
/// error across entries.
#[must_use]
pub fn entry_value(quantity: Decimal, rate: Decimal) -> Decimal {
    (quantity * rate).round_dp_with_strategy(VALUE_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Derives a per-unit rate from a scoring total.
///
/// The scoring service prices the whole quantity; the ledger stores the
/// per-unit rate so the entry stays auditable. Returns `None` for a zero
/// quantity.
#[must_use]
pub fn rate_from_total(total: Decimal, quantity: Decimal) -> Option<Decimal> {
    total
        .checked_div(quantity)
        .map(|rate| rate.round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointNearestEven))
}
