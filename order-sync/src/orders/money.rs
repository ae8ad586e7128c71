//! Money and quantity arithmetic using rust_decimal
//!
//! Everything is computed as `Decimal` and converted back to `f64` for
//! storage and the wire. Quantity rounding depends on the product unit:
//!
//! | Unit kind | Rule |
//! |-----------|------|
//! | fractional (KG, M, L, ...) | nearest hundredth, half away from zero |
//! | whole (UN, CX, PC, ...) | floored integer |
//!
//! The same rule is applied on save and on every adjustment, so the
//! displayed, stored and submitted quantities never disagree.

use rust_decimal::prelude::*;
use shared::order::{is_fractional_unit, DraftItem};

/// Monetary and fractional-quantity precision
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed unit price per line
pub const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line (also bounds a single adjustment)
pub const MAX_QUANTITY: f64 = 9_999.0;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Apply the unit's rounding rule; never negative
pub fn normalize_quantity(quantity: f64, unit: &str) -> f64 {
    if !quantity.is_finite() {
        return 0.0;
    }
    let rounded = round_quantity(to_decimal(quantity), unit);
    rounded.max(Decimal::ZERO).to_f64().unwrap_or_default()
}

/// `current + delta`, rounded by the unit's rule and clamped at zero
pub fn adjust_quantity(current: f64, delta: f64, unit: &str) -> f64 {
    if !delta.is_finite() {
        return normalize_quantity(current, unit);
    }
    let sum = to_decimal(normalize_quantity(current, unit)) + to_decimal(delta);
    round_quantity(sum, unit)
        .max(Decimal::ZERO)
        .to_f64()
        .unwrap_or_default()
}

fn round_quantity(value: Decimal, unit: &str) -> Decimal {
    if is_fractional_unit(unit) {
        value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
    } else {
        value.floor()
    }
}

/// quantity × unit_price, `None` on overflow
pub fn line_total(item: &DraftItem) -> Option<Decimal> {
    to_decimal(item.quantity).checked_mul(to_decimal(item.unit_price))
}

/// Σ quantity × unit_price, rounded to cents; `None` on overflow
pub fn compute_total(items: &[DraftItem]) -> Option<f64> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(line_total(item)?))
        .map(to_f64)
}

/// Compare two monetary values within [`MONEY_TOLERANCE`]
pub fn money_eq(a: f64, b: f64) -> bool {
    (to_decimal(a) - to_decimal(b)).abs() < MONEY_TOLERANCE
}
