//! The per-product quantity formula.
//!
//! UTP is "units per thousand": how many servings the store moves per
//! $1000 of sales. Projected sales scale it to servings, the container
//! size turns servings into containers, and the buffer inflates the
//! result before product-specific rounding snaps it to a whole count.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::catalog::RoundingRule;

/// Servings implied by a day's sales at the given UTP.
pub fn units_for_sales(sales: Decimal, utp: Decimal) -> Decimal {
    sales / dec!(1000) * utp
}

/// Raw container count before buffering.
pub fn raw_containers(units: Decimal, servings_per_unit: Decimal) -> Decimal {
    if servings_per_unit.is_zero() {
        return Decimal::ZERO;
    }
    units / servings_per_unit
}

/// Applies a percentage buffer: `raw × (1 + pct / 100)`.
pub fn apply_buffer(raw: Decimal, buffer_pct: Decimal) -> Decimal {
    raw * (Decimal::ONE + buffer_pct / dec!(100))
}

/// Full chain from sales to an unrounded container count.
pub fn buffered_containers(
    sales: Decimal,
    utp: Decimal,
    servings_per_unit: Decimal,
    buffer_pct: Decimal,
) -> Decimal {
    apply_buffer(
        raw_containers(units_for_sales(sales, utp), servings_per_unit),
        buffer_pct,
    )
}

/// Snaps a container count to a whole number per the product's rule.
/// `Nearest` rounds half away from zero, matching how crews count.
pub fn apply_rounding(value: Decimal, rule: RoundingRule) -> i64 {
    let snapped = match rule {
        RoundingRule::Ceil => value.ceil(),
        RoundingRule::Nearest => {
            value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        }
        RoundingRule::Floor => value.floor(),
    };
    snapped.to_i64().unwrap_or(0)
}
