use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Maximum scale a `Decimal` can carry.
pub const MAX_DECIMAL_PLACES: u32 = 28;

/// Round half-up (away from zero on a tie) to `dp` decimal places.
///
/// Spreadsheet rounding, which the late-interest schedules are reconciled
/// against, rounds 0.005 up to 0.01 rather than to the even neighbour.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// The two rounding precisions a fund applies.
///
/// `calc` is used for every line item (per-call capital, per-call interest,
/// per-partner allocation). `sum` is used for aggregates, which are always
/// sums of already-rounded line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingPolicy {
    pub calc: u32,
    pub sum: u32,
}

impl RoundingPolicy {
    pub fn new(calc: u32, sum: u32) -> Self {
        Self { calc, sum }
    }

    pub fn line_item(&self, value: Decimal) -> Decimal {
        round_half_up(value, self.calc)
    }

    pub fn aggregate(&self, value: Decimal) -> Decimal {
        round_half_up(value, self.sum)
    }
}

impl Default for RoundingPolicy {
    fn default() -> Self {
        Self { calc: 2, sum: 2 }
    }
}
