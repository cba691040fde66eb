use chrono::NaiveDate;
use log::trace;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::rate::RateResolver;
use crate::error::LateInterestError;
use crate::model::{FundAssumptions, InterestCompounding};
use crate::types::{Money, Percent};
use crate::LateInterestResult;

/// Day-count denominator. Actual/365 fixed, leap years included.
const DAYS_IN_YEAR: Decimal = dec!(365);

/// Inclusive day count between two dates: both the start and end day accrue.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Interest accrued over a period and the annual rate it implies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Accrual {
    pub interest: Money,
    pub effective_rate: Percent,
}

impl Accrual {
    pub fn zero() -> Self {
        Self {
            interest: Decimal::ZERO,
            effective_rate: Decimal::ZERO,
        }
    }
}

/// A stretch of days accruing at a single rate.
#[derive(Debug, Clone, Copy)]
struct Segment {
    days: i64,
    rate: Percent,
}

/// Accrues interest on a principal between two dates under a fund's rate
/// basis and compounding convention.
#[derive(Debug, Clone, PartialEq)]
pub struct AccrualCalculator {
    resolver: RateResolver,
    compounding: InterestCompounding,
}

impl AccrualCalculator {
    pub fn new(resolver: RateResolver, compounding: InterestCompounding) -> Self {
        Self {
            resolver,
            compounding,
        }
    }

    pub fn from_assumptions(assumptions: &FundAssumptions) -> LateInterestResult<Self> {
        let resolver = RateResolver::from_basis(&assumptions.rate_basis)?;
        Ok(Self::new(resolver, assumptions.compounding))
    }

    pub fn resolver(&self) -> &RateResolver {
        &self.resolver
    }

    /// Interest on `principal` from `start` through `end` inclusive.
    pub fn accrue(
        &self,
        principal: Money,
        start: NaiveDate,
        end: NaiveDate,
    ) -> LateInterestResult<Accrual> {
        if end < start {
            return Err(LateInterestError::InvalidRange { start, end });
        }

        let total_days = inclusive_days(start, end);
        if total_days <= 0 || principal.is_zero() {
            return Ok(Accrual::zero());
        }

        let segments = self.segments(start, end);
        match self.compounding.frequency() {
            None => Ok(self.simple(principal, total_days, &segments)),
            Some(freq) => self.compound(principal, total_days, &segments, freq.periods_per_year()),
        }
    }

    /// Split [start, end] at every rate change strictly after `start`.
    ///
    /// Segments ending at a change count `(change - segment_start)` days; the
    /// final segment counts inclusively, so the segment days add up to the
    /// inclusive total.
    fn segments(&self, start: NaiveDate, end: NaiveDate) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut cursor = start;

        for boundary in self.resolver.boundaries_within(start, end) {
            let days = (boundary - cursor).num_days();
            if days > 0 {
                segments.push(Segment {
                    days,
                    rate: self.resolver.rate_at(cursor),
                });
            }
            cursor = boundary;
        }

        let final_days = inclusive_days(cursor, end);
        if final_days > 0 {
            segments.push(Segment {
                days: final_days,
                rate: self.resolver.rate_at(cursor),
            });
        }
        segments
    }

    fn simple(&self, principal: Money, total_days: i64, segments: &[Segment]) -> Accrual {
        let mut interest = Decimal::ZERO;
        for seg in segments {
            let seg_interest =
                principal * (seg.rate / dec!(100)) * (Decimal::from(seg.days) / DAYS_IN_YEAR);
            trace!("simple segment: {} days at {}% -> {}", seg.days, seg.rate, seg_interest);
            interest += seg_interest;
        }

        let effective_rate = self.resolver.flat_rate().unwrap_or_else(|| {
            (interest / principal) * (DAYS_IN_YEAR / Decimal::from(total_days)) * dec!(100)
        });

        Accrual {
            interest,
            effective_rate,
        }
    }

    fn compound(
        &self,
        principal: Money,
        total_days: i64,
        segments: &[Segment],
        periods_per_year: u32,
    ) -> LateInterestResult<Accrual> {
        let mut balance = principal;
        for seg in segments {
            let factor = growth_factor(seg.rate, seg.days, periods_per_year)?;
            trace!("compound segment: {} days at {}% -> x{}", seg.days, seg.rate, factor);
            balance = balance.checked_mul(factor).ok_or_else(|| LateInterestError::Overflow {
                context: format!("compounding {principal} at {}% over {} days", seg.rate, seg.days),
            })?;
        }
        let interest = balance - principal;

        let effective_rate = match self.resolver.flat_rate() {
            Some(rate) => rate,
            None => {
                // annualise: (B/P)^(1/t) - 1 with t = total_days / 365
                let inverse_t = DAYS_IN_YEAR / Decimal::from(total_days);
                let annual = (balance / principal).checked_powd(inverse_t).ok_or_else(|| {
                    LateInterestError::Overflow {
                        context: format!("annualising a growth of {balance} on {principal}"),
                    }
                })?;
                (annual - Decimal::ONE) * dec!(100)
            }
        };

        Ok(Accrual {
            interest,
            effective_rate,
        })
    }
}

/// `(1 + r/n)^(n * days/365)` for an annual percentage rate `r`.
fn growth_factor(rate: Percent, days: i64, periods_per_year: u32) -> LateInterestResult<Decimal> {
    let n = Decimal::from(periods_per_year);
    let base = Decimal::ONE + rate / dec!(100) / n;
    let exponent = n * Decimal::from(days) / DAYS_IN_YEAR;

    // Daily compounding always lands on a whole number of periods; keep those
    // on exact repeated multiplication.
    let factor = if exponent.fract().is_zero() {
        exponent.to_i64().and_then(|e| base.checked_powi(e))
    } else {
        base.checked_powd(exponent)
    };

    factor.ok_or_else(|| LateInterestError::Overflow {
        context: format!("compound growth at {rate}% over {days} days"),
    })
}
