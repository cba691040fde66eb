use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LateInterestError;
use crate::rounding::{RoundingPolicy, MAX_DECIMAL_PLACES};
use crate::types::Percent;
use crate::LateInterestResult;

// ---------------------------------------------------------------------------
// Rate configuration
// ---------------------------------------------------------------------------

/// A change in the published base rate (e.g. US Prime).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateChange {
    pub effective_date: NaiveDate,
    /// Base rate as a percentage, e.g. 7.25 for 7.25%
    pub rate: Percent,
}

impl RateChange {
    pub fn new(effective_date: NaiveDate, rate: Percent) -> Self {
        Self {
            effective_date,
            rate,
        }
    }
}

/// Where the late-interest rate comes from.
///
/// Each variant carries only the fields that apply to it, so a fund cannot
/// be configured with both a rate history and a flat rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "base", rename_all = "snake_case")]
pub enum RateBasis {
    /// Variable base rate plus a contractual spread
    Prime {
        /// Percentage points added to the base rate (2 = +2%)
        spread: Percent,
        /// Base-rate changes; need not be pre-sorted
        rate_history: Vec<RateChange>,
    },
    /// One rate for every day of every period
    Flat { rate: Percent },
}

impl RateBasis {
    pub fn label(&self) -> &'static str {
        match self {
            RateBasis::Prime { .. } => "prime",
            RateBasis::Flat { .. } => "flat",
        }
    }
}

/// Late interest compounding convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestCompounding {
    #[default]
    Simple,
    Compound,
}

impl InterestCompounding {
    /// Compounding frequency used for this convention. Compound mode always
    /// compounds daily.
    pub fn frequency(&self) -> Option<CompoundingFrequency> {
        match self {
            InterestCompounding::Simple => None,
            InterestCompounding::Compound => Some(CompoundingFrequency::Daily),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InterestCompounding::Simple => "simple",
            InterestCompounding::Compound => "compound",
        }
    }
}

/// Compounding periods per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompoundingFrequency {
    Daily,
    Monthly,
    Quarterly,
    Annual,
}

impl CompoundingFrequency {
    pub fn periods_per_year(&self) -> u32 {
        match self {
            CompoundingFrequency::Daily => 365,
            CompoundingFrequency::Monthly => 12,
            CompoundingFrequency::Quarterly => 4,
            CompoundingFrequency::Annual => 1,
        }
    }
}

/// How far late interest runs for a missed capital call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndDateCalculation {
    /// Through the new LP's admission (issue) date
    #[default]
    IssueDate,
    /// Only to the capital call's own due date, i.e. no late interest
    DueDate,
}

impl EndDateCalculation {
    pub fn label(&self) -> &'static str {
        match self {
            EndDateCalculation::IssueDate => "issue_date",
            EndDateCalculation::DueDate => "due_date",
        }
    }
}

// ---------------------------------------------------------------------------
// Fund assumptions
// ---------------------------------------------------------------------------

/// Fund-level configuration for late interest calculations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundAssumptions {
    pub fund_name: String,
    pub rate_basis: RateBasis,
    #[serde(default)]
    pub compounding: InterestCompounding,
    #[serde(default)]
    pub end_date_calculation: EndDateCalculation,
    /// Decimal places for per-line-item amounts
    #[serde(default = "default_rounding")]
    pub calc_rounding: u32,
    /// Decimal places for aggregate amounts
    #[serde(default = "default_rounding")]
    pub sum_rounding: u32,
}

fn default_rounding() -> u32 {
    2
}

impl FundAssumptions {
    /// Prime-plus-spread fund with the default conventions (simple interest
    /// through issue date, cents rounding).
    pub fn prime(fund_name: impl Into<String>, rate_history: Vec<RateChange>, spread: Percent) -> Self {
        Self {
            fund_name: fund_name.into(),
            rate_basis: RateBasis::Prime {
                spread,
                rate_history,
            },
            compounding: InterestCompounding::Simple,
            end_date_calculation: EndDateCalculation::IssueDate,
            calc_rounding: 2,
            sum_rounding: 2,
        }
    }

    /// Flat-rate fund with the default conventions.
    pub fn flat(fund_name: impl Into<String>, rate: Percent) -> Self {
        Self {
            fund_name: fund_name.into(),
            rate_basis: RateBasis::Flat { rate },
            compounding: InterestCompounding::Simple,
            end_date_calculation: EndDateCalculation::IssueDate,
            calc_rounding: 2,
            sum_rounding: 2,
        }
    }

    pub fn with_compounding(mut self, compounding: InterestCompounding) -> Self {
        self.compounding = compounding;
        self
    }

    pub fn with_end_date_calculation(mut self, policy: EndDateCalculation) -> Self {
        self.end_date_calculation = policy;
        self
    }

    pub fn with_rounding(mut self, calc_rounding: u32, sum_rounding: u32) -> Self {
        self.calc_rounding = calc_rounding;
        self.sum_rounding = sum_rounding;
        self
    }

    pub fn rounding(&self) -> RoundingPolicy {
        RoundingPolicy::new(self.calc_rounding, self.sum_rounding)
    }

    /// Check the assumptions are usable before any calculation starts.
    pub fn validate(&self) -> LateInterestResult<()> {
        if self.fund_name.trim().is_empty() {
            return Err(LateInterestError::InvalidInput {
                field: "fund_name".into(),
                reason: "Fund name cannot be empty".into(),
            });
        }
        for (field, places) in [
            ("calc_rounding", self.calc_rounding),
            ("sum_rounding", self.sum_rounding),
        ] {
            if places > MAX_DECIMAL_PLACES {
                return Err(LateInterestError::InvalidInput {
                    field: field.into(),
                    reason: format!("Rounding cannot exceed {MAX_DECIMAL_PLACES} decimal places"),
                });
            }
        }
        match &self.rate_basis {
            RateBasis::Prime { rate_history, .. } if rate_history.is_empty() => {
                Err(LateInterestError::Configuration(
                    "Prime rate basis requires at least one rate history entry".into(),
                ))
            }
            RateBasis::Flat { rate } if *rate < Decimal::ZERO => {
                Err(LateInterestError::InvalidInput {
                    field: "rate_basis.rate".into(),
                    reason: "Flat rate cannot be negative".into(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Echo of the settings a run used, for the result payload.
    pub fn settings(&self) -> CalculationSettings {
        let (late_spread, base_rate, flat_rate) = match &self.rate_basis {
            RateBasis::Prime {
                spread,
                rate_history,
            } => (Some(*spread), rate_history.first().map(|rc| rc.rate), None),
            RateBasis::Flat { rate } => (None, None, Some(*rate)),
        };
        CalculationSettings {
            late_interest_base: self.rate_basis.label().to_string(),
            late_spread,
            base_rate,
            flat_rate,
            compounding: self.compounding,
            end_date_calculation: self.end_date_calculation,
            calc_rounding: self.calc_rounding,
            sum_rounding: self.sum_rounding,
        }
    }
}

/// Settings echoed back with every complete calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationSettings {
    pub late_interest_base: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub late_spread: Option<Percent>,
    /// First entry of the configured base-rate history
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_rate: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flat_rate: Option<Percent>,
    pub compounding: InterestCompounding,
    pub end_date_calculation: EndDateCalculation,
    pub calc_rounding: u32,
    pub sum_rounding: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_prime_requires_history() {
        let a = FundAssumptions::prime("Fund I", vec![], dec!(2));
        match a.validate().unwrap_err() {
            LateInterestError::Configuration(msg) => assert!(msg.contains("rate history")),
            other => panic!("Expected Configuration, got: {other:?}"),
        }
    }

    #[test]
    fn test_rounding_bound() {
        let a = FundAssumptions::flat("Fund I", dec!(10)).with_rounding(29, 2);
        assert!(a.validate().is_err());
        let a = FundAssumptions::flat("Fund I", dec!(10)).with_rounding(4, 2);
        assert!(a.validate().is_ok());
    }

    #[test]
    fn test_settings_echo() {
        let a = FundAssumptions::prime(
            "Fund I",
            vec![RateChange::new(d(2020, 1, 1), dec!(7.5))],
            dec!(2),
        );
        let s = a.settings();
        assert_eq!(s.late_interest_base, "prime");
        assert_eq!(s.base_rate, Some(dec!(7.5)));
        assert_eq!(s.late_spread, Some(dec!(2)));
        assert_eq!(s.flat_rate, None);
    }

    #[test]
    fn test_compound_is_daily() {
        let freq = InterestCompounding::Compound.frequency().unwrap();
        assert_eq!(freq.periods_per_year(), 365);
        assert!(InterestCompounding::Simple.frequency().is_none());
    }

    #[test]
    fn test_rate_basis_json_shape() {
        let json = r#"{
            "fund_name": "Fund II",
            "rate_basis": {
                "base": "prime",
                "spread": "2.0",
                "rate_history": [{"effective_date": "2020-01-01", "rate": "7.5"}]
            },
            "compounding": "compound",
            "end_date_calculation": "due_date"
        }"#;
        let a: FundAssumptions = serde_json::from_str(json).unwrap();
        assert_eq!(a.compounding, InterestCompounding::Compound);
        assert_eq!(a.end_date_calculation, EndDateCalculation::DueDate);
        assert_eq!(a.calc_rounding, 2);
        match a.rate_basis {
            RateBasis::Prime { spread, rate_history } => {
                assert_eq!(spread, dec!(2.0));
                assert_eq!(rate_history.len(), 1);
            }
            RateBasis::Flat { .. } => panic!("Expected prime basis"),
        }
    }
}
