use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;

use late_interest_core::model::{
    EndDateCalculation, FundAssumptions, InterestCompounding, RateChange,
};

/// Fund assumptions assembled from flags, used when the input file carries
/// none of its own.
#[derive(Args, Debug, Clone)]
pub struct AssumptionArgs {
    /// Fund name reported on the result
    #[arg(long, default_value = "Fund")]
    pub fund_name: String,

    /// Prime rate in percent
    #[arg(long, default_value = "7.5")]
    pub prime_rate: Decimal,

    /// Date from which the prime rate applies
    #[arg(long, default_value = "2020-01-01")]
    pub prime_effective: NaiveDate,

    /// Spread over prime in percent
    #[arg(long, default_value = "2.0")]
    pub spread: Decimal,

    /// Flat annual rate in percent (replaces prime + spread)
    #[arg(long)]
    pub flat_rate: Option<Decimal>,

    /// Simple or daily-compounded interest
    #[arg(long, value_enum, default_value = "simple")]
    pub compounding: CompoundingArg,

    /// Date interest runs to: the LP's issue date or the call's due date
    #[arg(long, value_enum, default_value = "issue-date")]
    pub end_date_calc: EndDateArg,

    /// Decimal places for each line item
    #[arg(long, default_value_t = 2)]
    pub calc_rounding: u32,

    /// Decimal places for totals
    #[arg(long, default_value_t = 2)]
    pub sum_rounding: u32,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompoundingArg {
    Simple,
    Compound,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EndDateArg {
    IssueDate,
    DueDate,
}

impl From<CompoundingArg> for InterestCompounding {
    fn from(arg: CompoundingArg) -> Self {
        match arg {
            CompoundingArg::Simple => InterestCompounding::Simple,
            CompoundingArg::Compound => InterestCompounding::Compound,
        }
    }
}

impl From<EndDateArg> for EndDateCalculation {
    fn from(arg: EndDateArg) -> Self {
        match arg {
            EndDateArg::IssueDate => EndDateCalculation::IssueDate,
            EndDateArg::DueDate => EndDateCalculation::DueDate,
        }
    }
}

impl AssumptionArgs {
    pub fn to_assumptions(&self) -> FundAssumptions {
        let base = match self.flat_rate {
            Some(rate) => FundAssumptions::flat(self.fund_name.clone(), rate),
            None => FundAssumptions::prime(
                self.fund_name.clone(),
                vec![RateChange::new(self.prime_effective, self.prime_rate)],
                self.spread,
            ),
        };
        base.with_compounding(self.compounding.into())
            .with_end_date_calculation(self.end_date_calc.into())
            .with_rounding(self.calc_rounding, self.sum_rounding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use late_interest_core::model::RateBasis;
    use rust_decimal_macros::dec;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        assumptions: AssumptionArgs,
    }

    #[test]
    fn test_defaults_are_prime_plus_two() {
        let h = Harness::parse_from(["lie"]);
        let a = h.assumptions.to_assumptions();
        assert_eq!(a.fund_name, "Fund");
        assert_eq!(a.compounding, InterestCompounding::Simple);
        assert_eq!(a.end_date_calculation, EndDateCalculation::IssueDate);
        match a.rate_basis {
            RateBasis::Prime { spread, rate_history } => {
                assert_eq!(spread, dec!(2.0));
                assert_eq!(rate_history[0].rate, dec!(7.5));
            }
            RateBasis::Flat { .. } => panic!("Expected prime basis"),
        }
    }

    #[test]
    fn test_flat_rate_flag() {
        let h = Harness::parse_from([
            "lie",
            "--flat-rate",
            "10",
            "--compounding",
            "compound",
            "--end-date-calc",
            "due-date",
        ]);
        let a = h.assumptions.to_assumptions();
        assert_eq!(a.rate_basis, RateBasis::Flat { rate: dec!(10) });
        assert_eq!(a.compounding, InterestCompounding::Compound);
        assert_eq!(a.end_date_calculation, EndDateCalculation::DueDate);
    }
}
