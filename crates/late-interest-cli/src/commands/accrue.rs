use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use late_interest_core::interest::{inclusive_days, AccrualCalculator};

use super::assumptions::AssumptionArgs;

/// Arguments for a one-off accrual
#[derive(Args)]
pub struct AccrueArgs {
    /// Principal amount
    #[arg(long)]
    pub principal: Decimal,

    /// First day of the accrual (inclusive)
    #[arg(long)]
    pub start: NaiveDate,

    /// Last day of the accrual (inclusive)
    #[arg(long)]
    pub end: NaiveDate,

    #[command(flatten)]
    pub assumptions: AssumptionArgs,
}

pub fn run_accrue(args: AccrueArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let assumptions = args.assumptions.to_assumptions();
    assumptions.validate()?;
    let rounding = assumptions.rounding();

    let calculator = AccrualCalculator::from_assumptions(&assumptions)?;
    let accrual = calculator.accrue(args.principal, args.start, args.end)?;

    Ok(json!({
        "result": {
            "principal": args.principal,
            "start_date": args.start,
            "end_date": args.end,
            "days": inclusive_days(args.start, args.end),
            "interest": rounding.line_item(accrual.interest),
            "effective_rate": rounding.line_item(accrual.effective_rate),
        },
        "methodology": format!(
            "{} interest, actual/365 inclusive",
            assumptions.compounding.label()
        ),
        "assumptions": assumptions.settings(),
        "warnings": [],
    }))
}
