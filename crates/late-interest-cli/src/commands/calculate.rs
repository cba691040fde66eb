use std::collections::BTreeMap;

use chrono::NaiveDate;
use clap::Args;
use log::info;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use late_interest_core::engine::{self, CalculationRequest, NewLpRequest};
use late_interest_core::model::{CapitalCall, FundAssumptions, Partner};

use super::assumptions::AssumptionArgs;
use crate::input;

/// Request file for a full run. Assumptions are optional here; when absent
/// they come from the command-line flags.
#[derive(Debug, Deserialize)]
struct RunFile {
    #[serde(default)]
    assumptions: Option<FundAssumptions>,
    partners: Vec<Partner>,
    capital_calls: Vec<CapitalCall>,
    #[serde(default)]
    commitment_increases: Option<BTreeMap<String, Decimal>>,
    #[serde(default)]
    calculation_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct NewLpFile {
    #[serde(default)]
    assumptions: Option<FundAssumptions>,
    partner: Partner,
    capital_calls: Vec<CapitalCall>,
}

/// Arguments for the complete calculation
#[derive(Args)]
pub struct CalculateArgs {
    /// Path to a JSON or YAML request (partners, capital_calls, optional assumptions)
    #[arg(long)]
    pub input: Option<String>,

    /// Date stamped on the result (defaults to today)
    #[arg(long)]
    pub calculation_date: Option<NaiveDate>,

    #[command(flatten)]
    pub assumptions: AssumptionArgs,
}

pub fn run_calculate(args: CalculateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let file: RunFile = read_request(args.input.as_deref(), "calculate")?;

    let request = CalculationRequest {
        assumptions: file
            .assumptions
            .unwrap_or_else(|| args.assumptions.to_assumptions()),
        partners: file.partners,
        capital_calls: file.capital_calls,
        commitment_increases: file.commitment_increases,
        calculation_date: args
            .calculation_date
            .or(file.calculation_date)
            .or_else(|| Some(chrono::Utc::now().date_naive())),
    };
    info!(
        "calculating late interest for {} ({} partners, {} calls)",
        request.assumptions.fund_name,
        request.partners.len(),
        request.capital_calls.len()
    );

    let result = engine::calculate_late_interest(&request)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a single new LP
#[derive(Args)]
pub struct NewLpArgs {
    /// Path to a JSON or YAML request (partner, capital_calls, optional assumptions)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub assumptions: AssumptionArgs,
}

pub fn run_new_lp(args: NewLpArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let file: NewLpFile = read_request(args.input.as_deref(), "new-lp")?;

    let request = NewLpRequest {
        assumptions: file
            .assumptions
            .unwrap_or_else(|| args.assumptions.to_assumptions()),
        partner: file.partner,
        capital_calls: file.capital_calls,
    };

    let result = engine::calculate_new_lp(&request)?;
    Ok(serde_json::to_value(result)?)
}

fn read_request<T: DeserializeOwned>(
    path: Option<&str>,
    command: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        input::file::read_input(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err(format!("--input <file.json|file.yaml> or stdin required for {command}").into())
    }
}
