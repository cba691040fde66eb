use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use late_interest_core::engine::{self, CalculationRequest, NewLpRequest};
use late_interest_core::interest::{inclusive_days, AccrualCalculator};
use late_interest_core::model::FundAssumptions;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Late interest
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_new_lp(input_json: String) -> NapiResult<String> {
    let input: NewLpRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = engine::calculate_new_lp(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn run_complete_calculation(input_json: String) -> NapiResult<String> {
    let input: CalculationRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = engine::calculate_late_interest(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Accrual
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct AccrualInput {
    assumptions: FundAssumptions,
    principal: Decimal,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

#[derive(Serialize)]
struct AccrualOutput {
    days: i64,
    interest: Decimal,
    effective_rate: Decimal,
}

#[napi]
pub fn accrue_interest(input_json: String) -> NapiResult<String> {
    let input: AccrualInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    input.assumptions.validate().map_err(to_napi_error)?;
    let rounding = input.assumptions.rounding();

    let calculator = AccrualCalculator::from_assumptions(&input.assumptions).map_err(to_napi_error)?;
    let accrual = calculator
        .accrue(input.principal, input.start_date, input.end_date)
        .map_err(to_napi_error)?;

    let output = AccrualOutput {
        days: inclusive_days(input.start_date, input.end_date),
        interest: rounding.line_item(accrual.interest),
        effective_rate: rounding.line_item(accrual.effective_rate),
    };
    serde_json::to_string(&output).map_err(to_napi_error)
}
