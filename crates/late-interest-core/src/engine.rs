//! Fund-level orchestration across closes.
//!
//! Closes are processed in ascending order. The first close admits the
//! initial LPs and is never charged late interest; every later close charges
//! its new LPs and allocates the proceeds to partners admitted before it.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::allocation::AllocationCalculator;
use crate::error::LateInterestError;
use crate::late_interest::LateInterestCalculator;
use crate::model::{
    CalculationResult, CapitalCall, CloseSummary, ExistingLpAllocation, FundAssumptions,
    NewLpCalculation, Partner, RateBasis,
};
use crate::rounding::RoundingPolicy;
use crate::types::*;
use crate::LateInterestResult;

/// Collected and allocated totals closer than this are considered balanced.
pub const BALANCE_TOLERANCE: Decimal = dec!(0.10);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Everything needed for a fund-wide late interest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub assumptions: FundAssumptions,
    pub partners: Vec<Partner>,
    pub capital_calls: Vec<CapitalCall>,
    /// Partner name -> commitment before an increase at a later close
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commitment_increases: Option<BTreeMap<String, Money>>,
    /// Stamped on the result; the engine never reads the clock
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation_date: Option<NaiveDate>,
}

/// Late interest for a single new LP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLpRequest {
    pub assumptions: FundAssumptions,
    pub partner: Partner,
    pub capital_calls: Vec<CapitalCall>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Late interest engine bound to one fund's assumptions.
///
/// Holds only immutable configuration, so one instance can serve any number
/// of runs.
#[derive(Debug, Clone)]
pub struct LateInterestEngine {
    assumptions: FundAssumptions,
    late_interest: LateInterestCalculator,
    allocation: AllocationCalculator,
    rounding: RoundingPolicy,
}

impl LateInterestEngine {
    pub fn new(assumptions: &FundAssumptions) -> LateInterestResult<Self> {
        assumptions.validate()?;
        Ok(Self {
            assumptions: assumptions.clone(),
            late_interest: LateInterestCalculator::new(assumptions)?,
            allocation: AllocationCalculator::new(assumptions),
            rounding: assumptions.rounding(),
        })
    }

    pub fn assumptions(&self) -> &FundAssumptions {
        &self.assumptions
    }

    /// Late interest owed by one partner.
    pub fn compute_new_lp(
        &self,
        partner: &Partner,
        capital_calls: &[CapitalCall],
    ) -> LateInterestResult<NewLpCalculation> {
        validate_partners(std::slice::from_ref(partner))?;
        validate_capital_calls(capital_calls)?;
        self.late_interest.compute(partner, capital_calls)
    }

    /// Late interest and allocations across every close.
    ///
    /// Any failure aborts the whole run: a partial fund-level result would
    /// misstate what each partner owes or is owed.
    pub fn run(
        &self,
        partners: &[Partner],
        capital_calls: &[CapitalCall],
        commitment_increases: Option<&BTreeMap<String, Money>>,
    ) -> LateInterestResult<CalculationResult> {
        validate_partners(partners)?;
        validate_capital_calls(capital_calls)?;
        if let Some(increases) = commitment_increases {
            validate_increases(increases)?;
        }

        let mut ordered = partners.to_vec();
        ordered.sort_by_key(|p| p.close_number);

        let mut by_close: BTreeMap<u32, Vec<&Partner>> = BTreeMap::new();
        for partner in &ordered {
            by_close.entry(partner.close_number).or_default().push(partner);
        }

        let mut new_lps: Vec<NewLpCalculation> = Vec::new();
        let mut allocations_by_close: BTreeMap<u32, Vec<ExistingLpAllocation>> = BTreeMap::new();
        let mut summary_by_close: Vec<CloseSummary> = Vec::new();
        let mut grand_collected = Decimal::ZERO;
        let mut grand_allocated = Decimal::ZERO;

        // the lowest close is the initial closing
        for (&close, admitted) in by_close.iter().skip(1) {
            let existing_count = ordered.iter().filter(|p| p.close_number < close).count();

            let calcs = admitted
                .iter()
                .map(|lp| self.late_interest.compute(lp, capital_calls))
                .collect::<LateInterestResult<Vec<_>>>()?;
            let total_collected = self
                .rounding
                .aggregate(calcs.iter().map(|c| c.total_late_interest_due).sum());

            let mut total_allocated = Decimal::ZERO;
            if existing_count > 0 && total_collected > Decimal::ZERO {
                let outcome = match commitment_increases {
                    Some(increases) if !increases.is_empty() => self
                        .allocation
                        .allocate_with_increases(&calcs, &ordered, increases, close)?,
                    _ => self.allocation.allocate(&calcs, &ordered, close)?,
                };
                total_allocated = outcome.total_allocated;
                allocations_by_close.insert(close, outcome.allocations);
            }

            let difference = total_collected - total_allocated;
            if total_allocated > Decimal::ZERO && difference.abs() >= BALANCE_TOLERANCE {
                warn!("close {close}: collected {total_collected}, allocated {total_allocated}");
            }
            debug!(
                "close {close}: {} new LPs, {existing_count} existing, collected {total_collected}",
                admitted.len()
            );

            grand_collected += total_collected;
            grand_allocated += total_allocated;
            summary_by_close.push(CloseSummary {
                close_number: close,
                new_lps_count: admitted.len(),
                existing_lps_count: existing_count,
                total_collected,
                total_allocated,
                difference,
            });
            new_lps.extend(calcs);
        }

        Ok(CalculationResult {
            fund_name: self.assumptions.fund_name.clone(),
            calculation_date: None,
            total_late_interest_collected: self.rounding.aggregate(grand_collected),
            total_late_interest_allocated: self.rounding.aggregate(grand_allocated),
            new_lps,
            existing_lps: self.allocation.aggregate(&allocations_by_close),
            summary_by_close,
            settings: self.assumptions.settings(),
        })
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Late interest owed by a single new LP.
pub fn compute_new_lp(
    partner: &Partner,
    capital_calls: &[CapitalCall],
    assumptions: &FundAssumptions,
) -> LateInterestResult<NewLpCalculation> {
    LateInterestEngine::new(assumptions)?.compute_new_lp(partner, capital_calls)
}

/// Complete fund-level calculation across all closes.
pub fn run_complete_calculation(
    partners: &[Partner],
    capital_calls: &[CapitalCall],
    assumptions: &FundAssumptions,
    commitment_increases: Option<&BTreeMap<String, Money>>,
) -> LateInterestResult<CalculationResult> {
    LateInterestEngine::new(assumptions)?.run(partners, capital_calls, commitment_increases)
}

/// [`compute_new_lp`] wrapped in the standard output envelope.
pub fn calculate_new_lp(
    input: &NewLpRequest,
) -> LateInterestResult<ComputationOutput<NewLpCalculation>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let output = compute_new_lp(&input.partner, &input.capital_calls, &input.assumptions)?;
    if output.breakdown.is_empty() {
        warnings.push(format!(
            "{} was admitted before every capital call; nothing is due",
            output.partner_name
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &methodology(&input.assumptions),
        &serde_json::json!({
            "fund_name": input.assumptions.fund_name,
            "settings": input.assumptions.settings(),
            "num_capital_calls": input.capital_calls.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// [`run_complete_calculation`] wrapped in the standard output envelope,
/// with balance and coverage warnings.
pub fn calculate_late_interest(
    input: &CalculationRequest,
) -> LateInterestResult<ComputationOutput<CalculationResult>> {
    let start = Instant::now();

    let mut output = run_complete_calculation(
        &input.partners,
        &input.capital_calls,
        &input.assumptions,
        input.commitment_increases.as_ref(),
    )?;
    output.calculation_date = input.calculation_date;
    let warnings = run_warnings(&output);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &methodology(&input.assumptions),
        &serde_json::json!({
            "fund_name": input.assumptions.fund_name,
            "settings": input.assumptions.settings(),
            "num_partners": input.partners.len(),
            "num_capital_calls": input.capital_calls.len(),
            "commitment_increases": input.commitment_increases.as_ref().map_or(0, |m| m.len()),
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn methodology(assumptions: &FundAssumptions) -> String {
    let rate = match &assumptions.rate_basis {
        RateBasis::Prime { .. } => "prime + spread",
        RateBasis::Flat { .. } => "flat rate",
    };
    format!(
        "Late Interest on Subsequent Closings ({} interest, {}, through {}, actual/365 inclusive)",
        assumptions.compounding.label(),
        rate,
        assumptions.end_date_calculation.label()
    )
}

fn run_warnings(result: &CalculationResult) -> Vec<String> {
    let mut warnings = Vec::new();
    for summary in &result.summary_by_close {
        if summary.existing_lps_count == 0 && summary.total_collected > Decimal::ZERO {
            warnings.push(format!(
                "Close {}: {} collected but no earlier partners to allocate to",
                summary.close_number, summary.total_collected
            ));
        } else if summary.total_allocated > Decimal::ZERO
            && summary.difference.abs() >= BALANCE_TOLERANCE
        {
            warnings.push(format!(
                "Close {}: collected {} but allocated {} (difference {})",
                summary.close_number,
                summary.total_collected,
                summary.total_allocated,
                summary.difference
            ));
        }
    }
    for lp in &result.new_lps {
        if lp.breakdown.is_empty() {
            warnings.push(format!(
                "{} (close {}) missed no capital calls",
                lp.partner_name, lp.close_number
            ));
        }
    }
    warnings
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_partners(partners: &[Partner]) -> LateInterestResult<()> {
    let mut names: BTreeSet<&str> = BTreeSet::new();
    for partner in partners {
        if partner.name.trim().is_empty() {
            return Err(LateInterestError::InvalidInput {
                field: "partners.name".into(),
                reason: "Partner name cannot be empty".into(),
            });
        }
        if !names.insert(partner.name.as_str()) {
            return Err(LateInterestError::InvalidInput {
                field: "partners.name".into(),
                reason: format!("Duplicate partner name '{}'", partner.name),
            });
        }
        if partner.commitment <= Decimal::ZERO {
            return Err(LateInterestError::InvalidInput {
                field: format!("partners[{}].commitment", partner.name),
                reason: "Commitment must be positive".into(),
            });
        }
        if partner.close_number < 1 {
            return Err(LateInterestError::InvalidInput {
                field: format!("partners[{}].close_number", partner.name),
                reason: "Close number must be at least 1".into(),
            });
        }
    }
    Ok(())
}

fn validate_capital_calls(calls: &[CapitalCall]) -> LateInterestResult<()> {
    let mut numbers: BTreeSet<u32> = BTreeSet::new();
    for call in calls {
        call.validate()?;
        if !numbers.insert(call.call_number) {
            return Err(LateInterestError::InvalidInput {
                field: "capital_calls.call_number".into(),
                reason: format!("Duplicate capital call number {}", call.call_number),
            });
        }
    }
    Ok(())
}

fn validate_increases(increases: &BTreeMap<String, Money>) -> LateInterestResult<()> {
    for (name, original) in increases {
        if *original < Decimal::ZERO {
            return Err(LateInterestError::InvalidInput {
                field: format!("commitment_increases[{name}]"),
                reason: "Original commitment cannot be negative".into(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
