use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::assumptions::CalculationSettings;
use crate::types::{Money, Percent};

/// Late interest owed on one missed capital call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LateInterestDetail {
    pub call_number: u32,
    pub due_date: NaiveDate,
    pub call_percentage: Percent,
    /// Catch-up capital for this call
    pub capital_amount: Money,
    pub late_interest: Money,
    /// Calendar days from due date to end date; 0 when not late
    pub days_late: i64,
    /// Rate actually applied; a flat-equivalent when the rate varied
    pub effective_rate: Percent,
}

/// Complete late interest calculation for one new LP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLpCalculation {
    pub partner_name: String,
    pub issue_date: NaiveDate,
    pub commitment: Money,
    pub close_number: u32,
    pub total_catch_up: Money,
    pub total_late_interest_due: Money,
    pub breakdown: Vec<LateInterestDetail>,
}

/// Late interest allocated to an existing LP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingLpAllocation {
    pub partner_name: String,
    /// Current commitment, even when the allocation used a pre-increase base
    pub commitment: Money,
    pub close_number: u32,
    pub total_allocation: Money,
    /// Admitting close number -> amount allocated from that close
    pub allocation_by_admitting_close: BTreeMap<u32, Money>,
}

/// Allocations produced for a single admitting close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseAllocation {
    pub allocations: Vec<ExistingLpAllocation>,
    pub total_allocated: Money,
}

impl CloseAllocation {
    pub fn empty() -> Self {
        Self {
            allocations: Vec::new(),
            total_allocated: Money::ZERO,
        }
    }
}

/// Collected-versus-allocated summary for a processed close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseSummary {
    pub close_number: u32,
    pub new_lps_count: usize,
    pub existing_lps_count: usize,
    pub total_collected: Money,
    pub total_allocated: Money,
    /// Collected minus allocated; rounding residue only
    pub difference: Money,
}

/// Fund-level late interest result across all closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub fund_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculation_date: Option<NaiveDate>,
    pub total_late_interest_collected: Money,
    pub total_late_interest_allocated: Money,
    pub new_lps: Vec<NewLpCalculation>,
    pub existing_lps: Vec<ExistingLpAllocation>,
    pub summary_by_close: Vec<CloseSummary>,
    pub settings: CalculationSettings,
}
