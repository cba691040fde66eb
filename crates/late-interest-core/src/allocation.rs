//! Pro-rata allocation of collected late interest to existing LPs.
//!
//! Interest collected from the LPs admitted at a close is shared among every
//! partner admitted at an earlier close, in proportion to commitment. A
//! partner who increased its commitment at the admitting close shares on its
//! pre-increase commitment only; the increase itself is a new LP.

use std::collections::BTreeMap;

use log::debug;
use rust_decimal::Decimal;

use crate::error::LateInterestError;
use crate::model::{
    CloseAllocation, ExistingLpAllocation, FundAssumptions, NewLpCalculation, Partner,
};
use crate::rounding::RoundingPolicy;
use crate::types::Money;
use crate::LateInterestResult;

#[derive(Debug, Clone)]
pub struct AllocationCalculator {
    rounding: RoundingPolicy,
}

impl AllocationCalculator {
    pub fn new(assumptions: &FundAssumptions) -> Self {
        Self::with_rounding(assumptions.rounding())
    }

    pub fn with_rounding(rounding: RoundingPolicy) -> Self {
        Self { rounding }
    }

    /// Allocate the late interest collected at `admitting_close` across all
    /// partners admitted before it, pro-rata on current commitment.
    pub fn allocate(
        &self,
        new_lp_calcs: &[NewLpCalculation],
        all_partners: &[Partner],
        admitting_close: u32,
    ) -> LateInterestResult<CloseAllocation> {
        self.allocate_on_basis(new_lp_calcs, all_partners, admitting_close, |p| {
            p.commitment
        })
    }

    /// As [`allocate`](Self::allocate), but partners named in
    /// `commitment_increases` (name -> original commitment) share on their
    /// original commitment. The reported commitment remains the current one.
    pub fn allocate_with_increases(
        &self,
        new_lp_calcs: &[NewLpCalculation],
        all_partners: &[Partner],
        commitment_increases: &BTreeMap<String, Money>,
        admitting_close: u32,
    ) -> LateInterestResult<CloseAllocation> {
        self.allocate_on_basis(new_lp_calcs, all_partners, admitting_close, |p| {
            commitment_increases
                .get(&p.name)
                .copied()
                .unwrap_or(p.commitment)
        })
    }

    fn allocate_on_basis<F>(
        &self,
        new_lp_calcs: &[NewLpCalculation],
        all_partners: &[Partner],
        admitting_close: u32,
        basis: F,
    ) -> LateInterestResult<CloseAllocation>
    where
        F: Fn(&Partner) -> Money,
    {
        let existing: Vec<&Partner> = all_partners
            .iter()
            .filter(|p| p.close_number < admitting_close)
            .collect();
        if existing.is_empty() {
            return Ok(CloseAllocation::empty());
        }

        let total_late_interest: Money = new_lp_calcs
            .iter()
            .filter(|c| c.close_number == admitting_close)
            .map(|c| c.total_late_interest_due)
            .sum();
        if total_late_interest.is_zero() {
            return Ok(CloseAllocation::empty());
        }

        let total_base: Money = existing.iter().map(|p| basis(*p)).sum();
        if total_base.is_zero() {
            return Err(LateInterestError::Configuration(format!(
                "Total existing commitment at close {admitting_close} is zero; \
                 cannot allocate {total_late_interest} pro-rata"
            )));
        }

        let mut allocations = Vec::with_capacity(existing.len());
        let mut total_allocated = Decimal::ZERO;

        for partner in existing {
            let share = basis(partner) / total_base;
            let amount = self.rounding.line_item(total_late_interest * share);
            total_allocated += amount;

            allocations.push(ExistingLpAllocation {
                partner_name: partner.name.clone(),
                commitment: partner.commitment,
                close_number: partner.close_number,
                total_allocation: amount,
                allocation_by_admitting_close: BTreeMap::from([(admitting_close, amount)]),
            });
        }

        let total_allocated = self.rounding.aggregate(total_allocated);
        debug!(
            "close {admitting_close}: allocated {total_allocated} of {total_late_interest} \
             across {} existing partners",
            allocations.len()
        );

        Ok(CloseAllocation {
            allocations,
            total_allocated,
        })
    }

    /// Combine per-close allocations into one record per partner.
    ///
    /// Partners appear in the order first seen (ascending close, then the
    /// order within that close). Totals are rounded once, after summing.
    pub fn aggregate(
        &self,
        allocations_by_close: &BTreeMap<u32, Vec<ExistingLpAllocation>>,
    ) -> Vec<ExistingLpAllocation> {
        let mut aggregated: Vec<ExistingLpAllocation> = Vec::new();
        let mut index: BTreeMap<&str, usize> = BTreeMap::new();

        for (close, allocations) in allocations_by_close {
            for allocation in allocations {
                let slot = *index
                    .entry(allocation.partner_name.as_str())
                    .or_insert_with(|| {
                        aggregated.push(ExistingLpAllocation {
                            partner_name: allocation.partner_name.clone(),
                            commitment: allocation.commitment,
                            close_number: allocation.close_number,
                            total_allocation: Decimal::ZERO,
                            allocation_by_admitting_close: BTreeMap::new(),
                        });
                        aggregated.len() - 1
                    });

                let entry = &mut aggregated[slot];
                entry.total_allocation += allocation.total_allocation;
                entry
                    .allocation_by_admitting_close
                    .insert(*close, allocation.total_allocation);
            }
        }

        for entry in &mut aggregated {
            entry.total_allocation = self.rounding.aggregate(entry.total_allocation);
        }
        aggregated
    }
}
