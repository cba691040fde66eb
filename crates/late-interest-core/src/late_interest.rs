//! Late interest owed by LPs admitted after capital calls fell due.
//!
//! A partner joining at a subsequent close contributes the capital it would
//! have paid on every earlier call (the catch-up) plus interest on each
//! amount from the call's due date through its own admission.

use log::debug;
use rust_decimal::Decimal;

use crate::interest::AccrualCalculator;
use crate::model::{
    CapitalCall, EndDateCalculation, FundAssumptions, LateInterestDetail, NewLpCalculation,
    Partner,
};
use crate::rounding::RoundingPolicy;
use crate::LateInterestResult;

/// Calculates late interest for new LPs under one fund's assumptions.
#[derive(Debug, Clone)]
pub struct LateInterestCalculator {
    accrual: AccrualCalculator,
    end_date_calculation: EndDateCalculation,
    rounding: RoundingPolicy,
}

impl LateInterestCalculator {
    /// Fails with a configuration error if the rate basis cannot resolve a
    /// rate (e.g. an empty prime history).
    pub fn new(assumptions: &FundAssumptions) -> LateInterestResult<Self> {
        Ok(Self {
            accrual: AccrualCalculator::from_assumptions(assumptions)?,
            end_date_calculation: assumptions.end_date_calculation,
            rounding: assumptions.rounding(),
        })
    }

    /// Late interest owed by `new_lp` across every call due before it was
    /// admitted.
    pub fn compute(
        &self,
        new_lp: &Partner,
        capital_calls: &[CapitalCall],
    ) -> LateInterestResult<NewLpCalculation> {
        let mut missed: Vec<&CapitalCall> = capital_calls
            .iter()
            .filter(|call| call.due_date < new_lp.issue_date)
            .collect();
        missed.sort_by_key(|call| call.call_number);

        let breakdown = missed
            .into_iter()
            .map(|call| self.detail_for_call(new_lp, call))
            .collect::<LateInterestResult<Vec<_>>>()?;

        let total_catch_up = self
            .rounding
            .aggregate(breakdown.iter().map(|d| d.capital_amount).sum());
        let total_late_interest_due = self
            .rounding
            .aggregate(breakdown.iter().map(|d| d.late_interest).sum());

        debug!(
            "{} (close {}): {} missed calls, catch-up {}, late interest {}",
            new_lp.name,
            new_lp.close_number,
            breakdown.len(),
            total_catch_up,
            total_late_interest_due
        );

        Ok(NewLpCalculation {
            partner_name: new_lp.name.clone(),
            issue_date: new_lp.issue_date,
            commitment: new_lp.commitment,
            close_number: new_lp.close_number,
            total_catch_up,
            total_late_interest_due,
            breakdown,
        })
    }

    /// `compute` for each partner, in input order.
    pub fn compute_for_new_lps(
        &self,
        new_lps: &[Partner],
        capital_calls: &[CapitalCall],
    ) -> LateInterestResult<Vec<NewLpCalculation>> {
        new_lps
            .iter()
            .map(|lp| self.compute(lp, capital_calls))
            .collect()
    }

    fn detail_for_call(
        &self,
        new_lp: &Partner,
        call: &CapitalCall,
    ) -> LateInterestResult<LateInterestDetail> {
        let capital_amount = call.call_amount(new_lp.commitment);

        let end_date = match self.end_date_calculation {
            EndDateCalculation::IssueDate => new_lp.issue_date,
            EndDateCalculation::DueDate => call.due_date,
        };
        let days_late = (end_date - call.due_date).num_days();

        if days_late <= 0 {
            return Ok(LateInterestDetail {
                call_number: call.call_number,
                due_date: call.due_date,
                call_percentage: call.call_percentage,
                capital_amount: self.rounding.line_item(capital_amount),
                late_interest: Decimal::ZERO,
                days_late: 0,
                effective_rate: Decimal::ZERO,
            });
        }

        let accrued = self.accrual.accrue(capital_amount, call.due_date, end_date)?;

        Ok(LateInterestDetail {
            call_number: call.call_number,
            due_date: call.due_date,
            call_percentage: call.call_percentage,
            capital_amount: self.rounding.line_item(capital_amount),
            late_interest: self.rounding.line_item(accrued.interest),
            days_late,
            effective_rate: self.rounding.line_item(accrued.effective_rate),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LateInterestError;
    use crate::model::RateChange;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn fund() -> FundAssumptions {
        FundAssumptions::prime(
            "Test Fund",
            vec![RateChange::new(d(2020, 1, 1), dec!(7.5))],
            dec!(2.0),
        )
    }

    fn calls() -> Vec<CapitalCall> {
        vec![
            CapitalCall::new(2, d(2022, 12, 1), dec!(15)),
            CapitalCall::new(1, d(2022, 5, 1), dec!(25)),
            CapitalCall::new(3, d(2023, 9, 1), dec!(20)),
        ]
    }

    #[test]
    fn test_missed_calls_sorted_by_number() {
        let calc = LateInterestCalculator::new(&fund()).unwrap();
        let lp = Partner::new("Partner D", d(2023, 6, 1), dec!(1500000), 2);
        let result = calc.compute(&lp, &calls()).unwrap();

        let numbers: Vec<u32> = result.breakdown.iter().map(|d| d.call_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(result.total_catch_up, dec!(600000.00));
        // 375,000 x 9.5% x 397/365 + 225,000 x 9.5% x 183/365
        assert_eq!(result.breakdown[0].days_late, 396);
        assert_eq!(result.breakdown[0].late_interest, dec!(38748.29));
        assert_eq!(result.breakdown[1].late_interest, dec!(10716.78));
        assert_eq!(result.total_late_interest_due, dec!(49465.07));
        assert_eq!(result.breakdown[0].effective_rate, dec!(9.50));
    }

    #[test]
    fn test_call_due_on_issue_date_not_missed() {
        let calc = LateInterestCalculator::new(&fund()).unwrap();
        let lp = Partner::new("Partner E", d(2022, 12, 1), dec!(1000000), 2);
        let result = calc.compute(&lp, &calls()).unwrap();
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].call_number, 1);
    }

    #[test]
    fn test_due_date_policy_yields_zero_interest() {
        let assumptions = fund().with_end_date_calculation(EndDateCalculation::DueDate);
        let calc = LateInterestCalculator::new(&assumptions).unwrap();
        let lp = Partner::new("Partner D", d(2023, 6, 1), dec!(1500000), 2);
        let result = calc.compute(&lp, &calls()).unwrap();

        assert_eq!(result.total_catch_up, dec!(600000.00));
        assert_eq!(result.total_late_interest_due, Decimal::ZERO);
        for detail in &result.breakdown {
            assert_eq!(detail.days_late, 0);
            assert_eq!(detail.late_interest, Decimal::ZERO);
            assert_eq!(detail.effective_rate, Decimal::ZERO);
        }
    }

    #[test]
    fn test_joined_before_every_call() {
        let calc = LateInterestCalculator::new(&fund()).unwrap();
        let lp = Partner::new("Early", d(2022, 1, 1), dec!(1000000), 2);
        let result = calc.compute(&lp, &calls()).unwrap();
        assert!(result.breakdown.is_empty());
        assert_eq!(result.total_catch_up, Decimal::ZERO);
        assert_eq!(result.total_late_interest_due, Decimal::ZERO);
    }

    #[test]
    fn test_empty_prime_history_fails_construction() {
        let assumptions = FundAssumptions::prime("Test Fund", vec![], dec!(2));
        let err = LateInterestCalculator::new(&assumptions).unwrap_err();
        assert!(matches!(err, LateInterestError::Configuration(_)));
    }

    #[test]
    fn test_batch_preserves_order() {
        let calc = LateInterestCalculator::new(&fund()).unwrap();
        let lps = vec![
            Partner::new("Zeta", d(2023, 6, 1), dec!(1000000), 2),
            Partner::new("Alpha", d(2023, 6, 1), dec!(2000000), 2),
        ];
        let results = calc.compute_for_new_lps(&lps, &calls()).unwrap();
        assert_eq!(results[0].partner_name, "Zeta");
        assert_eq!(results[1].partner_name, "Alpha");
        assert_eq!(
            results[1].total_late_interest_due,
            dec!(2) * results[0].total_late_interest_due
        );
    }
}
