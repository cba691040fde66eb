use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LateInterestError;
use crate::types::{Money, Percent};
use crate::LateInterestResult;

/// A limited partner admitted at a given close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    /// Unique within a run
    pub name: String,
    /// Admission date; late interest runs up to and including this day
    pub issue_date: NaiveDate,
    pub commitment: Money,
    /// 1 for the initial close, 2+ for subsequent closes
    pub close_number: u32,
}

impl Partner {
    pub fn new(
        name: impl Into<String>,
        issue_date: NaiveDate,
        commitment: Money,
        close_number: u32,
    ) -> Self {
        Self {
            name: name.into(),
            issue_date,
            commitment,
            close_number,
        }
    }

    /// Synthetic partner carrying only the increase of an existing partner's
    /// commitment at a later close.
    ///
    /// The existing record keeps the partner in the allocation pool, this one
    /// makes them pay late interest on the delta. Pair it with an entry in the
    /// commitment-increase map (`name -> original commitment`) so allocations
    /// use the pre-increase commitment.
    pub fn increase_tranche(
        &self,
        new_commitment: Money,
        close_number: u32,
        issue_date: NaiveDate,
    ) -> LateInterestResult<Partner> {
        if new_commitment <= self.commitment {
            return Err(LateInterestError::InvalidInput {
                field: "new_commitment".into(),
                reason: format!(
                    "Increase for '{}' must exceed the current commitment of {}",
                    self.name, self.commitment
                ),
            });
        }
        if close_number <= self.close_number {
            return Err(LateInterestError::InvalidInput {
                field: "close_number".into(),
                reason: format!(
                    "Increase for '{}' must be admitted after close {}",
                    self.name, self.close_number
                ),
            });
        }
        Ok(Partner {
            name: format!("{} (increase)", self.name),
            issue_date,
            commitment: new_commitment - self.commitment,
            close_number,
        })
    }
}

/// A capital call issued to all partners admitted at the time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalCall {
    pub call_number: u32,
    pub due_date: NaiveDate,
    /// Percent of commitment called, 0-100
    pub call_percentage: Percent,
}

impl CapitalCall {
    pub fn new(call_number: u32, due_date: NaiveDate, call_percentage: Percent) -> Self {
        Self {
            call_number,
            due_date,
            call_percentage,
        }
    }

    /// Capital this call draws from the given commitment.
    pub fn call_amount(&self, commitment: Money) -> Money {
        commitment * self.call_percentage / dec!(100)
    }

    pub(crate) fn validate(&self) -> LateInterestResult<()> {
        if self.call_percentage < Decimal::ZERO || self.call_percentage > dec!(100) {
            return Err(LateInterestError::InvalidInput {
                field: format!("capital_calls[{}].call_percentage", self.call_number),
                reason: "Call percentage must be between 0 and 100".into(),
            });
        }
        Ok(())
    }
}
