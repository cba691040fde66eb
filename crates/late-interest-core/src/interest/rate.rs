use chrono::NaiveDate;

use crate::error::LateInterestError;
use crate::model::{RateBasis, RateChange};
use crate::types::Percent;
use crate::LateInterestResult;

/// Resolves the annual late-interest rate in effect on a given date.
///
/// Only constructible through [`flat`](Self::flat), [`variable`](Self::variable)
/// or [`from_basis`](Self::from_basis), so a variable resolver always holds a
/// non-empty history.
#[derive(Debug, Clone, PartialEq)]
pub struct RateResolver {
    kind: ResolverKind,
}

#[derive(Debug, Clone, PartialEq)]
enum ResolverKind {
    Flat(Percent),
    Variable {
        /// Sorted by effective date ascending, one entry per date
        history: Vec<RateChange>,
        spread: Percent,
    },
}

impl RateResolver {
    pub fn flat(rate: Percent) -> Self {
        Self {
            kind: ResolverKind::Flat(rate),
        }
    }

    /// Base-rate history plus spread. The history may arrive in any order;
    /// when two entries share an effective date the first one given is kept.
    pub fn variable(history: &[RateChange], spread: Percent) -> LateInterestResult<Self> {
        if history.is_empty() {
            return Err(LateInterestError::Configuration(
                "No rate history available for variable-rate calculation".into(),
            ));
        }
        let mut sorted = history.to_vec();
        sorted.sort_by_key(|rc| rc.effective_date);
        sorted.dedup_by_key(|rc| rc.effective_date);
        Ok(Self {
            kind: ResolverKind::Variable {
                history: sorted,
                spread,
            },
        })
    }

    pub fn from_basis(basis: &RateBasis) -> LateInterestResult<Self> {
        match basis {
            RateBasis::Prime {
                spread,
                rate_history,
            } => Self::variable(rate_history, *spread),
            RateBasis::Flat { rate } => Ok(Self::flat(*rate)),
        }
    }

    /// The configured rate when the resolver is flat.
    pub fn flat_rate(&self) -> Option<Percent> {
        match self.kind {
            ResolverKind::Flat(rate) => Some(rate),
            ResolverKind::Variable { .. } => None,
        }
    }

    /// Rate (percent) in effect on `date`.
    ///
    /// Uses the latest change effective on or before `date`. Dates before the
    /// first recorded change fall back to the earliest rate.
    pub fn rate_at(&self, date: NaiveDate) -> Percent {
        match &self.kind {
            ResolverKind::Flat(rate) => *rate,
            ResolverKind::Variable { history, spread } => {
                let idx = history
                    .partition_point(|rc| rc.effective_date <= date)
                    .max(1);
                // history is non-empty by construction
                history[idx - 1].rate + *spread
            }
        }
    }

    /// Rate-change dates with `start < date <= end`, ascending.
    pub fn boundaries_within(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        match &self.kind {
            ResolverKind::Flat(_) => Vec::new(),
            ResolverKind::Variable { history, .. } => history
                .iter()
                .map(|rc| rc.effective_date)
                .filter(|d| start < *d && *d <= end)
                .collect(),
        }
    }
}
