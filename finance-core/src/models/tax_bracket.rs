//! Progressive tax bracket tables.
//!
//! A [`TaxBracketTable`] is an ordered list of [`TaxBracket`]s whose upper
//! limits ascend and whose last bracket is unbounded. Every table, whether
//! compiled in or loaded from a file, is validated on construction and
//! carries the cumulative deduction of each bracket, so tax can be computed
//! either by summing marginal slices ([`TaxBracketTable::tax`]) or by the
//! "rate minus deduction" shortcut ([`TaxBracketTable::tax_by_deduction`]).
//! Both give the same answer for every income.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use finance_core::TaxBracketTable;
//!
//! let table = TaxBracketTable::income_tax_2025();
//!
//! // 14M at 6% + 36M at 15% + 20M at 24%
//! assert_eq!(table.tax(dec!(70000000)), dec!(11040000));
//! assert_eq!(table.tax_by_deduction(dec!(70000000)), dec!(11040000));
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors describing a malformed bracket table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketTableError {
    #[error("bracket table is empty")]
    Empty,

    #[error("bracket {index} has negative rate {rate}")]
    NegativeRate { index: usize, rate: Decimal },

    #[error("bracket {index} has rate {rate} above 100%")]
    RateAboveOne { index: usize, rate: Decimal },

    #[error("bracket {index} rate {rate} is lower than the previous bracket's rate")]
    RegressiveRate { index: usize, rate: Decimal },

    #[error("bracket {index} upper limit {limit} does not exceed the previous limit")]
    NonAscendingLimit { index: usize, limit: Decimal },

    #[error("bracket {0} is unbounded but is not the last bracket")]
    UnboundedBeforeLast(usize),

    #[error("last bracket must be unbounded, found upper limit {0}")]
    BoundedLastBracket(Decimal),

    #[error("bracket {index} cumulative deduction {actual} does not match derived value {expected}")]
    DeductionMismatch {
        index: usize,
        expected: Decimal,
        actual: Decimal,
    },
}

/// One slice of a progressive schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Inclusive upper limit of the slice; `None` for the top bracket.
    pub upper_limit: Option<Decimal>,

    /// Marginal rate as a fraction (0.15 for 15%).
    pub rate: Decimal,

    /// Amount subtracted from `income × rate` when this is the top bracket
    /// reached. Derived from the schedule when omitted.
    #[serde(default)]
    pub cumulative_deduction: Option<Decimal>,
}

impl TaxBracket {
    pub fn new(
        upper_limit: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self {
            upper_limit,
            rate,
            cumulative_deduction: None,
        }
    }

    pub fn with_deduction(
        upper_limit: Option<Decimal>,
        rate: Decimal,
        cumulative_deduction: Decimal,
    ) -> Self {
        Self {
            upper_limit,
            rate,
            cumulative_deduction: Some(cumulative_deduction),
        }
    }
}

/// 2025 progressive schedule: (upper limit, rate, cumulative deduction).
const PROGRESSIVE_SCHEDULE_2025: [(Option<Decimal>, Decimal, Decimal); 8] = [
    (Some(dec!(14000000)), dec!(0.06), dec!(0)),
    (Some(dec!(50000000)), dec!(0.15), dec!(1260000)),
    (Some(dec!(88000000)), dec!(0.24), dec!(5760000)),
    (Some(dec!(150000000)), dec!(0.35), dec!(15440000)),
    (Some(dec!(300000000)), dec!(0.38), dec!(19940000)),
    (Some(dec!(500000000)), dec!(0.40), dec!(25940000)),
    (Some(dec!(1000000000)), dec!(0.42), dec!(35940000)),
    (None, dec!(0.45), dec!(65940000)),
];

/// A validated progressive bracket table.
///
/// Invariants upheld by every instance:
/// - at least one bracket
/// - upper limits strictly ascending, the last one unbounded
/// - rates within `[0, 1]` and non-decreasing
/// - every bracket carries a cumulative deduction consistent with the
///   marginal schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct TaxBracketTable {
    brackets: Vec<TaxBracket>,
}

impl TaxBracketTable {
    /// Builds a table, returning an error if the brackets are malformed.
    ///
    /// Missing cumulative deductions are derived; supplied ones must match
    /// the derived value exactly.
    ///
    /// # Errors
    ///
    /// Returns [`BracketTableError`] describing the first violated invariant.
    pub fn try_new(mut brackets: Vec<TaxBracket>) -> Result<Self, BracketTableError> {
        if brackets.is_empty() {
            return Err(BracketTableError::Empty);
        }

        let last = brackets.len() - 1;
        let mut lower = Decimal::ZERO;
        let mut tax_at_lower = Decimal::ZERO;
        let mut previous_rate = Decimal::ZERO;

        for (index, bracket) in brackets.iter_mut().enumerate() {
            let rate = bracket.rate;
            if rate < Decimal::ZERO {
                return Err(BracketTableError::NegativeRate { index, rate });
            }
            if rate > Decimal::ONE {
                return Err(BracketTableError::RateAboveOne { index, rate });
            }
            if rate < previous_rate {
                return Err(BracketTableError::RegressiveRate { index, rate });
            }

            match bracket.upper_limit {
                Some(limit) if index == last => {
                    return Err(BracketTableError::BoundedLastBracket(limit));
                }
                Some(limit) if limit <= lower => {
                    return Err(BracketTableError::NonAscendingLimit { index, limit });
                }
                None if index != last => {
                    return Err(BracketTableError::UnboundedBeforeLast(index));
                }
                _ => {}
            }

            let expected = rate * lower - tax_at_lower;
            if let Some(actual) = bracket.cumulative_deduction {
                if actual != expected {
                    return Err(BracketTableError::DeductionMismatch {
                        index,
                        expected,
                        actual,
                    });
                }
            }
            bracket.cumulative_deduction = Some(expected);

            if let Some(limit) = bracket.upper_limit {
                tax_at_lower += rate * (limit - lower);
                lower = limit;
            }
            previous_rate = rate;
        }

        Ok(Self { brackets })
    }

    /// Builds a table from brackets known to be well formed.
    ///
    /// # Panics
    ///
    /// Panics if the brackets violate any table invariant. A malformed
    /// compiled-in schedule is a programming error.
    pub fn new(brackets: Vec<TaxBracket>) -> Self {
        Self::try_new(brackets).unwrap_or_else(|e| panic!("invalid tax bracket table: {e}"))
    }

    /// The 2025 comprehensive/earned income tax schedule (6% to 45%).
    pub fn income_tax_2025() -> Self {
        Self::from_schedule(&PROGRESSIVE_SCHEDULE_2025)
    }

    /// The 2025 schedule applied to annualized retirement income.
    pub fn retirement_income_2025() -> Self {
        Self::from_schedule(&PROGRESSIVE_SCHEDULE_2025)
    }

    fn from_schedule(schedule: &[(Option<Decimal>, Decimal, Decimal)]) -> Self {
        Self::new(
            schedule
                .iter()
                .map(|&(limit, rate, deduction)| TaxBracket::with_deduction(limit, rate, deduction))
                .collect(),
        )
    }

    /// The validated brackets, each with its cumulative deduction filled in.
    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Returns a copy of this table with every rate multiplied by `factor`.
    ///
    /// Used for surcharged schedules such as the multi-home capital gains rate.
    ///
    /// # Errors
    ///
    /// Returns [`BracketTableError`] if the scaled rates leave `[0, 1]`.
    pub fn scaled(
        &self,
        factor: Decimal,
    ) -> Result<Self, BracketTableError> {
        Self::try_new(
            self.brackets
                .iter()
                .map(|b| TaxBracket::new(b.upper_limit, b.rate * factor))
                .collect(),
        )
    }

    /// Total tax by summing each bracket's rate over the slice of income it
    /// covers. Unrounded; income of zero or less yields zero.
    pub fn tax(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        if taxable_income <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let mut remaining = taxable_income;
        let mut lower = Decimal::ZERO;
        let mut tax = Decimal::ZERO;

        for bracket in &self.brackets {
            let slice = match bracket.upper_limit {
                Some(limit) => remaining.min(limit - lower),
                None => remaining,
            };
            tax += slice * bracket.rate;
            remaining -= slice;

            if remaining <= Decimal::ZERO {
                break;
            }
            if let Some(limit) = bracket.upper_limit {
                lower = limit;
            }
        }

        tax
    }

    /// Total tax via the applicable bracket: `income × rate − deduction`.
    /// Unrounded; income of zero or less yields zero.
    pub fn tax_by_deduction(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        if taxable_income <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let bracket = &self.brackets[self.bracket_index(taxable_income)];
        taxable_income * bracket.rate - bracket.cumulative_deduction.unwrap_or_default()
    }

    /// Index of the bracket containing the last won of `taxable_income`.
    pub fn bracket_index(
        &self,
        taxable_income: Decimal,
    ) -> usize {
        self.brackets
            .iter()
            .position(|b| b.upper_limit.is_none_or(|limit| taxable_income <= limit))
            .unwrap_or(self.brackets.len() - 1)
    }

    /// Marginal rate applied to the next won above `taxable_income`'s bracket floor.
    pub fn marginal_rate(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        self.brackets[self.bracket_index(taxable_income)].rate
    }

    /// Rate of the unbounded top bracket.
    pub fn top_rate(&self) -> Decimal {
        self.brackets[self.brackets.len() - 1].rate
    }
}

impl TryFrom<Vec<TaxBracket>> for TaxBracketTable {
    type Error = BracketTableError;

    fn try_from(brackets: Vec<TaxBracket>) -> Result<Self, Self::Error> {
        Self::try_new(brackets)
    }
}

impl From<TaxBracketTable> for Vec<TaxBracket> {
    fn from(table: TaxBracketTable) -> Self {
        table.brackets
    }
}
