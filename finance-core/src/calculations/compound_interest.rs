//! Compound interest projections with recurring deposits.
//!
//! The final balance is the initial principal compounded for every period
//! plus the future value of an ordinary annuity of deposits (paid at the end
//! of each period). Monthly deposits are pooled into one deposit per
//! compounding period, so quarterly compounding receives three months of
//! deposits per quarter.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use finance_core::CompoundingFrequency;
//! use finance_core::calculations::compound_interest::{
//!     CompoundInterestInput, calculate_compound_interest,
//! };
//!
//! let input = CompoundInterestInput {
//!     principal: dec!(10000000),
//!     monthly_deposit: dec!(0),
//!     annual_rate_percent: dec!(5),
//!     years: 3,
//!     frequency: CompoundingFrequency::Annual,
//! };
//!
//! let result = calculate_compound_interest(&input).unwrap();
//!
//! assert_eq!(result.final_balance, dec!(11576250));
//! assert_eq!(result.total_interest, dec!(1576250));
//! ```

use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::CompoundingFrequency;
use crate::calculations::common::{round_half_up, round_won};

/// Longest supported projection.
pub const MAX_YEARS: u32 = 100;

/// Errors that can occur during compound interest calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompoundInterestError {
    #[error("principal must not be negative, got {0}")]
    NegativePrincipal(Decimal),

    #[error("monthly deposit must not be negative, got {0}")]
    NegativeDeposit(Decimal),

    #[error("annual rate must not be negative, got {0}")]
    NegativeRate(Decimal),

    #[error("annual rate must not exceed 100%, got {0}")]
    RateTooHigh(Decimal),

    #[error("term must be at least one year")]
    ZeroYears,

    #[error("term must not exceed 100 years, got {0}")]
    TooManyYears(u32),

    #[error("amounts after {0} years exceed the representable range")]
    Overflow(u32),
}

/// Input values for a savings projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundInterestInput {
    pub principal: Decimal,
    #[serde(default)]
    pub monthly_deposit: Decimal,
    /// Nominal annual rate in percent.
    pub annual_rate_percent: Decimal,
    pub years: u32,
    pub frequency: CompoundingFrequency,
}

impl CompoundInterestInput {
    /// # Errors
    ///
    /// Returns [`CompoundInterestError`] for a negative amount or rate, a
    /// rate above 100%, or a term outside `1..=100` years.
    pub fn validate(&self) -> Result<(), CompoundInterestError> {
        if self.principal < Decimal::ZERO {
            return Err(CompoundInterestError::NegativePrincipal(self.principal));
        }
        if self.monthly_deposit < Decimal::ZERO {
            return Err(CompoundInterestError::NegativeDeposit(self.monthly_deposit));
        }
        if self.annual_rate_percent < Decimal::ZERO {
            return Err(CompoundInterestError::NegativeRate(self.annual_rate_percent));
        }
        if self.annual_rate_percent > Decimal::ONE_HUNDRED {
            return Err(CompoundInterestError::RateTooHigh(self.annual_rate_percent));
        }
        if self.years == 0 {
            return Err(CompoundInterestError::ZeroYears);
        }
        if self.years > MAX_YEARS {
            return Err(CompoundInterestError::TooManyYears(self.years));
        }
        Ok(())
    }
}

/// Cumulative position at the end of one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyBalance {
    pub year: u32,
    pub balance: Decimal,
    /// Principal plus every deposit so far.
    pub contributions: Decimal,
    pub interest: Decimal,
}

/// Result of a savings projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundInterestResult {
    pub final_balance: Decimal,
    pub total_contributions: Decimal,
    pub total_interest: Decimal,
    /// Annual yield after compounding, in percent.
    pub effective_annual_rate_percent: Decimal,
    pub yearly: Vec<YearlyBalance>,
}

/// Projects a savings balance.
///
/// # Errors
///
/// Returns [`CompoundInterestError`] if the input is invalid.
pub fn calculate_compound_interest(
    input: &CompoundInterestInput,
) -> Result<CompoundInterestResult, CompoundInterestError> {
    input.validate()?;

    let periods_per_year = input.frequency.periods_per_year();
    let k = Decimal::from(periods_per_year);
    let period_rate = input.annual_rate_percent / Decimal::ONE_HUNDRED / k;
    let annual_deposits = input
        .monthly_deposit
        .checked_mul(Decimal::from(12))
        .ok_or(CompoundInterestError::Overflow(0))?;
    let period_deposit = annual_deposits / k;

    let yearly = (1..=input.years)
        .map(|year| {
            let periods = year * periods_per_year;
            let balance = future_value(input.principal, period_deposit, period_rate, periods)
                .map(round_won)
                .ok_or(CompoundInterestError::Overflow(year))?;
            let contributions = annual_deposits
                .checked_mul(Decimal::from(year))
                .and_then(|deposits| input.principal.checked_add(deposits))
                .map(round_won)
                .ok_or(CompoundInterestError::Overflow(year))?;
            Ok(YearlyBalance {
                year,
                balance,
                contributions,
                interest: balance - contributions,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let (final_balance, total_contributions) = yearly
        .last()
        .map(|y| (y.balance, y.contributions))
        .unwrap_or_default();

    let effective_annual_rate_percent = round_half_up(
        ((Decimal::ONE + period_rate).powu(u64::from(periods_per_year)) - Decimal::ONE)
            * Decimal::ONE_HUNDRED,
    );

    debug!(
        frequency = input.frequency.as_str(),
        years = input.years,
        final_balance = %final_balance,
        "Projected compound interest"
    );

    Ok(CompoundInterestResult {
        final_balance,
        total_contributions,
        total_interest: final_balance - total_contributions,
        effective_annual_rate_percent,
        yearly,
    })
}

/// `P(1+i)^n + d((1+i)^n − 1)/i`, or `P + d·n` when `i = 0`. Unrounded;
/// `None` on overflow.
fn future_value(
    principal: Decimal,
    deposit: Decimal,
    period_rate: Decimal,
    periods: u32,
) -> Option<Decimal> {
    let n = Decimal::from(periods);
    if period_rate.is_zero() {
        return principal.checked_add(deposit.checked_mul(n)?);
    }
    let growth = (Decimal::ONE + period_rate).checked_powu(u64::from(periods))?;
    let annuity = deposit.checked_mul((growth - Decimal::ONE).checked_div(period_rate)?)?;
    principal.checked_mul(growth)?.checked_add(annuity)
}
