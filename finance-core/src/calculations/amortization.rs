//! Loan amortization schedules.
//!
//! Schedules are built in whole won. The level payment (equal-payment
//! method) or the level principal portion (equal-principal method) and each
//! period's interest are rounded to the won, and the final period absorbs
//! whatever residual remains. As a result the principal portions always sum
//! to the original principal exactly and the last remaining balance is 0.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use finance_core::RepaymentMethod;
//! use finance_core::calculations::amortization::{LoanInput, build_schedule};
//!
//! let input = LoanInput {
//!     principal: dec!(100000000),
//!     annual_rate_percent: dec!(5),
//!     term_months: 12,
//!     method: RepaymentMethod::EqualPayment,
//! };
//!
//! let schedule = build_schedule(&input).unwrap();
//!
//! assert_eq!(schedule.entries.len(), 12);
//! assert_eq!(schedule.first_payment, dec!(8560748));
//! assert_eq!(schedule.entries[11].remaining_balance, dec!(0));
//! ```

use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::RepaymentMethod;
use crate::calculations::common::{MAX_AMOUNT, max, round_won};

/// Longest supported term: 50 years.
pub const MAX_TERM_MONTHS: u32 = 600;

/// Highest supported annual rate, in percent.
pub const MAX_ANNUAL_RATE_PERCENT: Decimal = Decimal::ONE_HUNDRED;

/// Errors that can occur when building a schedule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmortizationError {
    #[error("principal must not be negative, got {0}")]
    NegativePrincipal(Decimal),

    #[error("principal must not exceed {max}, got {0}", max = MAX_AMOUNT)]
    PrincipalTooLarge(Decimal),

    #[error("annual rate must not be negative, got {0}")]
    NegativeRate(Decimal),

    #[error("annual rate must not exceed 100%, got {0}")]
    RateTooHigh(Decimal),

    #[error("term must be at least one month")]
    ZeroTerm,

    #[error("term must not exceed 600 months, got {0}")]
    TermTooLong(u32),
}

/// Loan terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanInput {
    pub principal: Decimal,
    /// Nominal annual rate in percent (5 for 5%).
    pub annual_rate_percent: Decimal,
    pub term_months: u32,
    pub method: RepaymentMethod,
}

impl LoanInput {
    /// Validates the terms.
    ///
    /// # Errors
    ///
    /// Returns [`AmortizationError`] for a principal outside
    /// `0..=MAX_AMOUNT`, a negative rate or one above 100%, or a term outside
    /// `1..=600` months.
    pub fn validate(&self) -> Result<(), AmortizationError> {
        if self.principal < Decimal::ZERO {
            return Err(AmortizationError::NegativePrincipal(self.principal));
        }
        if self.principal > MAX_AMOUNT {
            return Err(AmortizationError::PrincipalTooLarge(self.principal));
        }
        validate_rate(self.annual_rate_percent)?;
        if self.term_months == 0 {
            return Err(AmortizationError::ZeroTerm);
        }
        if self.term_months > MAX_TERM_MONTHS {
            return Err(AmortizationError::TermTooLong(self.term_months));
        }
        Ok(())
    }
}

pub(crate) fn validate_rate(annual_rate_percent: Decimal) -> Result<(), AmortizationError> {
    if annual_rate_percent < Decimal::ZERO {
        return Err(AmortizationError::NegativeRate(annual_rate_percent));
    }
    if annual_rate_percent > MAX_ANNUAL_RATE_PERCENT {
        return Err(AmortizationError::RateTooHigh(annual_rate_percent));
    }
    Ok(())
}

/// One period of a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// 1-based period number.
    pub period: u32,
    pub principal_portion: Decimal,
    pub interest_portion: Decimal,
    pub total_payment: Decimal,
    pub remaining_balance: Decimal,
}

/// A complete repayment schedule with its totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub method: RepaymentMethod,
    /// Principal rounded to the won.
    pub principal: Decimal,
    pub monthly_rate: Decimal,
    pub entries: Vec<ScheduleEntry>,
    /// Payment due in the first period.
    pub first_payment: Decimal,
    /// Payment due in the final period, which absorbs rounding residue.
    pub last_payment: Decimal,
    pub total_payment: Decimal,
    /// Always `total_payment − principal`.
    pub total_interest: Decimal,
}

/// Converts a nominal annual percentage into a monthly fraction.
pub fn monthly_rate(annual_rate_percent: Decimal) -> Decimal {
    annual_rate_percent / Decimal::ONE_HUNDRED / Decimal::from(12)
}

/// Level annuity payment `P·r·(1+r)^n / ((1+r)^n − 1)`, or `P / n` when `r = 0`.
/// Unrounded.
pub fn level_payment(
    principal: Decimal,
    monthly_rate: Decimal,
    months: u32,
) -> Decimal {
    let n = Decimal::from(months);
    if monthly_rate.is_zero() {
        return principal / n;
    }
    match (Decimal::ONE + monthly_rate).checked_powu(u64::from(months)) {
        Some(growth) => principal * (monthly_rate * growth / (growth - Decimal::ONE)),
        // Growth beyond Decimal's range: the annuity factor has converged to r.
        None => principal * monthly_rate,
    }
}

/// Payment due in the first period for either method. Unrounded.
pub fn first_payment(
    principal: Decimal,
    monthly_rate: Decimal,
    months: u32,
    method: RepaymentMethod,
) -> Decimal {
    match method {
        RepaymentMethod::EqualPayment => level_payment(principal, monthly_rate, months),
        RepaymentMethod::EqualPrincipal => {
            principal / Decimal::from(months) + principal * monthly_rate
        }
    }
}

/// Largest principal whose first-period payment does not exceed `payment`.
///
/// This inverts [`first_payment`]: the annuity formula for the
/// equal-payment method, and `payment / (1/n + r)` for equal principal.
/// Unrounded; a non-positive payment yields zero.
pub fn max_principal_for_payment(
    payment: Decimal,
    monthly_rate: Decimal,
    months: u32,
    method: RepaymentMethod,
) -> Decimal {
    if payment <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let n = Decimal::from(months);
    match method {
        RepaymentMethod::EqualPayment if monthly_rate.is_zero() => payment * n,
        RepaymentMethod::EqualPayment => {
            match (Decimal::ONE + monthly_rate).checked_powu(u64::from(months)) {
                Some(growth) => payment * ((growth - Decimal::ONE) / (monthly_rate * growth)),
                None => payment / monthly_rate,
            }
        }
        RepaymentMethod::EqualPrincipal => payment / (Decimal::ONE / n + monthly_rate),
    }
}

/// Builds the full schedule for `input`.
///
/// # Errors
///
/// Returns [`AmortizationError`] if the terms are invalid.
pub fn build_schedule(input: &LoanInput) -> Result<AmortizationSchedule, AmortizationError> {
    input.validate()?;

    let principal = round_won(input.principal);
    let rate = monthly_rate(input.annual_rate_percent);
    let months = input.term_months;

    let entries = match input.method {
        RepaymentMethod::EqualPayment => equal_payment_entries(principal, rate, months),
        RepaymentMethod::EqualPrincipal => equal_principal_entries(principal, rate, months),
    };

    let total_payment: Decimal = entries.iter().map(|e| e.total_payment).sum();
    let first = entries.first().map(|e| e.total_payment).unwrap_or_default();
    let last = entries.last().map(|e| e.total_payment).unwrap_or_default();

    debug!(
        method = input.method.as_str(),
        principal = %principal,
        months = months,
        total_payment = %total_payment,
        "Built amortization schedule"
    );

    Ok(AmortizationSchedule {
        method: input.method,
        principal,
        monthly_rate: rate,
        entries,
        first_payment: first,
        last_payment: last,
        total_payment,
        total_interest: total_payment - principal,
    })
}

fn equal_payment_entries(
    principal: Decimal,
    rate: Decimal,
    months: u32,
) -> Vec<ScheduleEntry> {
    let payment = round_won(level_payment(principal, rate, months));
    amortize(principal, rate, months, |_, interest| payment - interest)
}

fn equal_principal_entries(
    principal: Decimal,
    rate: Decimal,
    months: u32,
) -> Vec<ScheduleEntry> {
    let portion = round_won(principal / Decimal::from(months));
    amortize(principal, rate, months, |_, _| portion)
}

/// Runs the balance recurrence. `scheduled_principal` proposes each
/// period's principal portion; it is clamped to `[0, balance]` and the final
/// period always repays the full remaining balance.
fn amortize<F>(
    principal: Decimal,
    rate: Decimal,
    months: u32,
    scheduled_principal: F,
) -> Vec<ScheduleEntry>
where
    F: Fn(Decimal, Decimal) -> Decimal,
{
    let mut entries = Vec::with_capacity(months as usize);
    let mut balance = principal;

    for period in 1..=months {
        let interest = round_won(balance * rate);
        let principal_portion = if period == months {
            balance
        } else {
            max(scheduled_principal(balance, interest), Decimal::ZERO).min(balance)
        };
        balance -= principal_portion;

        entries.push(ScheduleEntry {
            period,
            principal_portion,
            interest_portion: interest,
            total_payment: principal_portion + interest,
            remaining_balance: balance,
        });
    }

    entries
}
