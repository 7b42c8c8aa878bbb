//! Severance pay and retirement income tax.
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Tenure in days (end date − start date) |
//! | 2    | Severance pay: average monthly salary ÷ 30 × 30 × tenure ÷ 365, zero under one year |
//! | 3    | Service-year deduction over whole service years, partial years rounded up |
//! | 4    | Annualized base: (pay − deduction) ÷ 12 |
//! | 5    | Progressive tax on the annualized base, less a capped credit |
//! | 6    | Retirement income tax: step 5 × 12; local income tax 10% |
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use finance_core::calculations::severance::{SeveranceInput, calculate_severance};
//!
//! let input = SeveranceInput {
//!     start_date: NaiveDate::from_ymd_opt(2015, 3, 1).unwrap(),
//!     end_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
//!     average_monthly_salary: dec!(4000000),
//! };
//!
//! let result = calculate_severance(&input).unwrap();
//!
//! assert_eq!(result.tenure_days, 3653);
//! assert_eq!(result.severance_pay, dec!(40032877));
//! assert_eq!(result.retirement_income_tax, dec!(1284372));
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::calculations::common::{MAX_AMOUNT, max, percent_of, round_won};
use crate::{TaxBracketTable, TaxYearConfig};

/// Errors that can occur during severance calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeveranceError {
    #[error("end date {end} must be after start date {start}")]
    EndNotAfterStart { start: NaiveDate, end: NaiveDate },

    #[error("average monthly salary must not be negative, got {0}")]
    NegativeSalary(Decimal),

    #[error("average monthly salary must not exceed {max}, got {0}", max = MAX_AMOUNT)]
    SalaryTooLarge(Decimal),
}

/// Input values for a severance calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeveranceInput {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Average of the last three months' pay.
    pub average_monthly_salary: Decimal,
}

/// Result of a severance calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeveranceResult {
    pub tenure_days: i64,
    pub eligible: bool,
    /// Rounded to the won; pay is computed from the exact value.
    pub daily_wage: Decimal,
    pub severance_pay: Decimal,
    /// Tenure in years with any partial year counted as a whole one.
    pub service_years: u32,
    pub service_year_deduction: Decimal,
    /// Rounded to the won; the annualized tax uses the exact value.
    pub annualized_base: Decimal,
    pub annualized_tax: Decimal,
    pub annualized_tax_credit: Decimal,
    pub retirement_income_tax: Decimal,
    pub local_income_tax: Decimal,
    pub net_severance_pay: Decimal,
    /// Both taxes over severance pay, in percent.
    pub effective_tax_rate: Option<Decimal>,
}

/// Calculator for severance pay.
#[derive(Debug, Clone)]
pub struct SeveranceCalculator<'a> {
    config: &'a TaxYearConfig,
    brackets: &'a TaxBracketTable,
}

impl<'a> SeveranceCalculator<'a> {
    /// `brackets` is the retirement income schedule.
    pub fn new(
        config: &'a TaxYearConfig,
        brackets: &'a TaxBracketTable,
    ) -> Self {
        Self { config, brackets }
    }

    /// Calculates severance pay and the tax on it.
    ///
    /// Tenure under 365 days is not an error: the result is ineligible and
    /// every amount is zero.
    ///
    /// # Errors
    ///
    /// Returns [`SeveranceError`] if the end date is not after the start
    /// date or the salary is outside `0..=MAX_AMOUNT`.
    pub fn calculate(
        &self,
        input: &SeveranceInput,
    ) -> Result<SeveranceResult, SeveranceError> {
        if input.end_date <= input.start_date {
            return Err(SeveranceError::EndNotAfterStart {
                start: input.start_date,
                end: input.end_date,
            });
        }
        if input.average_monthly_salary < Decimal::ZERO {
            return Err(SeveranceError::NegativeSalary(input.average_monthly_salary));
        }
        if input.average_monthly_salary > MAX_AMOUNT {
            return Err(SeveranceError::SalaryTooLarge(input.average_monthly_salary));
        }

        let params = &self.config.severance;
        let tenure_days = input.end_date.signed_duration_since(input.start_date).num_days();
        let eligible = tenure_days >= params.eligibility_days;
        let daily_wage = input.average_monthly_salary / Decimal::from(30);

        if !eligible {
            warn!(
                tenure_days = tenure_days,
                required_days = params.eligibility_days,
                "Tenure too short for severance pay"
            );
            return Ok(SeveranceResult {
                tenure_days,
                eligible,
                daily_wage: round_won(daily_wage),
                severance_pay: Decimal::ZERO,
                service_years: 0,
                service_year_deduction: Decimal::ZERO,
                annualized_base: Decimal::ZERO,
                annualized_tax: Decimal::ZERO,
                annualized_tax_credit: Decimal::ZERO,
                retirement_income_tax: Decimal::ZERO,
                local_income_tax: Decimal::ZERO,
                net_severance_pay: Decimal::ZERO,
                effective_tax_rate: None,
            });
        }

        let severance_pay = round_won(
            daily_wage * Decimal::from(30) * Decimal::from(tenure_days) / Decimal::from(365),
        );

        // Partial years count in full.
        let service_years = u32::try_from((tenure_days + 364) / 365).unwrap_or(u32::MAX);
        let service_year_deduction = params
            .service_year_deduction
            .amount(Decimal::from(service_years));

        let annualized_base =
            max(severance_pay - service_year_deduction, Decimal::ZERO) / Decimal::from(12);
        let annualized_tax = round_won(self.brackets.tax(annualized_base));
        let annualized_tax_credit =
            round_won((annualized_tax * params.tax_credit_rate).min(params.tax_credit_cap));

        let retirement_income_tax = (annualized_tax - annualized_tax_credit) * Decimal::from(12);
        let local_income_tax = round_won(retirement_income_tax * self.config.local_income_tax_rate);

        Ok(SeveranceResult {
            tenure_days,
            eligible,
            daily_wage: round_won(daily_wage),
            severance_pay,
            service_years,
            service_year_deduction,
            annualized_base: round_won(annualized_base),
            annualized_tax,
            annualized_tax_credit,
            retirement_income_tax,
            local_income_tax,
            net_severance_pay: severance_pay - retirement_income_tax - local_income_tax,
            effective_tax_rate: percent_of(retirement_income_tax + local_income_tax, severance_pay),
        })
    }
}

/// Calculates severance with the built-in 2025 rates.
///
/// # Errors
///
/// See [`SeveranceCalculator::calculate`].
pub fn calculate_severance(input: &SeveranceInput) -> Result<SeveranceResult, SeveranceError> {
    let config = TaxYearConfig::default();
    let brackets = TaxBracketTable::retirement_income_2025();
    SeveranceCalculator::new(&config, &brackets).calculate(input)
}
