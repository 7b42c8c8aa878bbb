//! Simplified National Pension projection.
//!
//! This is a flat approximation, not the statutory benefit formula: the
//! monthly benefit is average income × the replacement rate, scaled by the
//! share of a full 40-year contribution record. It ignores the A-value
//! (national average income), indexation and survivor benefits.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::TaxYearConfig;
use crate::calculations::common::{MAX_AMOUNT, percent_of, round_won};

/// Earliest and latest age at which benefits may start.
pub const START_AGE_RANGE: std::ops::RangeInclusive<u32> = 60..=70;

/// Errors that can occur during pension projections.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PensionError {
    #[error("average monthly income must not be negative, got {0}")]
    NegativeIncome(Decimal),

    #[error("average monthly income must not exceed {max}, got {0}", max = MAX_AMOUNT)]
    IncomeTooLarge(Decimal),

    #[error("benefit start age must be between 60 and 70, got {0}")]
    StartAgeOutOfRange(u32),
}

/// Input values for a pension projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PensionInput {
    pub average_monthly_income: Decimal,
    pub contribution_years: u32,
    /// Defaults to the configured start age (65).
    #[serde(default)]
    pub start_age: Option<u32>,
}

/// Result of a pension projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PensionResult {
    pub monthly_contribution: Decimal,
    pub total_contributions: Decimal,
    pub monthly_benefit: Decimal,
    /// Benefit over average income, in percent.
    pub replacement_ratio_percent: Option<Decimal>,
    pub start_age: u32,
    pub payout_years: u32,
    /// Benefits from the start age to life expectancy.
    pub lifetime_benefit: Decimal,
    /// Age at which cumulative benefits first cover total contributions,
    /// to one decimal place. `None` when there is no benefit.
    pub break_even_age: Option<Decimal>,
}

/// Calculator for pension projections.
#[derive(Debug, Clone)]
pub struct PensionCalculator<'a> {
    config: &'a TaxYearConfig,
}

impl<'a> PensionCalculator<'a> {
    pub fn new(config: &'a TaxYearConfig) -> Self {
        Self { config }
    }

    /// Projects contributions and benefits.
    ///
    /// # Errors
    ///
    /// Returns [`PensionError`] for income outside `0..=MAX_AMOUNT` or a
    /// start age outside 60 to 70.
    pub fn calculate(
        &self,
        input: &PensionInput,
    ) -> Result<PensionResult, PensionError> {
        let params = &self.config.pension;
        let income = input.average_monthly_income;
        if income < Decimal::ZERO {
            return Err(PensionError::NegativeIncome(income));
        }
        if income > MAX_AMOUNT {
            return Err(PensionError::IncomeTooLarge(income));
        }
        let start_age = input.start_age.unwrap_or(params.default_start_age);
        if !START_AGE_RANGE.contains(&start_age) {
            return Err(PensionError::StartAgeOutOfRange(start_age));
        }

        let monthly_contribution = round_won(income * params.contribution_rate);
        let total_contributions =
            monthly_contribution * Decimal::from(12) * Decimal::from(input.contribution_years);

        let record_share = (Decimal::from(input.contribution_years)
            / Decimal::from(params.full_contribution_years))
        .min(Decimal::ONE);
        let monthly_benefit = round_won(income * params.replacement_rate * record_share);

        let payout_years = params.life_expectancy.saturating_sub(start_age);
        let lifetime_benefit = monthly_benefit * Decimal::from(12) * Decimal::from(payout_years);

        Ok(PensionResult {
            monthly_contribution,
            total_contributions,
            monthly_benefit,
            replacement_ratio_percent: percent_of(monthly_benefit, income),
            start_age,
            payout_years,
            lifetime_benefit,
            break_even_age: self.break_even_age(start_age, total_contributions, monthly_benefit),
        })
    }

    fn break_even_age(
        &self,
        start_age: u32,
        total_contributions: Decimal,
        monthly_benefit: Decimal,
    ) -> Option<Decimal> {
        if monthly_benefit <= Decimal::ZERO {
            return None;
        }
        let months = (total_contributions / monthly_benefit).ceil();
        let age = Decimal::from(start_age) + months / Decimal::from(12);
        Some(age.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
    }
}

/// Projects a pension with the built-in parameters.
///
/// # Errors
///
/// See [`PensionCalculator::calculate`].
pub fn calculate_pension(input: &PensionInput) -> Result<PensionResult, PensionError> {
    let config = TaxYearConfig::default();
    PensionCalculator::new(&config).calculate(input)
}
