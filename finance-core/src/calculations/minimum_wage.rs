//! Minimum wage compliance and monthly wage conversion.
//!
//! Working 15 or more hours a week earns paid weekly holiday time,
//! proportional to weekly hours (8 hours at 40), capped at 8. Monthly
//! figures use 365 / 7 / 12 weeks per month.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::TaxYearConfig;
use crate::calculations::common::{MAX_AMOUNT, max, round_won};

/// Weekly hours at which paid weekly holiday starts.
const HOLIDAY_THRESHOLD_HOURS: u32 = 15;
const FULL_TIME_WEEKLY_HOURS: u32 = 40;
const HOLIDAY_HOURS_CAP: u32 = 8;
const HOURS_PER_WEEK: u32 = 168;

/// Errors that can occur during minimum wage calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MinimumWageError {
    #[error("no minimum wage configured for {0}")]
    UnknownYear(i32),

    #[error("hourly wage must not be negative, got {0}")]
    NegativeWage(Decimal),

    #[error("hourly wage must not exceed {max}, got {0}", max = MAX_AMOUNT)]
    WageTooLarge(Decimal),

    #[error("weekly hours must be greater than 0 and at most 168, got {0}")]
    WeeklyHoursOutOfRange(Decimal),
}

/// Input values for a minimum wage check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimumWageInput {
    pub hourly_wage: Decimal,
    pub weekly_hours: Decimal,
    pub year: i32,
}

/// Result of a minimum wage check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimumWageResult {
    pub year: i32,
    pub hourly_wage: Decimal,
    pub statutory_hourly_minimum: Decimal,
    pub weekly_holiday_hours: Decimal,
    /// Worked plus paid holiday hours per month.
    pub monthly_paid_hours: Decimal,
    pub monthly_wage: Decimal,
    /// Hourly minimum × statutory monthly hours (209).
    pub statutory_monthly_minimum: Decimal,
    pub compliant: bool,
    /// Amount per hour below the minimum; zero when compliant.
    pub hourly_shortfall: Decimal,
}

/// Calculator for minimum wage checks.
#[derive(Debug, Clone)]
pub struct MinimumWageCalculator<'a> {
    config: &'a TaxYearConfig,
}

impl<'a> MinimumWageCalculator<'a> {
    pub fn new(config: &'a TaxYearConfig) -> Self {
        Self { config }
    }

    /// # Errors
    ///
    /// Returns [`MinimumWageError`] for a year with no configured rate, a
    /// wage outside `0..=MAX_AMOUNT`, or weekly hours outside `(0, 168]`.
    pub fn calculate(
        &self,
        input: &MinimumWageInput,
    ) -> Result<MinimumWageResult, MinimumWageError> {
        let table = &self.config.minimum_wage;
        let statutory_hourly_minimum = table
            .hourly_for(input.year)
            .ok_or(MinimumWageError::UnknownYear(input.year))?;
        if input.hourly_wage < Decimal::ZERO {
            return Err(MinimumWageError::NegativeWage(input.hourly_wage));
        }
        if input.hourly_wage > MAX_AMOUNT {
            return Err(MinimumWageError::WageTooLarge(input.hourly_wage));
        }
        if input.weekly_hours <= Decimal::ZERO || input.weekly_hours > Decimal::from(HOURS_PER_WEEK)
        {
            return Err(MinimumWageError::WeeklyHoursOutOfRange(input.weekly_hours));
        }

        let weekly_holiday_hours = weekly_holiday_hours(input.weekly_hours);
        let monthly_paid_hours = (input.weekly_hours + weekly_holiday_hours) * weeks_per_month();
        let monthly_wage = round_won(input.hourly_wage * monthly_paid_hours);

        let compliant = input.hourly_wage >= statutory_hourly_minimum;
        if !compliant {
            warn!(
                year = input.year,
                hourly_wage = %input.hourly_wage,
                minimum = %statutory_hourly_minimum,
                "Hourly wage is below the statutory minimum"
            );
        }

        Ok(MinimumWageResult {
            year: input.year,
            hourly_wage: input.hourly_wage,
            statutory_hourly_minimum,
            weekly_holiday_hours,
            monthly_paid_hours,
            monthly_wage,
            statutory_monthly_minimum: statutory_hourly_minimum * table.statutory_monthly_hours,
            compliant,
            hourly_shortfall: max(statutory_hourly_minimum - input.hourly_wage, Decimal::ZERO),
        })
    }

    /// Configured hourly minimum for every year, oldest first.
    pub fn rates(&self) -> Vec<(i32, Decimal)> {
        let mut rates: Vec<(i32, Decimal)> = self
            .config
            .minimum_wage
            .rates
            .iter()
            .map(|r| (r.year, r.hourly))
            .collect();
        rates.sort_by_key(|&(year, _)| year);
        rates
    }
}

fn weekly_holiday_hours(weekly_hours: Decimal) -> Decimal {
    if weekly_hours < Decimal::from(HOLIDAY_THRESHOLD_HOURS) {
        return Decimal::ZERO;
    }
    (weekly_hours / Decimal::from(FULL_TIME_WEEKLY_HOURS) * Decimal::from(HOLIDAY_HOURS_CAP))
        .min(Decimal::from(HOLIDAY_HOURS_CAP))
}

fn weeks_per_month() -> Decimal {
    Decimal::from(365) / Decimal::from(7) / Decimal::from(12)
}

/// Checks a wage against the built-in minimum wage table.
///
/// # Errors
///
/// See [`MinimumWageCalculator::calculate`].
pub fn calculate_minimum_wage(
    input: &MinimumWageInput,
) -> Result<MinimumWageResult, MinimumWageError> {
    let config = TaxYearConfig::default();
    MinimumWageCalculator::new(&config).calculate(input)
}
