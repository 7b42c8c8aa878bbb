//! Capital gains (transfer income) tax on real estate.
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Transfer gain: sale − (acquisition + acquisition costs + transfer costs) |
//! | 2    | Long-term holding deduction by whole holding years, not for multi-home owners |
//! | 3    | Basic deduction |
//! | 4    | Progressive tax, every rate × 1.2 for multi-home owners |
//! | 5    | Floor to 10 won; local income tax 10%, also floored |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use finance_core::calculations::capital_gains::{CapitalGainsInput, calculate_capital_gains};
//!
//! let input = CapitalGainsInput {
//!     acquisition_price: dec!(500000000),
//!     transfer_price: dec!(700000000),
//!     acquisition_costs: dec!(10000000),
//!     transfer_costs: dec!(5000000),
//!     holding_years: 5,
//!     multi_home: false,
//! };
//!
//! let result = calculate_capital_gains(&input).unwrap();
//!
//! assert_eq!(result.transfer_gain, dec!(185000000));
//! assert_eq!(result.holding_deduction, dec!(74000000));
//! assert_eq!(result.taxable_income, dec!(108500000));
//! assert_eq!(result.capital_gains_tax, dec!(22535000));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::calculations::common::{MAX_AMOUNT, floor_to_ten, max, percent_of, round_won};
use crate::{BracketTableError, TaxBracketTable, TaxYearConfig};

/// Errors that can occur during capital gains calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CapitalGainsError {
    #[error("{name} must not be negative, got {amount}")]
    NegativeAmount { name: &'static str, amount: Decimal },

    #[error("{name} must not exceed {max}, got {amount}", max = MAX_AMOUNT)]
    AmountTooLarge { name: &'static str, amount: Decimal },

    #[error("multi-home surcharge produces an invalid schedule: {0}")]
    Surcharge(#[from] BracketTableError),
}

/// Input values for a capital gains calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalGainsInput {
    pub acquisition_price: Decimal,
    pub transfer_price: Decimal,
    #[serde(default)]
    pub acquisition_costs: Decimal,
    #[serde(default)]
    pub transfer_costs: Decimal,
    /// Whole years held.
    pub holding_years: u32,
    /// Owner holds several homes; no holding deduction and surcharged rates.
    #[serde(default)]
    pub multi_home: bool,
}

/// Result of a capital gains calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalGainsResult {
    /// Negative for a loss.
    pub transfer_gain: Decimal,
    pub holding_deduction_rate: Decimal,
    pub holding_deduction: Decimal,
    pub basic_deduction: Decimal,
    pub taxable_income: Decimal,
    pub surcharge_applied: bool,
    pub capital_gains_tax: Decimal,
    pub local_income_tax: Decimal,
    pub total_tax: Decimal,
    /// Total tax over the transfer gain, in percent.
    pub effective_tax_rate: Option<Decimal>,
}

/// Calculator for capital gains tax.
#[derive(Debug, Clone)]
pub struct CapitalGainsCalculator<'a> {
    config: &'a TaxYearConfig,
    brackets: &'a TaxBracketTable,
}

impl<'a> CapitalGainsCalculator<'a> {
    pub fn new(
        config: &'a TaxYearConfig,
        brackets: &'a TaxBracketTable,
    ) -> Self {
        Self { config, brackets }
    }

    /// # Errors
    ///
    /// Returns [`CapitalGainsError`] for a price or cost outside
    /// `0..=MAX_AMOUNT`, or when
    /// the surcharge multiplier pushes a rate above 100%.
    pub fn calculate(
        &self,
        input: &CapitalGainsInput,
    ) -> Result<CapitalGainsResult, CapitalGainsError> {
        for (name, amount) in [
            ("acquisition price", input.acquisition_price),
            ("transfer price", input.transfer_price),
            ("acquisition costs", input.acquisition_costs),
            ("transfer costs", input.transfer_costs),
        ] {
            if amount < Decimal::ZERO {
                return Err(CapitalGainsError::NegativeAmount { name, amount });
            }
            if amount > MAX_AMOUNT {
                return Err(CapitalGainsError::AmountTooLarge { name, amount });
            }
        }

        let params = &self.config.capital_gains;
        let transfer_gain = input.transfer_price
            - (input.acquisition_price + input.acquisition_costs + input.transfer_costs);

        let holding_deduction_rate = if input.multi_home {
            Decimal::ZERO
        } else {
            params.holding_deduction_rate(input.holding_years)
        };
        let holding_deduction = round_won(max(transfer_gain, Decimal::ZERO) * holding_deduction_rate);
        let taxable_income = max(
            transfer_gain - holding_deduction - params.basic_deduction,
            Decimal::ZERO,
        );

        let capital_gains_tax = if input.multi_home {
            let surcharged = self.brackets.scaled(params.multi_home_multiplier)?;
            floor_to_ten(surcharged.tax(taxable_income))
        } else {
            floor_to_ten(self.brackets.tax(taxable_income))
        };
        let local_income_tax = floor_to_ten(capital_gains_tax * self.config.local_income_tax_rate);
        let total_tax = capital_gains_tax + local_income_tax;

        debug!(
            transfer_gain = %transfer_gain,
            taxable_income = %taxable_income,
            multi_home = input.multi_home,
            capital_gains_tax = %capital_gains_tax,
            "Calculated capital gains tax"
        );

        Ok(CapitalGainsResult {
            transfer_gain,
            holding_deduction_rate,
            holding_deduction,
            basic_deduction: params.basic_deduction,
            taxable_income,
            surcharge_applied: input.multi_home,
            capital_gains_tax,
            local_income_tax,
            total_tax,
            effective_tax_rate: percent_of(total_tax, transfer_gain),
        })
    }
}

/// Calculates capital gains tax with the built-in 2025 schedule.
///
/// # Errors
///
/// See [`CapitalGainsCalculator::calculate`].
pub fn calculate_capital_gains(
    input: &CapitalGainsInput,
) -> Result<CapitalGainsResult, CapitalGainsError> {
    let config = TaxYearConfig::default();
    let brackets = TaxBracketTable::income_tax_2025();
    CapitalGainsCalculator::new(&config, &brackets).calculate(input)
}
