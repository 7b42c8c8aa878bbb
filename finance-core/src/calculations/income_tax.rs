//! Comprehensive income tax from annual income and itemized deductions.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use finance_core::calculations::income_tax::{
//!     IncomeDeductions, IncomeTaxInput, calculate_income_tax,
//! };
//!
//! let input = IncomeTaxInput {
//!     annual_income: dec!(20000000),
//!     deductions: IncomeDeductions {
//!         personal: dec!(1500000),
//!         ..Default::default()
//!     },
//! };
//!
//! let result = calculate_income_tax(&input).unwrap();
//!
//! assert_eq!(result.taxable_income, dec!(18500000));
//! assert_eq!(result.calculated_tax, dec!(1515000));
//! assert_eq!(result.income_tax, dec!(1439250));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::{MAX_AMOUNT, max, percent_of, round_won};
use crate::{TaxBracketTable, TaxYearConfig};

/// Errors that can occur during income tax calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IncomeTaxError {
    #[error("annual income must not be negative, got {0}")]
    NegativeIncome(Decimal),

    #[error("{name} deduction must not be negative, got {amount}")]
    NegativeDeduction { name: &'static str, amount: Decimal },

    #[error("{name} must not exceed {max}, got {amount}", max = MAX_AMOUNT)]
    AmountTooLarge { name: &'static str, amount: Decimal },
}

/// The six deduction categories subtracted from income.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomeDeductions {
    pub personal: Decimal,
    pub national_pension: Decimal,
    pub insurance_premiums: Decimal,
    pub housing_fund: Decimal,
    pub credit_card: Decimal,
    pub other: Decimal,
}

impl IncomeDeductions {
    pub fn total(&self) -> Decimal {
        self.personal
            + self.national_pension
            + self.insurance_premiums
            + self.housing_fund
            + self.credit_card
            + self.other
    }

    fn validate(&self) -> Result<(), IncomeTaxError> {
        for (name, amount) in [
            ("personal", self.personal),
            ("national pension", self.national_pension),
            ("insurance premiums", self.insurance_premiums),
            ("housing fund", self.housing_fund),
            ("credit card", self.credit_card),
            ("other", self.other),
        ] {
            if amount < Decimal::ZERO {
                return Err(IncomeTaxError::NegativeDeduction { name, amount });
            }
            if amount > MAX_AMOUNT {
                return Err(IncomeTaxError::AmountTooLarge { name, amount });
            }
        }
        Ok(())
    }
}

/// Input values for an income tax calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxInput {
    pub annual_income: Decimal,
    #[serde(default)]
    pub deductions: IncomeDeductions,
}

/// Result of an income tax calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxResult {
    pub annual_income: Decimal,
    pub total_deductions: Decimal,
    pub taxable_income: Decimal,
    pub calculated_tax: Decimal,
    pub tax_credit: Decimal,
    pub income_tax: Decimal,
    pub local_income_tax: Decimal,
    pub total_tax: Decimal,
    pub marginal_rate: Decimal,
    /// Total tax over annual income, in percent.
    pub effective_tax_rate: Option<Decimal>,
}

/// Calculator for comprehensive income tax.
#[derive(Debug, Clone)]
pub struct IncomeTaxCalculator<'a> {
    config: &'a TaxYearConfig,
    brackets: &'a TaxBracketTable,
}

impl<'a> IncomeTaxCalculator<'a> {
    pub fn new(
        config: &'a TaxYearConfig,
        brackets: &'a TaxBracketTable,
    ) -> Self {
        Self { config, brackets }
    }

    /// # Errors
    ///
    /// Returns [`IncomeTaxError`] when income or a deduction is negative or
    /// above [`MAX_AMOUNT`].
    pub fn calculate(
        &self,
        input: &IncomeTaxInput,
    ) -> Result<IncomeTaxResult, IncomeTaxError> {
        if input.annual_income < Decimal::ZERO {
            return Err(IncomeTaxError::NegativeIncome(input.annual_income));
        }
        if input.annual_income > MAX_AMOUNT {
            return Err(IncomeTaxError::AmountTooLarge {
                name: "annual income",
                amount: input.annual_income,
            });
        }
        input.deductions.validate()?;

        let params = &self.config.income_tax;
        let total_deductions = input.deductions.total();
        let taxable_income = max(input.annual_income - total_deductions, Decimal::ZERO);
        let calculated_tax = round_won(self.brackets.tax(taxable_income));
        let tax_credit =
            round_won((calculated_tax * params.tax_credit_rate).min(params.tax_credit_cap));
        let income_tax = calculated_tax - tax_credit;
        let local_income_tax = round_won(income_tax * self.config.local_income_tax_rate);
        let total_tax = income_tax + local_income_tax;

        Ok(IncomeTaxResult {
            annual_income: input.annual_income,
            total_deductions,
            taxable_income,
            calculated_tax,
            tax_credit,
            income_tax,
            local_income_tax,
            total_tax,
            marginal_rate: self.brackets.marginal_rate(taxable_income),
            effective_tax_rate: percent_of(total_tax, input.annual_income),
        })
    }
}

/// Calculates income tax with the built-in 2025 schedule.
///
/// # Errors
///
/// See [`IncomeTaxCalculator::calculate`].
pub fn calculate_income_tax(input: &IncomeTaxInput) -> Result<IncomeTaxResult, IncomeTaxError> {
    let config = TaxYearConfig::default();
    let brackets = TaxBracketTable::income_tax_2025();
    IncomeTaxCalculator::new(&config, &brackets).calculate(input)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn credit_is_capped() {
        let input = IncomeTaxInput {
            annual_income: dec!(80000000),
            deductions: IncomeDeductions {
                personal: dec!(1500000),
                national_pension: dec!(3600000),
                insurance_premiums: dec!(2000000),
                housing_fund: dec!(0),
                credit_card: dec!(2500000),
                other: dec!(0),
            },
        };

        let result = calculate_income_tax(&input).unwrap();

        assert_eq!(result.total_deductions, dec!(9600000));
        assert_eq!(result.taxable_income, dec!(70400000));
        assert_eq!(result.calculated_tax, dec!(11136000));
        assert_eq!(result.tax_credit, dec!(500000));
        assert_eq!(result.income_tax, dec!(10636000));
        assert_eq!(result.local_income_tax, dec!(1063600));
        assert_eq!(result.total_tax, dec!(11699600));
        assert_eq!(result.marginal_rate, dec!(0.24));
        assert_eq!(result.effective_tax_rate, Some(dec!(14.62)));
    }

    #[test]
    fn credit_below_cap_is_five_percent() {
        let input = IncomeTaxInput {
            annual_income: dec!(20000000),
            deductions: IncomeDeductions {
                personal: dec!(1500000),
                ..Default::default()
            },
        };

        let result = calculate_income_tax(&input).unwrap();

        assert_eq!(result.tax_credit, dec!(75750));
        assert_eq!(result.local_income_tax, dec!(143925));
    }

    #[test]
    fn deductions_above_income_mean_no_tax() {
        let input = IncomeTaxInput {
            annual_income: dec!(5000000),
            deductions: IncomeDeductions {
                other: dec!(6000000),
                ..Default::default()
            },
        };

        let result = calculate_income_tax(&input).unwrap();

        assert_eq!(result.taxable_income, dec!(0));
        assert_eq!(result.total_tax, dec!(0));
        assert_eq!(result.effective_tax_rate, Some(dec!(0)));
    }

    #[test]
    fn zero_income_has_no_effective_rate() {
        let input = IncomeTaxInput {
            annual_income: dec!(0),
            deductions: IncomeDeductions::default(),
        };

        assert_eq!(calculate_income_tax(&input).unwrap().effective_tax_rate, None);
    }

    #[test]
    fn rejects_negative_deduction() {
        let input = IncomeTaxInput {
            annual_income: dec!(50000000),
            deductions: IncomeDeductions {
                housing_fund: dec!(-1),
                ..Default::default()
            },
        };

        assert_eq!(
            calculate_income_tax(&input),
            Err(IncomeTaxError::NegativeDeduction {
                name: "housing fund",
                amount: dec!(-1)
            })
        );
    }

    #[test]
    fn rejects_negative_income() {
        let input = IncomeTaxInput {
            annual_income: dec!(-1),
            deductions: IncomeDeductions::default(),
        };

        assert_eq!(
            calculate_income_tax(&input),
            Err(IncomeTaxError::NegativeIncome(dec!(-1)))
        );
    }

    #[test]
    fn rejects_deduction_above_ceiling() {
        let input = IncomeTaxInput {
            annual_income: dec!(80000000),
            deductions: IncomeDeductions {
                other: dec!(70000000000000000000000000000),
                credit_card: dec!(70000000000000000000000000000),
                ..Default::default()
            },
        };

        assert_eq!(
            calculate_income_tax(&input),
            Err(IncomeTaxError::AmountTooLarge {
                name: "credit card",
                amount: dec!(70000000000000000000000000000)
            })
        );
    }
}
