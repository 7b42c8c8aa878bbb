//! Monthly salary net-pay calculations.
//!
//! The pipeline for one month of pay:
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Tax-exempt allowances, each capped (meal, car, childcare) |
//! | 2    | Taxable monthly pay (gross − exempt allowances) |
//! | 3    | Social insurance on taxable pay (pension, health, long-term care, employment) |
//! | 4    | Annual wage (taxable pay × 12) |
//! | 5    | Earned-income deduction over the annual wage |
//! | 6    | Personal deduction (self + dependents) and annual insurance |
//! | 7    | Tax base and progressive tax |
//! | 8    | Earned-income and child tax credits |
//! | 9    | Monthly income tax (annual ÷ 12) and local income tax (10%) |
//! | 10   | Net pay (gross − insurance − both taxes) |
//!
//! A one-time incentive re-runs steps 4 to 8 with the incentive added to the
//! annual wage and reports the difference. [`SalaryCalculator::estimate_gross_salary`]
//! inverts the pipeline by bisection.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use finance_core::calculations::salary::{SalaryInput, calculate_salary};
//!
//! let result = calculate_salary(&SalaryInput::new(dec!(5000000))).unwrap();
//!
//! assert_eq!(result.insurance.national_pension, dec!(225000));
//! assert_eq!(result.insurance.health_insurance, dec!(177250));
//! assert_eq!(result.insurance.employment_insurance, dec!(45000));
//! assert_eq!(result.net_salary, dec!(4154318));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::common::{MAX_AMOUNT, max, percent_of, round_won};
use crate::{TaxBracketTable, TaxYearConfig};

/// Errors that can occur during salary calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SalaryError {
    #[error("gross monthly salary must not be negative, got {0}")]
    NegativeSalary(Decimal),

    #[error("{name} allowance must not be negative, got {amount}")]
    NegativeAllowance { name: &'static str, amount: Decimal },

    #[error("tax-exempt allowances {allowances} exceed gross monthly salary {gross}")]
    AllowancesExceedSalary { allowances: Decimal, gross: Decimal },

    #[error("incentive must not be negative, got {0}")]
    NegativeIncentive(Decimal),

    #[error("target net salary must not be negative, got {0}")]
    NegativeTargetNet(Decimal),

    #[error("{name} must not exceed {max}, got {amount}", max = MAX_AMOUNT)]
    AmountTooLarge { name: &'static str, amount: Decimal },

    #[error("no gross salary up to {max} yields a net salary of {0}", max = MAX_AMOUNT)]
    TargetNetUnreachable(Decimal),
}

/// Monthly tax-exempt allowances as paid, before caps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxExemptAllowances {
    pub meal: Decimal,
    pub car: Decimal,
    pub childcare: Decimal,
    /// Uncapped.
    pub research: Decimal,
    /// Uncapped.
    pub other: Decimal,
}

impl TaxExemptAllowances {
    /// Sum as paid.
    pub fn total(&self) -> Decimal {
        self.meal + self.car + self.childcare + self.research + self.other
    }

    fn validate(&self) -> Result<(), SalaryError> {
        for (name, amount) in [
            ("meal", self.meal),
            ("car", self.car),
            ("childcare", self.childcare),
            ("research", self.research),
            ("other", self.other),
        ] {
            if amount < Decimal::ZERO {
                return Err(SalaryError::NegativeAllowance { name, amount });
            }
            if amount > MAX_AMOUNT {
                return Err(SalaryError::AmountTooLarge { name, amount });
            }
        }
        Ok(())
    }
}

/// Input values for one month of pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryInput {
    /// Gross monthly salary including allowances.
    pub gross_monthly_salary: Decimal,

    #[serde(default)]
    pub allowances: TaxExemptAllowances,

    /// Dependents other than the employee.
    #[serde(default)]
    pub dependents: u32,

    /// Children eligible for the child tax credit.
    #[serde(default)]
    pub children: u32,

    /// One-time incentive paid on top of the annual wage.
    #[serde(default)]
    pub incentive: Option<Decimal>,
}

impl SalaryInput {
    /// A salary with no allowances, dependents or incentive.
    pub fn new(gross_monthly_salary: Decimal) -> Self {
        Self {
            gross_monthly_salary,
            allowances: TaxExemptAllowances::default(),
            dependents: 0,
            children: 0,
            incentive: None,
        }
    }
}

/// Exempt allowance amounts after caps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceBreakdown {
    pub meal: Decimal,
    pub car: Decimal,
    pub childcare: Decimal,
    pub research: Decimal,
    pub other: Decimal,
    /// Sum of the exempt amounts.
    pub total_exempt: Decimal,
    /// Amount paid above the caps; stays taxable.
    pub excess_over_caps: Decimal,
}

/// Employee-side social insurance for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceDeductions {
    pub national_pension: Decimal,
    pub health_insurance: Decimal,
    pub long_term_care: Decimal,
    pub employment_insurance: Decimal,
    pub total: Decimal,
}

/// The annual income tax computation behind a monthly figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualIncomeTax {
    pub annual_wage: Decimal,
    pub earned_income_deduction: Decimal,
    pub personal_deduction: Decimal,
    pub insurance_deduction: Decimal,
    pub tax_base: Decimal,
    pub calculated_tax: Decimal,
    pub earned_income_tax_credit: Decimal,
    pub child_tax_credit: Decimal,
    /// Never negative.
    pub income_tax: Decimal,
    /// 0-based index into the bracket table.
    pub bracket_index: usize,
    pub marginal_rate: Decimal,
}

/// Marginal effect of a one-time incentive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncentiveResult {
    pub amount: Decimal,
    /// Annual income tax with the incentive minus without it.
    pub additional_income_tax: Decimal,
    pub additional_local_income_tax: Decimal,
    pub net_incentive: Decimal,
    pub marginal_rate_before: Decimal,
    pub marginal_rate_after: Decimal,
    pub crossed_bracket: bool,
    pub annual_tax_with_incentive: AnnualIncomeTax,
}

/// Result of a monthly salary calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryResult {
    pub gross_monthly_salary: Decimal,
    pub allowances: AllowanceBreakdown,
    pub taxable_monthly_salary: Decimal,
    pub insurance: InsuranceDeductions,
    pub annual_tax: AnnualIncomeTax,
    pub monthly_income_tax: Decimal,
    pub monthly_local_income_tax: Decimal,
    /// Insurance plus both taxes.
    pub total_deductions: Decimal,
    /// May be negative when deductions exceed pay.
    pub net_salary: Decimal,
    /// Income and local income tax over gross pay, in percent.
    pub effective_tax_rate: Option<Decimal>,
    pub incentive: Option<IncentiveResult>,
}

/// Input for the net-to-gross inversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetToGrossInput {
    pub target_net_salary: Decimal,

    #[serde(default)]
    pub allowances: TaxExemptAllowances,

    #[serde(default)]
    pub dependents: u32,

    #[serde(default)]
    pub children: u32,
}

/// Gross salary found by [`SalaryCalculator::estimate_gross_salary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrossSalaryEstimate {
    pub target_net_salary: Decimal,
    pub gross_monthly_salary: Decimal,
    /// Net pay at `gross_monthly_salary`; at least the target when converged.
    pub net_salary: Decimal,
    pub iterations: u32,
    /// False when the iteration limit was reached first.
    pub converged: bool,
}

/// Calculator for monthly net pay.
#[derive(Debug, Clone)]
pub struct SalaryCalculator<'a> {
    config: &'a TaxYearConfig,
    brackets: &'a TaxBracketTable,
}

impl<'a> SalaryCalculator<'a> {
    pub fn new(
        config: &'a TaxYearConfig,
        brackets: &'a TaxBracketTable,
    ) -> Self {
        Self { config, brackets }
    }

    /// Calculates net pay for one month.
    ///
    /// # Errors
    ///
    /// Returns [`SalaryError`] if:
    /// - The gross salary, an allowance or the incentive is negative
    /// - Any of those amounts exceeds [`MAX_AMOUNT`]
    /// - The exempt allowances exceed the gross salary
    pub fn calculate(
        &self,
        input: &SalaryInput,
    ) -> Result<SalaryResult, SalaryError> {
        let gross = input.gross_monthly_salary;
        if gross < Decimal::ZERO {
            return Err(SalaryError::NegativeSalary(gross));
        }
        if gross > MAX_AMOUNT {
            return Err(SalaryError::AmountTooLarge {
                name: "gross monthly salary",
                amount: gross,
            });
        }
        if let Some(amount) = input.incentive {
            if amount < Decimal::ZERO {
                return Err(SalaryError::NegativeIncentive(amount));
            }
            if amount > MAX_AMOUNT {
                return Err(SalaryError::AmountTooLarge {
                    name: "incentive",
                    amount,
                });
            }
        }

        let allowances = self.exempt_allowances(&input.allowances)?;
        if allowances.total_exempt > gross {
            return Err(SalaryError::AllowancesExceedSalary {
                allowances: allowances.total_exempt,
                gross,
            });
        }

        let taxable_monthly_salary = gross - allowances.total_exempt;
        let insurance = self.insurance(taxable_monthly_salary);

        let annual_wage = taxable_monthly_salary * Decimal::from(12);
        let annual_insurance = insurance.total * Decimal::from(12);
        let annual_tax =
            self.annual_income_tax(annual_wage, annual_insurance, input.dependents, input.children);

        let monthly_income_tax = round_won(annual_tax.income_tax / Decimal::from(12));
        let monthly_local_income_tax = self.local_income_tax(monthly_income_tax);
        let total_deductions = insurance.total + monthly_income_tax + monthly_local_income_tax;
        let net_salary = gross - total_deductions;

        let incentive = input.incentive.map(|amount| {
            self.incentive(
                &annual_tax,
                amount,
                annual_insurance,
                input.dependents,
                input.children,
            )
        });

        debug!(
            gross = %gross,
            tax_base = %annual_tax.tax_base,
            monthly_income_tax = %monthly_income_tax,
            net_salary = %net_salary,
            "Calculated salary"
        );

        Ok(SalaryResult {
            gross_monthly_salary: gross,
            allowances,
            taxable_monthly_salary,
            effective_tax_rate: percent_of(
                monthly_income_tax + monthly_local_income_tax,
                gross,
            ),
            insurance,
            annual_tax,
            monthly_income_tax,
            monthly_local_income_tax,
            total_deductions,
            net_salary,
            incentive,
        })
    }

    /// Estimates the gross monthly salary that yields `target_net_salary`.
    ///
    /// Starts from `target ÷ 0.82` and bisects against [`Self::calculate`]
    /// until the bracket is within the configured tolerance (1,000 won) or
    /// the iteration limit (20) is reached. The returned gross is the upper
    /// end of the final bracket, so its net pay meets the target.
    ///
    /// # Errors
    ///
    /// Returns [`SalaryError`] if the target or an allowance is negative or
    /// above [`MAX_AMOUNT`], or if no gross salary up to that ceiling reaches
    /// the target.
    pub fn estimate_gross_salary(
        &self,
        input: &NetToGrossInput,
    ) -> Result<GrossSalaryEstimate, SalaryError> {
        let target = input.target_net_salary;
        if target < Decimal::ZERO {
            return Err(SalaryError::NegativeTargetNet(target));
        }
        if target > MAX_AMOUNT {
            return Err(SalaryError::AmountTooLarge {
                name: "target net salary",
                amount: target,
            });
        }
        input.allowances.validate()?;

        let rules = &self.config.earned_income;
        let net_for = |gross: Decimal| -> Result<Decimal, SalaryError> {
            let salary = SalaryInput {
                gross_monthly_salary: gross,
                allowances: input.allowances.clone(),
                dependents: input.dependents,
                children: input.children,
                incentive: None,
            };
            self.calculate(&salary).map(|r| r.net_salary)
        };

        // Gross can never be below the allowances it carries, nor below the
        // target itself since net never exceeds gross.
        let floor = input.allowances.total();
        let guess = max(round_won(target / rules.net_to_gross_initial_ratio), floor).min(MAX_AMOUNT);

        let (mut low, mut high) = if net_for(guess)? >= target {
            (max(target, floor).min(guess), guess)
        } else {
            let mut low = guess;
            let mut high = round_won(guess * Decimal::new(15, 1)).min(MAX_AMOUNT);
            let mut expansions = 0;
            while net_for(high)? < target && expansions < 8 && high < MAX_AMOUNT {
                low = high;
                high = (high * Decimal::TWO).min(MAX_AMOUNT);
                expansions += 1;
            }
            if net_for(high)? < target {
                return Err(SalaryError::TargetNetUnreachable(target));
            }
            (low, high)
        };

        let mut iterations = 0;
        let mut converged = high - low <= rules.net_to_gross_tolerance;
        while !converged && iterations < rules.net_to_gross_max_iterations {
            iterations += 1;
            let mid = round_won((low + high) / Decimal::TWO);
            if net_for(mid)? < target {
                low = mid;
            } else {
                high = mid;
            }
            converged = high - low <= rules.net_to_gross_tolerance;
        }

        if !converged {
            warn!(
                target = %target,
                low = %low,
                high = %high,
                iterations = iterations,
                "Gross salary search did not converge"
            );
        }

        Ok(GrossSalaryEstimate {
            target_net_salary: target,
            gross_monthly_salary: high,
            net_salary: net_for(high)?,
            iterations,
            converged,
        })
    }

    /// Applies the monthly caps. Research and other allowances pass through.
    fn exempt_allowances(
        &self,
        allowances: &TaxExemptAllowances,
    ) -> Result<AllowanceBreakdown, SalaryError> {
        allowances.validate()?;

        let caps = &self.config.allowances;
        let capped = |name: &'static str, amount: Decimal, cap: Decimal| {
            if amount > cap {
                warn!(
                    allowance = name,
                    amount = %amount,
                    cap = %cap,
                    "Allowance exceeds exempt cap; excess is taxable"
                );
                cap
            } else {
                amount
            }
        };

        let meal = capped("meal", allowances.meal, caps.meal);
        let car = capped("car", allowances.car, caps.car);
        let childcare = capped("childcare", allowances.childcare, caps.childcare);
        let total_exempt = meal + car + childcare + allowances.research + allowances.other;

        Ok(AllowanceBreakdown {
            meal,
            car,
            childcare,
            research: allowances.research,
            other: allowances.other,
            excess_over_caps: allowances.total() - total_exempt,
            total_exempt,
        })
    }

    /// Social insurance on taxable monthly pay.
    fn insurance(
        &self,
        taxable_monthly_salary: Decimal,
    ) -> InsuranceDeductions {
        let rates = &self.config.insurance;

        // The floor only applies to someone who is actually paid.
        let pension_base = if taxable_monthly_salary > Decimal::ZERO {
            taxable_monthly_salary
                .max(rates.pension_base_floor)
                .min(rates.pension_base_ceiling)
        } else {
            Decimal::ZERO
        };

        let national_pension = round_won(pension_base * rates.national_pension_rate);
        let health_insurance = round_won(taxable_monthly_salary * rates.health_insurance_rate);
        let long_term_care = round_won(health_insurance * rates.long_term_care_rate);
        let employment_insurance =
            round_won(taxable_monthly_salary * rates.employment_insurance_rate);

        InsuranceDeductions {
            national_pension,
            health_insurance,
            long_term_care,
            employment_insurance,
            total: national_pension + health_insurance + long_term_care + employment_insurance,
        }
    }

    /// Annual income tax on `annual_wage` after deductions and credits.
    pub fn annual_income_tax(
        &self,
        annual_wage: Decimal,
        annual_insurance: Decimal,
        dependents: u32,
        children: u32,
    ) -> AnnualIncomeTax {
        let rules = &self.config.earned_income;

        let earned_income_deduction = rules.deduction.amount(annual_wage);
        let personal_deduction = rules.personal_deduction * Decimal::from(1 + dependents);
        let tax_base = max(
            annual_wage - earned_income_deduction - personal_deduction - annual_insurance,
            Decimal::ZERO,
        );

        let calculated_tax = round_won(self.brackets.tax(tax_base));
        let earned_income_tax_credit = self.earned_income_tax_credit(calculated_tax, annual_wage);
        let child_tax_credit = self.child_tax_credit(children);
        let income_tax = max(
            calculated_tax - earned_income_tax_credit - child_tax_credit,
            Decimal::ZERO,
        );

        AnnualIncomeTax {
            annual_wage,
            earned_income_deduction,
            personal_deduction,
            insurance_deduction: annual_insurance,
            tax_base,
            calculated_tax,
            earned_income_tax_credit,
            child_tax_credit,
            income_tax,
            bracket_index: self.brackets.bracket_index(tax_base),
            marginal_rate: self.brackets.marginal_rate(tax_base),
        }
    }

    /// Two-tier credit on the calculated tax, capped by wage tier.
    fn earned_income_tax_credit(
        &self,
        calculated_tax: Decimal,
        annual_wage: Decimal,
    ) -> Decimal {
        let rules = &self.config.earned_income;

        let credit = if calculated_tax <= rules.credit_threshold {
            calculated_tax * rules.credit_low_rate
        } else {
            rules.credit_high_base + (calculated_tax - rules.credit_threshold) * rules.credit_high_rate
        };

        let cap = if annual_wage <= rules.credit_cap_tier1_wage {
            rules.credit_cap_tier1
        } else if annual_wage <= rules.credit_cap_tier2_wage {
            max(
                rules.credit_cap_tier1
                    - (annual_wage - rules.credit_cap_tier1_wage) * rules.credit_cap_tier2_slope,
                rules.credit_cap_tier2_floor,
            )
        } else {
            max(
                rules.credit_cap_tier2_floor
                    - (annual_wage - rules.credit_cap_tier2_wage) * rules.credit_cap_tier3_slope,
                rules.credit_cap_tier3_floor,
            )
        };

        round_won(credit.min(cap))
    }

    fn child_tax_credit(
        &self,
        children: u32,
    ) -> Decimal {
        let rules = &self.config.earned_income;
        match children {
            0 => Decimal::ZERO,
            1 => rules.child_credit_first,
            n => {
                rules.child_credit_first
                    + rules.child_credit_second
                    + rules.child_credit_additional * Decimal::from(n - 2)
            }
        }
    }

    fn local_income_tax(
        &self,
        income_tax: Decimal,
    ) -> Decimal {
        round_won(income_tax * self.config.local_income_tax_rate)
    }

    /// Re-runs the annual pipeline with the incentive added to the wage.
    fn incentive(
        &self,
        without: &AnnualIncomeTax,
        amount: Decimal,
        annual_insurance: Decimal,
        dependents: u32,
        children: u32,
    ) -> IncentiveResult {
        let with = self.annual_income_tax(
            without.annual_wage + amount,
            annual_insurance,
            dependents,
            children,
        );

        let additional_income_tax = with.income_tax - without.income_tax;
        let additional_local_income_tax = self.local_income_tax(additional_income_tax);

        IncentiveResult {
            amount,
            additional_income_tax,
            additional_local_income_tax,
            net_incentive: amount - additional_income_tax - additional_local_income_tax,
            marginal_rate_before: without.marginal_rate,
            marginal_rate_after: with.marginal_rate,
            crossed_bracket: with.bracket_index > without.bracket_index,
            annual_tax_with_incentive: with,
        }
    }
}

/// Calculates net pay with the built-in 2025 rates.
///
/// # Errors
///
/// See [`SalaryCalculator::calculate`].
pub fn calculate_salary(input: &SalaryInput) -> Result<SalaryResult, SalaryError> {
    let config = TaxYearConfig::default();
    let brackets = TaxBracketTable::income_tax_2025();
    SalaryCalculator::new(&config, &brackets).calculate(input)
}

/// Estimates gross pay for a target net with the built-in 2025 rates.
///
/// # Errors
///
/// See [`SalaryCalculator::estimate_gross_salary`].
pub fn estimate_gross_salary(input: &NetToGrossInput) -> Result<GrossSalaryEstimate, SalaryError> {
    let config = TaxYearConfig::default();
    let brackets = TaxBracketTable::income_tax_2025();
    SalaryCalculator::new(&config, &brackets).estimate_gross_salary(input)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    /// Initializes tracing subscriber for tests that exercise warning paths.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    fn calculate(input: &SalaryInput) -> SalaryResult {
        calculate_salary(input).unwrap()
    }

    // =========================================================================
    // Insurance tests
    // =========================================================================

    #[test]
    fn insurance_for_five_million() {
        let result = calculate(&SalaryInput::new(dec!(5000000)));

        assert_eq!(
            result.insurance,
            InsuranceDeductions {
                national_pension: dec!(225000),
                health_insurance: dec!(177250),
                long_term_care: dec!(22954),
                employment_insurance: dec!(45000),
                total: dec!(470204),
            }
        );
    }

    #[test]
    fn pension_base_is_capped_at_ceiling() {
        let result = calculate(&SalaryInput::new(dec!(10000000)));

        // 6,170,000 × 4.5%
        assert_eq!(result.insurance.national_pension, dec!(277650));
    }

    #[test]
    fn pension_base_is_raised_to_floor() {
        let result = calculate(&SalaryInput::new(dec!(300000)));

        // 390,000 × 4.5%
        assert_eq!(result.insurance.national_pension, dec!(17550));
    }

    #[test]
    fn zero_salary_has_no_deductions() {
        let result = calculate(&SalaryInput::new(dec!(0)));

        assert_eq!(result.insurance.total, dec!(0));
        assert_eq!(result.net_salary, dec!(0));
        assert_eq!(result.effective_tax_rate, None);
    }

    // =========================================================================
    // Annual tax pipeline tests
    // =========================================================================

    #[test]
    fn annual_tax_for_five_million() {
        let result = calculate(&SalaryInput::new(dec!(5000000)));
        let annual = &result.annual_tax;

        assert_eq!(annual.annual_wage, dec!(60000000));
        assert_eq!(annual.earned_income_deduction, dec!(12750000));
        assert_eq!(annual.personal_deduction, dec!(1500000));
        assert_eq!(annual.insurance_deduction, dec!(5642448));
        assert_eq!(annual.tax_base, dec!(40107552));
        assert_eq!(annual.calculated_tax, dec!(4756133));
        // Credit of 1,751,840 is held to the 660,000 floor of the wage-tier cap.
        assert_eq!(annual.earned_income_tax_credit, dec!(660000));
        assert_eq!(annual.income_tax, dec!(4096133));
        assert_eq!(annual.bracket_index, 1);
        assert_eq!(annual.marginal_rate, dec!(0.15));
    }

    #[test]
    fn monthly_taxes_and_net_for_five_million() {
        let result = calculate(&SalaryInput::new(dec!(5000000)));

        assert_eq!(result.monthly_income_tax, dec!(341344));
        assert_eq!(result.monthly_local_income_tax, dec!(34134));
        assert_eq!(result.total_deductions, dec!(845682));
        assert_eq!(result.net_salary, dec!(4154318));
        assert!(result.net_salary > dec!(5000000) * dec!(0.7));
    }

    #[test]
    fn low_wage_credit_uses_first_tier_cap() {
        let result = calculate(&SalaryInput::new(dec!(3000000)));

        assert_eq!(result.annual_tax.calculated_tax, dec!(1809680));
        // 715,000 + 30% × 509,680 = 867,904, capped at 740,000 − 0.8% × 3M
        assert_eq!(result.annual_tax.earned_income_tax_credit, dec!(716000));
        assert_eq!(result.net_salary, dec!(2617624));
    }

    #[test]
    fn high_wage_credit_uses_third_tier_floor() {
        let result = calculate(&SalaryInput::new(dec!(10000000)));

        assert_eq!(result.annual_tax.earned_income_tax_credit, dec!(500000));
        assert_eq!(result.annual_tax.bracket_index, 3);
        assert_eq!(result.net_salary, dec!(7672999));
    }

    #[test]
    fn tax_base_never_negative() {
        let result = calculate(&SalaryInput::new(dec!(300000)));

        assert_eq!(result.annual_tax.tax_base, dec!(0));
        assert_eq!(result.monthly_income_tax, dec!(0));
        assert_eq!(result.net_salary, dec!(267738));
    }

    // =========================================================================
    // Allowance and dependent tests
    // =========================================================================

    #[test]
    fn allowances_reduce_taxable_pay_and_children_earn_credit() {
        let input = SalaryInput {
            gross_monthly_salary: dec!(5000000),
            allowances: TaxExemptAllowances {
                meal: dec!(200000),
                car: dec!(200000),
                ..Default::default()
            },
            dependents: 2,
            children: 1,
            incentive: None,
        };

        let result = calculate(&input);

        assert_eq!(result.taxable_monthly_salary, dec!(4600000));
        assert_eq!(result.insurance.total, dec!(432588));
        assert_eq!(result.annual_tax.personal_deduction, dec!(4500000));
        assert_eq!(result.annual_tax.child_tax_credit, dec!(150000));
        assert_eq!(result.annual_tax.income_tax, dec!(2879842));
        assert_eq!(result.net_salary, dec!(4303426));
    }

    #[test]
    fn allowance_above_cap_stays_taxable() {
        let _guard = init_test_tracing();
        let input = SalaryInput {
            allowances: TaxExemptAllowances {
                meal: dec!(300000),
                research: dec!(500000),
                ..Default::default()
            },
            ..SalaryInput::new(dec!(5000000))
        };

        let result = calculate(&input);

        assert_eq!(result.allowances.meal, dec!(200000));
        assert_eq!(result.allowances.research, dec!(500000));
        assert_eq!(result.allowances.total_exempt, dec!(700000));
        assert_eq!(result.allowances.excess_over_caps, dec!(100000));
        assert_eq!(result.taxable_monthly_salary, dec!(4300000));
    }

    #[test]
    fn child_tax_credit_by_count() {
        let config = TaxYearConfig::default();
        let brackets = TaxBracketTable::income_tax_2025();
        let calculator = SalaryCalculator::new(&config, &brackets);

        assert_eq!(calculator.child_tax_credit(0), dec!(0));
        assert_eq!(calculator.child_tax_credit(1), dec!(150000));
        assert_eq!(calculator.child_tax_credit(2), dec!(350000));
        assert_eq!(calculator.child_tax_credit(4), dec!(950000));
    }

    // =========================================================================
    // Incentive tests
    // =========================================================================

    #[test]
    fn incentive_within_bracket() {
        let input = SalaryInput {
            incentive: Some(dec!(10000000)),
            ..SalaryInput::new(dec!(5000000))
        };

        let incentive = calculate(&input).incentive.unwrap();

        assert_eq!(incentive.additional_income_tax, dec!(1425000));
        assert_eq!(incentive.additional_local_income_tax, dec!(142500));
        assert_eq!(incentive.net_incentive, dec!(8432500));
        assert!(!incentive.crossed_bracket);
    }

    #[test]
    fn incentive_crossing_bracket() {
        let input = SalaryInput {
            incentive: Some(dec!(20000000)),
            ..SalaryInput::new(dec!(5000000))
        };

        let incentive = calculate(&input).incentive.unwrap();

        assert_eq!(incentive.additional_income_tax, dec!(3829679));
        assert_eq!(incentive.additional_local_income_tax, dec!(382968));
        assert_eq!(incentive.net_incentive, dec!(15787353));
        assert_eq!(incentive.marginal_rate_before, dec!(0.15));
        assert_eq!(incentive.marginal_rate_after, dec!(0.24));
        assert!(incentive.crossed_bracket);
    }

    #[test]
    fn incentive_does_not_change_monthly_figures() {
        let plain = calculate(&SalaryInput::new(dec!(5000000)));
        let with = calculate(&SalaryInput {
            incentive: Some(dec!(20000000)),
            ..SalaryInput::new(dec!(5000000))
        });

        assert_eq!(with.net_salary, plain.net_salary);
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn rejects_negative_salary() {
        assert_eq!(
            calculate_salary(&SalaryInput::new(dec!(-1))),
            Err(SalaryError::NegativeSalary(dec!(-1)))
        );
    }

    #[test]
    fn rejects_negative_allowance() {
        let input = SalaryInput {
            allowances: TaxExemptAllowances {
                car: dec!(-5),
                ..Default::default()
            },
            ..SalaryInput::new(dec!(5000000))
        };

        assert_eq!(
            calculate_salary(&input),
            Err(SalaryError::NegativeAllowance {
                name: "car",
                amount: dec!(-5)
            })
        );
    }

    #[test]
    fn rejects_allowances_above_gross() {
        let input = SalaryInput {
            allowances: TaxExemptAllowances {
                other: dec!(2000000),
                ..Default::default()
            },
            ..SalaryInput::new(dec!(1000000))
        };

        assert_eq!(
            calculate_salary(&input),
            Err(SalaryError::AllowancesExceedSalary {
                allowances: dec!(2000000),
                gross: dec!(1000000)
            })
        );
    }

    #[test]
    fn rejects_negative_incentive() {
        let input = SalaryInput {
            incentive: Some(dec!(-100)),
            ..SalaryInput::new(dec!(5000000))
        };

        assert_eq!(
            calculate_salary(&input),
            Err(SalaryError::NegativeIncentive(dec!(-100)))
        );
    }

    #[test]
    fn rejects_salary_above_ceiling() {
        assert_eq!(
            calculate_salary(&SalaryInput::new(dec!(7000000000000000000000000000))),
            Err(SalaryError::AmountTooLarge {
                name: "gross monthly salary",
                amount: dec!(7000000000000000000000000000),
            })
        );
    }

    #[test]
    fn rejects_allowance_above_ceiling() {
        let input = SalaryInput {
            allowances: TaxExemptAllowances {
                research: MAX_AMOUNT + Decimal::ONE,
                ..Default::default()
            },
            ..SalaryInput::new(dec!(5000000))
        };

        assert_eq!(
            calculate_salary(&input),
            Err(SalaryError::AmountTooLarge {
                name: "research",
                amount: MAX_AMOUNT + Decimal::ONE,
            })
        );
    }

    #[test]
    fn salary_at_ceiling_with_incentive_completes() {
        let input = SalaryInput {
            incentive: Some(MAX_AMOUNT),
            ..SalaryInput::new(MAX_AMOUNT)
        };

        let result = calculate_salary(&input).unwrap();

        assert!(result.net_salary > Decimal::ZERO);
        assert!(result.net_salary < MAX_AMOUNT);
        assert!(result.incentive.is_some());
    }

    // =========================================================================
    // estimate_gross_salary tests
    // =========================================================================

    #[test]
    fn inversion_round_trips_five_million() {
        let input = NetToGrossInput {
            target_net_salary: dec!(4154318),
            allowances: TaxExemptAllowances::default(),
            dependents: 0,
            children: 0,
        };

        let estimate = estimate_gross_salary(&input).unwrap();

        assert!(estimate.converged);
        assert!(estimate.iterations <= 20);
        assert!((estimate.gross_monthly_salary - dec!(5000000)).abs() <= dec!(1000));
        assert!(estimate.net_salary >= dec!(4154318));
    }

    #[test]
    fn inversion_of_zero_target_is_zero() {
        let input = NetToGrossInput {
            target_net_salary: dec!(0),
            allowances: TaxExemptAllowances::default(),
            dependents: 0,
            children: 0,
        };

        let estimate = estimate_gross_salary(&input).unwrap();

        assert_eq!(estimate.gross_monthly_salary, dec!(0));
        assert_eq!(estimate.iterations, 0);
        assert!(estimate.converged);
    }

    #[test]
    fn inversion_respects_allowances() {
        let allowances = TaxExemptAllowances {
            meal: dec!(200000),
            ..Default::default()
        };
        let gross = calculate(&SalaryInput {
            allowances: allowances.clone(),
            ..SalaryInput::new(dec!(3500000))
        });

        let estimate = estimate_gross_salary(&NetToGrossInput {
            target_net_salary: gross.net_salary,
            allowances,
            dependents: 0,
            children: 0,
        })
        .unwrap();

        assert!((estimate.gross_monthly_salary - dec!(3500000)).abs() <= dec!(1000));
    }

    #[test]
    fn inversion_rejects_negative_target() {
        let input = NetToGrossInput {
            target_net_salary: dec!(-1),
            allowances: TaxExemptAllowances::default(),
            dependents: 0,
            children: 0,
        };

        assert_eq!(
            estimate_gross_salary(&input),
            Err(SalaryError::NegativeTargetNet(dec!(-1)))
        );
    }

    #[test]
    fn inversion_rejects_target_beyond_ceiling_net() {
        let input = NetToGrossInput {
            target_net_salary: dec!(900000000000000),
            allowances: TaxExemptAllowances::default(),
            dependents: 0,
            children: 0,
        };

        assert_eq!(
            estimate_gross_salary(&input),
            Err(SalaryError::TargetNetUnreachable(dec!(900000000000000)))
        );
    }

    #[test]
    fn inversion_search_stays_below_ceiling() {
        let input = NetToGrossInput {
            target_net_salary: dec!(400000000000000),
            allowances: TaxExemptAllowances::default(),
            dependents: 0,
            children: 0,
        };

        let estimate = estimate_gross_salary(&input).unwrap();

        assert!(estimate.gross_monthly_salary <= MAX_AMOUNT);
        assert!(estimate.net_salary >= dec!(400000000000000));
    }
}
