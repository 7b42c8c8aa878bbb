//! Loan and mortgage calculations with DSR and LTV regulation checks.
//!
//! A loan result always carries the amortization schedule. The DSR and LTV
//! sub-results are present only when their context is supplied:
//!
//! - **DSR** (debt service ratio): the new loan's annual debt service plus
//!   existing debt service over annual income, at the contract rate and at
//!   the contract rate plus a stress add-on for the rate type. The inverse
//!   problem, the largest principal that keeps DSR within the limit, is
//!   solved at both rates so the capacity lost to the stress add-on can be
//!   reported.
//! - **LTV** (loan to value): the base LTV for the regulatory zone, plus the
//!   first-time buyer bonus, held to the statutory ceiling.
//!
//! [`MortgageCalculator`] requires the LTV context.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use finance_core::{RateType, RepaymentMethod};
//! use finance_core::calculations::amortization::LoanInput;
//! use finance_core::calculations::loan::{DsrContext, LoanCalculationInput, calculate_loan};
//!
//! let input = LoanCalculationInput {
//!     terms: LoanInput {
//!         principal: dec!(300000000),
//!         annual_rate_percent: dec!(4),
//!         term_months: 360,
//!         method: RepaymentMethod::EqualPayment,
//!     },
//!     dsr: Some(DsrContext {
//!         annual_income: dec!(60000000),
//!         existing_annual_debt_payment: dec!(0),
//!         rate_type: RateType::Variable,
//!     }),
//!     ltv: None,
//! };
//!
//! let result = calculate_loan(&input).unwrap();
//! let dsr = result.dsr.unwrap();
//!
//! assert_eq!(dsr.dsr_percent, Some(dec!(28.64)));
//! assert_eq!(dsr.stressed_dsr_percent, Some(dec!(34.07)));
//! assert!(dsr.within_limit);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::amortization::{
    AmortizationError, AmortizationSchedule, LoanInput, build_schedule, first_payment,
    max_principal_for_payment, monthly_rate, validate_rate,
};
use crate::calculations::common::{MAX_AMOUNT, max, percent_of, round_won};
use crate::{RateType, RegulatoryZone, TaxYearConfig};

/// Errors that can occur during loan calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoanError {
    #[error(transparent)]
    Amortization(#[from] AmortizationError),

    #[error("annual income must not be negative, got {0}")]
    NegativeIncome(Decimal),

    #[error("existing annual debt payment must not be negative, got {0}")]
    NegativeExistingDebt(Decimal),

    #[error("property value must be positive, got {0}")]
    NonPositivePropertyValue(Decimal),

    #[error("{name} must not exceed {max}, got {amount}", max = MAX_AMOUNT)]
    AmountTooLarge { name: &'static str, amount: Decimal },
}

/// Borrower context for the DSR check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DsrContext {
    pub annual_income: Decimal,
    /// Annual principal and interest already owed on other loans.
    #[serde(default)]
    pub existing_annual_debt_payment: Decimal,
    pub rate_type: RateType,
}

/// Collateral context for the LTV check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LtvContext {
    pub property_value: Decimal,
    pub zone: RegulatoryZone,
    #[serde(default)]
    pub first_time_buyer: bool,
}

/// Input for [`LoanCalculator::calculate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanCalculationInput {
    pub terms: LoanInput,
    #[serde(default)]
    pub dsr: Option<DsrContext>,
    #[serde(default)]
    pub ltv: Option<LtvContext>,
}

/// DSR at the contract and stressed rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DsrResult {
    pub rate_type: RateType,
    /// Percentage points added to the contract rate.
    pub stress_add_on: Decimal,
    pub stressed_annual_rate_percent: Decimal,
    /// First monthly payment × 12 at the contract rate.
    pub annual_payment: Decimal,
    pub stressed_annual_payment: Decimal,
    /// `None` when annual income is zero.
    pub dsr_percent: Option<Decimal>,
    pub stressed_dsr_percent: Option<Decimal>,
    pub limit_percent: Decimal,
    /// Stressed DSR is at or below the limit.
    pub within_limit: bool,
    /// Largest principal that keeps DSR at the limit, at the contract rate.
    pub max_principal: Decimal,
    pub stressed_max_principal: Decimal,
    /// `max_principal − stressed_max_principal`.
    pub capacity_reduction: Decimal,
}

/// LTV limit and the requested loan's position against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LtvResult {
    pub zone: RegulatoryZone,
    pub base_ltv_percent: Decimal,
    pub first_time_buyer_bonus: Decimal,
    /// `min(base + bonus, ceiling)`.
    pub applied_ltv_percent: Decimal,
    pub max_loan: Decimal,
    pub requested_ltv_percent: Option<Decimal>,
    pub within_limit: bool,
}

/// Result of a loan calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanResult {
    pub schedule: AmortizationSchedule,
    pub dsr: Option<DsrResult>,
    pub ltv: Option<LtvResult>,
}

/// Input for [`MortgageCalculator::calculate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MortgageInput {
    pub terms: LoanInput,
    pub ltv: LtvContext,
    #[serde(default)]
    pub dsr: Option<DsrContext>,
}

/// Result of a mortgage calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MortgageResult {
    pub schedule: AmortizationSchedule,
    pub ltv: LtvResult,
    pub dsr: Option<DsrResult>,
    /// Property value not covered by the loan.
    pub down_payment: Decimal,
}

/// Calculator for loans with optional regulatory checks.
#[derive(Debug, Clone)]
pub struct LoanCalculator<'a> {
    config: &'a TaxYearConfig,
}

impl<'a> LoanCalculator<'a> {
    pub fn new(config: &'a TaxYearConfig) -> Self {
        Self { config }
    }

    /// Builds the schedule and whichever regulatory checks have context.
    ///
    /// # Errors
    ///
    /// Returns [`LoanError`] for invalid loan terms, a stressed rate above
    /// 100%, negative income or debt, or a non-positive property value.
    pub fn calculate(
        &self,
        input: &LoanCalculationInput,
    ) -> Result<LoanResult, LoanError> {
        let schedule = build_schedule(&input.terms)?;

        let dsr = input
            .dsr
            .as_ref()
            .map(|context| self.dsr(&input.terms, context))
            .transpose()?;
        let ltv = input
            .ltv
            .as_ref()
            .map(|context| self.ltv(input.terms.principal, context))
            .transpose()?;

        Ok(LoanResult { schedule, dsr, ltv })
    }

    /// DSR at the contract rate and at the stressed rate.
    ///
    /// # Errors
    ///
    /// Returns [`LoanError`] for invalid terms or a negative context value.
    pub fn dsr(
        &self,
        terms: &LoanInput,
        context: &DsrContext,
    ) -> Result<DsrResult, LoanError> {
        terms.validate()?;
        if context.annual_income < Decimal::ZERO {
            return Err(LoanError::NegativeIncome(context.annual_income));
        }
        if context.existing_annual_debt_payment < Decimal::ZERO {
            return Err(LoanError::NegativeExistingDebt(
                context.existing_annual_debt_payment,
            ));
        }
        for (name, amount) in [
            ("annual income", context.annual_income),
            ("existing annual debt payment", context.existing_annual_debt_payment),
        ] {
            if amount > MAX_AMOUNT {
                return Err(LoanError::AmountTooLarge { name, amount });
            }
        }

        let regulation = &self.config.loan;
        let stress_add_on = regulation.stress_add_on(context.rate_type);
        let stressed_rate = terms.annual_rate_percent + stress_add_on;
        validate_rate(stressed_rate)?;

        let contract = monthly_rate(terms.annual_rate_percent);
        let stressed = monthly_rate(stressed_rate);
        let principal = round_won(terms.principal);

        let annual_payment = self.annual_debt_service(principal, contract, terms);
        let stressed_annual_payment = self.annual_debt_service(principal, stressed, terms);

        let existing = context.existing_annual_debt_payment;
        let income = context.annual_income;
        let dsr_percent = percent_of(annual_payment + existing, income);
        let stressed_dsr_percent = percent_of(stressed_annual_payment + existing, income);
        let within_limit =
            stressed_dsr_percent.is_some_and(|dsr| dsr <= regulation.dsr_limit_percent);

        let allowed_monthly = max(
            income * regulation.dsr_limit_percent / Decimal::ONE_HUNDRED - existing,
            Decimal::ZERO,
        ) / Decimal::from(12);
        let max_principal = self.max_principal(allowed_monthly, contract, terms);
        let stressed_max_principal = self.max_principal(allowed_monthly, stressed, terms);

        if !within_limit {
            warn!(
                rate_type = context.rate_type.as_str(),
                stressed_dsr = ?stressed_dsr_percent,
                limit = %regulation.dsr_limit_percent,
                "Loan exceeds DSR limit at stressed rate"
            );
        }

        Ok(DsrResult {
            rate_type: context.rate_type,
            stress_add_on,
            stressed_annual_rate_percent: stressed_rate,
            annual_payment,
            stressed_annual_payment,
            dsr_percent,
            stressed_dsr_percent,
            limit_percent: regulation.dsr_limit_percent,
            within_limit,
            max_principal,
            stressed_max_principal,
            capacity_reduction: max_principal - stressed_max_principal,
        })
    }

    /// LTV limit for the zone and the requested principal's ratio.
    ///
    /// # Errors
    ///
    /// Returns [`LoanError::NonPositivePropertyValue`] for a property value
    /// of zero or less.
    pub fn ltv(
        &self,
        principal: Decimal,
        context: &LtvContext,
    ) -> Result<LtvResult, LoanError> {
        if context.property_value <= Decimal::ZERO {
            return Err(LoanError::NonPositivePropertyValue(context.property_value));
        }
        if context.property_value > MAX_AMOUNT {
            return Err(LoanError::AmountTooLarge {
                name: "property value",
                amount: context.property_value,
            });
        }

        let regulation = &self.config.loan;
        let base_ltv_percent = regulation.base_ltv(context.zone);
        let first_time_buyer_bonus = if context.first_time_buyer {
            regulation.first_time_buyer_bonus
        } else {
            Decimal::ZERO
        };
        let applied_ltv_percent =
            (base_ltv_percent + first_time_buyer_bonus).min(regulation.ltv_ceiling);
        let max_loan =
            (context.property_value * applied_ltv_percent / Decimal::ONE_HUNDRED).floor();
        let within_limit = principal <= max_loan;

        if !within_limit {
            warn!(
                zone = context.zone.as_str(),
                principal = %principal,
                max_loan = %max_loan,
                "Loan exceeds LTV limit"
            );
        }

        Ok(LtvResult {
            zone: context.zone,
            base_ltv_percent,
            first_time_buyer_bonus,
            applied_ltv_percent,
            max_loan,
            requested_ltv_percent: percent_of(principal, context.property_value),
            within_limit,
        })
    }

    /// Current DSR limit in percent.
    pub fn dsr_limit_percent(&self) -> Decimal {
        self.config.loan.dsr_limit_percent
    }

    /// Stress add-on for every rate type.
    pub fn stress_rates(&self) -> Vec<(RateType, Decimal)> {
        self.config.loan.stress_table()
    }

    /// Base LTV for every regulatory zone.
    pub fn ltv_by_zone(&self) -> Vec<(RegulatoryZone, Decimal)> {
        self.config.loan.ltv_table()
    }

    /// First monthly payment rounded to the won, times 12.
    fn annual_debt_service(
        &self,
        principal: Decimal,
        rate: Decimal,
        terms: &LoanInput,
    ) -> Decimal {
        round_won(first_payment(principal, rate, terms.term_months, terms.method)) * Decimal::from(12)
    }

    fn max_principal(
        &self,
        monthly_payment: Decimal,
        rate: Decimal,
        terms: &LoanInput,
    ) -> Decimal {
        max_principal_for_payment(monthly_payment, rate, terms.term_months, terms.method).floor()
    }
}

/// Calculator for home-purchase loans, where the LTV check is mandatory.
#[derive(Debug, Clone)]
pub struct MortgageCalculator<'a> {
    loans: LoanCalculator<'a>,
}

impl<'a> MortgageCalculator<'a> {
    pub fn new(config: &'a TaxYearConfig) -> Self {
        Self {
            loans: LoanCalculator::new(config),
        }
    }

    /// Builds the schedule, the LTV check and the optional DSR check.
    ///
    /// # Errors
    ///
    /// See [`LoanCalculator::calculate`].
    pub fn calculate(
        &self,
        input: &MortgageInput,
    ) -> Result<MortgageResult, LoanError> {
        let schedule = build_schedule(&input.terms)?;
        let ltv = self.loans.ltv(input.terms.principal, &input.ltv)?;
        let dsr = input
            .dsr
            .as_ref()
            .map(|context| self.loans.dsr(&input.terms, context))
            .transpose()?;

        debug!(
            property_value = %input.ltv.property_value,
            principal = %schedule.principal,
            within_ltv = ltv.within_limit,
            "Calculated mortgage"
        );

        Ok(MortgageResult {
            down_payment: max(input.ltv.property_value - schedule.principal, Decimal::ZERO),
            schedule,
            ltv,
            dsr,
        })
    }

    /// Largest principal allowed by LTV alone.
    ///
    /// # Errors
    ///
    /// See [`LoanCalculator::ltv`].
    pub fn max_loan(
        &self,
        context: &LtvContext,
    ) -> Result<Decimal, LoanError> {
        self.loans
            .ltv(Decimal::ZERO, context)
            .map(|result| result.max_loan)
    }
}

/// Calculates a loan with the built-in 2025 regulation.
///
/// # Errors
///
/// See [`LoanCalculator::calculate`].
pub fn calculate_loan(input: &LoanCalculationInput) -> Result<LoanResult, LoanError> {
    let config = TaxYearConfig::default();
    LoanCalculator::new(&config).calculate(input)
}

/// Calculates a mortgage with the built-in 2025 regulation.
///
/// # Errors
///
/// See [`MortgageCalculator::calculate`].
pub fn calculate_mortgage(input: &MortgageInput) -> Result<MortgageResult, LoanError> {
    let config = TaxYearConfig::default();
    MortgageCalculator::new(&config).calculate(input)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::RepaymentMethod;

    fn thirty_year_terms(method: RepaymentMethod) -> LoanInput {
        LoanInput {
            principal: dec!(300000000),
            annual_rate_percent: dec!(4),
            term_months: 360,
            method,
        }
    }

    fn income_context(
        existing: Decimal,
        rate_type: RateType,
    ) -> DsrContext {
        DsrContext {
            annual_income: dec!(60000000),
            existing_annual_debt_payment: existing,
            rate_type,
        }
    }

    fn dsr(
        terms: &LoanInput,
        context: &DsrContext,
    ) -> DsrResult {
        let config = TaxYearConfig::default();
        LoanCalculator::new(&config).dsr(terms, context).unwrap()
    }

    fn ltv(
        principal: Decimal,
        context: &LtvContext,
    ) -> LtvResult {
        let config = TaxYearConfig::default();
        LoanCalculator::new(&config).ltv(principal, context).unwrap()
    }

    // =========================================================================
    // calculate tests
    // =========================================================================

    #[test]
    fn loan_without_context_has_only_schedule() {
        let input = LoanCalculationInput {
            terms: LoanInput {
                principal: dec!(100000000),
                annual_rate_percent: dec!(5),
                term_months: 12,
                method: RepaymentMethod::EqualPayment,
            },
            dsr: None,
            ltv: None,
        };

        let result = calculate_loan(&input).unwrap();

        assert_eq!(result.schedule.entries.len(), 12);
        assert_eq!(result.schedule.first_payment, dec!(8560748));
        assert_eq!(result.dsr, None);
        assert_eq!(result.ltv, None);
    }

    #[test]
    fn loan_rejects_invalid_terms() {
        let input = LoanCalculationInput {
            terms: LoanInput {
                principal: dec!(-1),
                annual_rate_percent: dec!(5),
                term_months: 12,
                method: RepaymentMethod::EqualPayment,
            },
            dsr: None,
            ltv: None,
        };

        assert_eq!(
            calculate_loan(&input),
            Err(LoanError::Amortization(AmortizationError::NegativePrincipal(
                dec!(-1)
            )))
        );
    }

    // =========================================================================
    // dsr tests
    // =========================================================================

    #[test]
    fn dsr_at_contract_and_stressed_rate() {
        let result = dsr(
            &thirty_year_terms(RepaymentMethod::EqualPayment),
            &income_context(dec!(0), RateType::Variable),
        );

        assert_eq!(result.stress_add_on, dec!(1.5));
        assert_eq!(result.stressed_annual_rate_percent, dec!(5.5));
        assert_eq!(result.annual_payment, dec!(17186952));
        assert_eq!(result.stressed_annual_payment, dec!(20440404));
        assert_eq!(result.dsr_percent, Some(dec!(28.64)));
        assert_eq!(result.stressed_dsr_percent, Some(dec!(34.07)));
        assert!(result.within_limit);
    }

    #[test]
    fn dsr_max_principal_shrinks_under_stress() {
        let result = dsr(
            &thirty_year_terms(RepaymentMethod::EqualPayment),
            &income_context(dec!(0), RateType::Variable),
        );

        assert_eq!(result.max_principal, dec!(418922480));
        assert_eq!(result.stressed_max_principal, dec!(352243526));
        assert_eq!(result.capacity_reduction, dec!(66678954));
    }

    #[test]
    fn dsr_counts_existing_debt() {
        let result = dsr(
            &thirty_year_terms(RepaymentMethod::EqualPayment),
            &income_context(dec!(6000000), RateType::Mixed),
        );

        assert_eq!(result.dsr_percent, Some(dec!(38.64)));
        assert_eq!(result.stressed_dsr_percent, Some(dec!(41.30)));
        assert!(!result.within_limit);
        assert_eq!(result.max_principal, dec!(314191860));
        assert_eq!(result.stressed_max_principal, dec!(287550591));
    }

    #[test]
    fn dsr_for_equal_principal_uses_first_payment() {
        let result = dsr(
            &thirty_year_terms(RepaymentMethod::EqualPrincipal),
            &income_context(dec!(0), RateType::Variable),
        );

        // (833,333.33 + 1,000,000) rounded, × 12
        assert_eq!(result.annual_payment, dec!(21999996));
        assert_eq!(result.dsr_percent, Some(dec!(36.67)));
        assert_eq!(result.stressed_dsr_percent, Some(dec!(44.17)));
        assert_eq!(result.max_principal, dec!(327272727));
    }

    #[test]
    fn fixed_rate_has_no_stress() {
        let result = dsr(
            &thirty_year_terms(RepaymentMethod::EqualPayment),
            &income_context(dec!(0), RateType::Fixed),
        );

        assert_eq!(result.annual_payment, result.stressed_annual_payment);
        assert_eq!(result.capacity_reduction, dec!(0));
    }

    #[test]
    fn dsr_with_zero_income_is_undefined() {
        let context = DsrContext {
            annual_income: dec!(0),
            existing_annual_debt_payment: dec!(0),
            rate_type: RateType::Fixed,
        };

        let result = dsr(&thirty_year_terms(RepaymentMethod::EqualPayment), &context);

        assert_eq!(result.dsr_percent, None);
        assert_eq!(result.stressed_dsr_percent, None);
        assert!(!result.within_limit);
        assert_eq!(result.max_principal, dec!(0));
    }

    #[test]
    fn dsr_rejects_negative_income() {
        let config = TaxYearConfig::default();
        let context = DsrContext {
            annual_income: dec!(-1),
            existing_annual_debt_payment: dec!(0),
            rate_type: RateType::Fixed,
        };

        assert_eq!(
            LoanCalculator::new(&config)
                .dsr(&thirty_year_terms(RepaymentMethod::EqualPayment), &context),
            Err(LoanError::NegativeIncome(dec!(-1)))
        );
    }

    #[test]
    fn dsr_rejects_income_above_ceiling() {
        let config = TaxYearConfig::default();
        let context = DsrContext {
            annual_income: dec!(7000000000000000000000000000),
            existing_annual_debt_payment: dec!(0),
            rate_type: RateType::Fixed,
        };

        assert_eq!(
            LoanCalculator::new(&config)
                .dsr(&thirty_year_terms(RepaymentMethod::EqualPayment), &context),
            Err(LoanError::AmountTooLarge {
                name: "annual income",
                amount: dec!(7000000000000000000000000000),
            })
        );
    }

    #[test]
    fn loan_rejects_principal_above_ceiling() {
        let input = LoanCalculationInput {
            terms: LoanInput {
                principal: MAX_AMOUNT + Decimal::ONE,
                ..thirty_year_terms(RepaymentMethod::EqualPayment)
            },
            dsr: Some(income_context(dec!(0), RateType::Variable)),
            ltv: None,
        };

        assert_eq!(
            calculate_loan(&input),
            Err(LoanError::Amortization(AmortizationError::PrincipalTooLarge(
                MAX_AMOUNT + Decimal::ONE
            )))
        );
    }

    #[test]
    fn dsr_rejects_stressed_rate_above_limit() {
        let config = TaxYearConfig::default();
        let terms = LoanInput {
            annual_rate_percent: dec!(99.5),
            ..thirty_year_terms(RepaymentMethod::EqualPayment)
        };

        assert_eq!(
            LoanCalculator::new(&config).dsr(&terms, &income_context(dec!(0), RateType::Variable)),
            Err(LoanError::Amortization(AmortizationError::RateTooHigh(
                dec!(101.0)
            )))
        );
    }

    // =========================================================================
    // ltv tests
    // =========================================================================

    #[test]
    fn ltv_by_zone_without_bonus() {
        let context = LtvContext {
            property_value: dec!(500000000),
            zone: RegulatoryZone::AdjustmentTarget,
            first_time_buyer: false,
        };

        let result = ltv(dec!(300000000), &context);

        assert_eq!(result.applied_ltv_percent, dec!(60));
        assert_eq!(result.max_loan, dec!(300000000));
        assert_eq!(result.requested_ltv_percent, Some(dec!(60.00)));
        assert!(result.within_limit);
    }

    #[test]
    fn first_time_buyer_bonus_is_added() {
        let context = LtvContext {
            property_value: dec!(500000000),
            zone: RegulatoryZone::Speculation,
            first_time_buyer: true,
        };

        let result = ltv(dec!(300000000), &context);

        assert_eq!(result.base_ltv_percent, dec!(40));
        assert_eq!(result.first_time_buyer_bonus, dec!(20));
        assert_eq!(result.applied_ltv_percent, dec!(60));
    }

    #[test]
    fn ltv_is_held_to_ceiling() {
        let context = LtvContext {
            property_value: dec!(500000000),
            zone: RegulatoryZone::NonRegulated,
            first_time_buyer: true,
        };

        let result = ltv(dec!(450000000), &context);

        assert_eq!(result.applied_ltv_percent, dec!(80));
        assert_eq!(result.max_loan, dec!(400000000));
        assert!(!result.within_limit);
    }

    #[test]
    fn ltv_rejects_zero_property_value() {
        let config = TaxYearConfig::default();
        let context = LtvContext {
            property_value: dec!(0),
            zone: RegulatoryZone::NonRegulated,
            first_time_buyer: false,
        };

        assert_eq!(
            LoanCalculator::new(&config).ltv(dec!(1), &context),
            Err(LoanError::NonPositivePropertyValue(dec!(0)))
        );
    }

    #[test]
    fn ltv_rejects_property_value_above_ceiling() {
        let config = TaxYearConfig::default();
        let context = LtvContext {
            property_value: dec!(7000000000000000000000000000),
            zone: RegulatoryZone::NonRegulated,
            first_time_buyer: false,
        };

        assert!(matches!(
            LoanCalculator::new(&config).ltv(dec!(1), &context),
            Err(LoanError::AmountTooLarge { name: "property value", .. })
        ));
    }

    // =========================================================================
    // lookup tests
    // =========================================================================

    #[test]
    fn lookup_tables_expose_regulation() {
        let config = TaxYearConfig::default();
        let calculator = LoanCalculator::new(&config);

        assert_eq!(calculator.dsr_limit_percent(), dec!(40));
        assert_eq!(calculator.stress_rates().len(), 4);
        assert_eq!(
            calculator.ltv_by_zone()[0],
            (RegulatoryZone::Speculation, dec!(40))
        );
    }

    // =========================================================================
    // MortgageCalculator tests
    // =========================================================================

    #[test]
    fn mortgage_reports_ltv_and_down_payment() {
        let input = MortgageInput {
            terms: thirty_year_terms(RepaymentMethod::EqualPayment),
            ltv: LtvContext {
                property_value: dec!(500000000),
                zone: RegulatoryZone::NonRegulated,
                first_time_buyer: false,
            },
            dsr: Some(income_context(dec!(0), RateType::Variable)),
        };

        let result = calculate_mortgage(&input).unwrap();

        assert_eq!(result.schedule.entries.len(), 360);
        assert_eq!(result.ltv.max_loan, dec!(350000000));
        assert!(result.ltv.within_limit);
        assert_eq!(result.down_payment, dec!(200000000));
        assert!(result.dsr.unwrap().within_limit);
    }

    #[test]
    fn mortgage_max_loan_by_ltv() {
        let config = TaxYearConfig::default();
        let context = LtvContext {
            property_value: dec!(900000000),
            zone: RegulatoryZone::OverheatedSpeculation,
            first_time_buyer: false,
        };

        assert_eq!(
            MortgageCalculator::new(&config).max_loan(&context),
            Ok(dec!(450000000))
        );
    }
}
