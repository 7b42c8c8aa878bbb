//! Statutory constants for one tax year.
//!
//! [`TaxYearConfig::default`] returns the built-in 2025 values. Every
//! sub-structure is `#[serde(default)]`, so a TOML file that names only a
//! handful of fields overrides just those and keeps the rest.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::loan_terms::{RateType, RegulatoryZone};

/// Errors raised by [`TaxYearConfig::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be between 0 and 1, got {value}")]
    FractionOutOfRange { field: &'static str, value: Decimal },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: Decimal },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: Decimal },

    #[error("pension base floor {floor} exceeds ceiling {ceiling}")]
    PensionBaseRange { floor: Decimal, ceiling: Decimal },

    #[error("{0} deduction schedule is malformed")]
    MalformedSchedule(&'static str),

    #[error("minimum wage table has duplicate year {0}")]
    DuplicateMinimumWageYear(i32),
}

/// One band of a piecewise-linear deduction schedule.
///
/// Within the band the amount is `base + rate × (value − lower)`, where
/// `lower` is the previous band's upper limit (zero for the first band).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionBand {
    pub upper_limit: Option<Decimal>,
    pub base: Decimal,
    pub rate: Decimal,
}

impl DeductionBand {
    pub fn new(
        upper_limit: Option<Decimal>,
        base: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            upper_limit,
            base,
            rate,
        }
    }
}

/// A piecewise-linear deduction with an optional overall cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionSchedule {
    pub bands: Vec<DeductionBand>,
    pub cap: Option<Decimal>,
}

impl DeductionSchedule {
    /// Deduction for `value`; zero for non-positive values.
    pub fn amount(
        &self,
        value: Decimal,
    ) -> Decimal {
        if value <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let mut lower = Decimal::ZERO;
        let mut amount = Decimal::ZERO;
        for band in &self.bands {
            amount = band.base + band.rate * (value - lower);
            match band.upper_limit {
                Some(limit) if value > limit => lower = limit,
                _ => break,
            }
        }

        match self.cap {
            Some(cap) => amount.min(cap),
            None => amount,
        }
    }

    fn validate(
        &self,
        name: &'static str,
    ) -> Result<(), ConfigError> {
        let Some(last) = self.bands.last() else {
            return Err(ConfigError::MalformedSchedule(name));
        };
        if last.upper_limit.is_some() {
            return Err(ConfigError::MalformedSchedule(name));
        }

        let mut lower = Decimal::ZERO;
        for band in &self.bands[..self.bands.len() - 1] {
            match band.upper_limit {
                Some(limit) if limit > lower => lower = limit,
                _ => return Err(ConfigError::MalformedSchedule(name)),
            }
        }
        if self.bands.iter().any(|b| b.rate < Decimal::ZERO || b.base < Decimal::ZERO) {
            return Err(ConfigError::MalformedSchedule(name));
        }
        Ok(())
    }
}

/// Employee-side social insurance rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsuranceRates {
    pub national_pension_rate: Decimal,
    /// Monthly pension base is clamped to `[floor, ceiling]`.
    pub pension_base_floor: Decimal,
    pub pension_base_ceiling: Decimal,
    pub health_insurance_rate: Decimal,
    /// Applied to the health insurance premium, not to salary.
    pub long_term_care_rate: Decimal,
    pub employment_insurance_rate: Decimal,
}

impl Default for InsuranceRates {
    fn default() -> Self {
        Self {
            national_pension_rate: dec!(0.045),
            pension_base_floor: dec!(390000),
            pension_base_ceiling: dec!(6170000),
            health_insurance_rate: dec!(0.03545),
            long_term_care_rate: dec!(0.1295),
            employment_insurance_rate: dec!(0.009),
        }
    }
}

/// Monthly caps on tax-exempt allowances. Research and other allowances are uncapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllowanceCaps {
    pub meal: Decimal,
    pub car: Decimal,
    pub childcare: Decimal,
}

impl Default for AllowanceCaps {
    fn default() -> Self {
        Self {
            meal: dec!(200000),
            car: dec!(200000),
            childcare: dec!(200000),
        }
    }
}

/// Earned-income deductions and credits used by the salary pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarnedIncomeRules {
    /// Deduction over annual wage.
    pub deduction: DeductionSchedule,
    /// Per person, self included.
    pub personal_deduction: Decimal,

    /// Credit is `low_rate × tax` up to `threshold`,
    /// then `high_base + high_rate × (tax − threshold)`.
    pub credit_low_rate: Decimal,
    pub credit_threshold: Decimal,
    pub credit_high_base: Decimal,
    pub credit_high_rate: Decimal,

    /// Credit ceiling by annual wage tier.
    pub credit_cap_tier1_wage: Decimal,
    pub credit_cap_tier1: Decimal,
    pub credit_cap_tier2_wage: Decimal,
    pub credit_cap_tier2_slope: Decimal,
    pub credit_cap_tier2_floor: Decimal,
    pub credit_cap_tier3_slope: Decimal,
    pub credit_cap_tier3_floor: Decimal,

    pub child_credit_first: Decimal,
    pub child_credit_second: Decimal,
    pub child_credit_additional: Decimal,

    /// First guess for gross salary is `target net ÷ ratio`.
    pub net_to_gross_initial_ratio: Decimal,
    pub net_to_gross_tolerance: Decimal,
    pub net_to_gross_max_iterations: u32,
}

impl Default for EarnedIncomeRules {
    fn default() -> Self {
        Self {
            deduction: DeductionSchedule {
                bands: vec![
                    DeductionBand::new(Some(dec!(5000000)), dec!(0), dec!(0.70)),
                    DeductionBand::new(Some(dec!(15000000)), dec!(3500000), dec!(0.40)),
                    DeductionBand::new(Some(dec!(45000000)), dec!(7500000), dec!(0.15)),
                    DeductionBand::new(Some(dec!(100000000)), dec!(12000000), dec!(0.05)),
                    DeductionBand::new(None, dec!(14750000), dec!(0.02)),
                ],
                cap: Some(dec!(20000000)),
            },
            personal_deduction: dec!(1500000),
            credit_low_rate: dec!(0.55),
            credit_threshold: dec!(1300000),
            credit_high_base: dec!(715000),
            credit_high_rate: dec!(0.30),
            credit_cap_tier1_wage: dec!(33000000),
            credit_cap_tier1: dec!(740000),
            credit_cap_tier2_wage: dec!(70000000),
            credit_cap_tier2_slope: dec!(0.008),
            credit_cap_tier2_floor: dec!(660000),
            credit_cap_tier3_slope: dec!(0.5),
            credit_cap_tier3_floor: dec!(500000),
            child_credit_first: dec!(150000),
            child_credit_second: dec!(200000),
            child_credit_additional: dec!(300000),
            net_to_gross_initial_ratio: dec!(0.82),
            net_to_gross_tolerance: dec!(1000),
            net_to_gross_max_iterations: 20,
        }
    }
}

/// DSR and LTV regulation parameters. Percentages are in points (40 = 40%).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanRegulation {
    pub dsr_limit_percent: Decimal,

    pub stress_fixed: Decimal,
    pub stress_variable: Decimal,
    pub stress_mixed: Decimal,
    pub stress_periodic: Decimal,

    pub ltv_speculation: Decimal,
    pub ltv_overheated: Decimal,
    pub ltv_adjustment: Decimal,
    pub ltv_non_regulated: Decimal,
    pub first_time_buyer_bonus: Decimal,
    pub ltv_ceiling: Decimal,
}

impl Default for LoanRegulation {
    fn default() -> Self {
        Self {
            dsr_limit_percent: dec!(40),
            stress_fixed: dec!(0),
            stress_variable: dec!(1.5),
            stress_mixed: dec!(0.75),
            stress_periodic: dec!(0.375),
            ltv_speculation: dec!(40),
            ltv_overheated: dec!(50),
            ltv_adjustment: dec!(60),
            ltv_non_regulated: dec!(70),
            first_time_buyer_bonus: dec!(20),
            ltv_ceiling: dec!(80),
        }
    }
}

impl LoanRegulation {
    /// Stress add-on in percentage points for the given rate type.
    pub fn stress_add_on(
        &self,
        rate_type: RateType,
    ) -> Decimal {
        match rate_type {
            RateType::Fixed => self.stress_fixed,
            RateType::Variable => self.stress_variable,
            RateType::Mixed => self.stress_mixed,
            RateType::Periodic => self.stress_periodic,
        }
    }

    /// Base LTV in percent for the given zone, before any bonus.
    pub fn base_ltv(
        &self,
        zone: RegulatoryZone,
    ) -> Decimal {
        match zone {
            RegulatoryZone::Speculation => self.ltv_speculation,
            RegulatoryZone::OverheatedSpeculation => self.ltv_overheated,
            RegulatoryZone::AdjustmentTarget => self.ltv_adjustment,
            RegulatoryZone::NonRegulated => self.ltv_non_regulated,
        }
    }

    /// Stress add-ons for every rate type, for display.
    pub fn stress_table(&self) -> Vec<(RateType, Decimal)> {
        RateType::ALL
            .iter()
            .map(|&t| (t, self.stress_add_on(t)))
            .collect()
    }

    /// Base LTV for every zone, for display.
    pub fn ltv_table(&self) -> Vec<(RegulatoryZone, Decimal)> {
        RegulatoryZone::ALL
            .iter()
            .map(|&z| (z, self.base_ltv(z)))
            .collect()
    }
}

/// Simplified National Pension projection parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PensionParameters {
    pub contribution_rate: Decimal,
    pub replacement_rate: Decimal,
    pub full_contribution_years: u32,
    pub default_start_age: u32,
    pub life_expectancy: u32,
}

impl Default for PensionParameters {
    fn default() -> Self {
        Self {
            contribution_rate: dec!(0.09),
            replacement_rate: dec!(0.43),
            full_contribution_years: 40,
            default_start_age: 65,
            life_expectancy: 83,
        }
    }
}

/// Severance eligibility and retirement-income tax parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeveranceParameters {
    pub eligibility_days: i64,
    /// Deduction over whole service years.
    pub service_year_deduction: DeductionSchedule,
    pub tax_credit_rate: Decimal,
    pub tax_credit_cap: Decimal,
}

impl Default for SeveranceParameters {
    fn default() -> Self {
        Self {
            eligibility_days: 365,
            service_year_deduction: DeductionSchedule {
                bands: vec![
                    DeductionBand::new(Some(dec!(5)), dec!(0), dec!(1000000)),
                    DeductionBand::new(Some(dec!(10)), dec!(5000000), dec!(2000000)),
                    DeductionBand::new(Some(dec!(20)), dec!(15000000), dec!(2500000)),
                    DeductionBand::new(None, dec!(40000000), dec!(3000000)),
                ],
                cap: None,
            },
            tax_credit_rate: dec!(0.05),
            tax_credit_cap: dec!(500000),
        }
    }
}

/// Parameters for the standalone income tax calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomeTaxParameters {
    pub tax_credit_rate: Decimal,
    pub tax_credit_cap: Decimal,
}

impl Default for IncomeTaxParameters {
    fn default() -> Self {
        Self {
            tax_credit_rate: dec!(0.05),
            tax_credit_cap: dec!(500000),
        }
    }
}

/// Capital gains (transfer income) tax parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapitalGainsParameters {
    pub basic_deduction: Decimal,
    pub holding_min_years: u32,
    pub holding_rate_per_year: Decimal,
    pub holding_max_rate: Decimal,
    pub multi_home_multiplier: Decimal,
}

impl Default for CapitalGainsParameters {
    fn default() -> Self {
        Self {
            basic_deduction: dec!(2500000),
            holding_min_years: 3,
            holding_rate_per_year: dec!(0.08),
            holding_max_rate: dec!(0.80),
            multi_home_multiplier: dec!(1.2),
        }
    }
}

impl CapitalGainsParameters {
    /// Long-term holding deduction rate for a whole number of holding years.
    pub fn holding_deduction_rate(
        &self,
        holding_years: u32,
    ) -> Decimal {
        if holding_years < self.holding_min_years {
            return Decimal::ZERO;
        }
        (self.holding_rate_per_year * Decimal::from(holding_years)).min(self.holding_max_rate)
    }

    /// Deduction rate for each holding year up to the one that reaches the maximum.
    pub fn holding_deduction_table(&self) -> Vec<(u32, Decimal)> {
        let mut table = Vec::new();
        for years in 0.. {
            let rate = self.holding_deduction_rate(years);
            table.push((years, rate));
            if rate >= self.holding_max_rate || years >= 100 {
                break;
            }
        }
        table
    }
}

/// Hourly minimum wage for one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimumWageRate {
    pub year: i32,
    pub hourly: Decimal,
}

/// Minimum wage by year plus the statutory monthly hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimumWageTable {
    /// 40 weekly hours plus paid weekly holiday, averaged per month.
    pub statutory_monthly_hours: Decimal,
    pub rates: Vec<MinimumWageRate>,
}

impl Default for MinimumWageTable {
    fn default() -> Self {
        Self {
            statutory_monthly_hours: dec!(209),
            rates: vec![
                MinimumWageRate {
                    year: 2024,
                    hourly: dec!(9860),
                },
                MinimumWageRate {
                    year: 2025,
                    hourly: dec!(10030),
                },
                MinimumWageRate {
                    year: 2026,
                    hourly: dec!(10320),
                },
            ],
        }
    }
}

impl MinimumWageTable {
    pub fn hourly_for(
        &self,
        year: i32,
    ) -> Option<Decimal> {
        self.rates.iter().find(|r| r.year == year).map(|r| r.hourly)
    }
}

/// Every statutory constant the calculators consult.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxYearConfig {
    pub tax_year: i32,
    /// Local income tax as a fraction of national income tax.
    pub local_income_tax_rate: Decimal,
    pub insurance: InsuranceRates,
    pub allowances: AllowanceCaps,
    pub earned_income: EarnedIncomeRules,
    pub loan: LoanRegulation,
    pub pension: PensionParameters,
    pub severance: SeveranceParameters,
    pub income_tax: IncomeTaxParameters,
    pub capital_gains: CapitalGainsParameters,
    pub minimum_wage: MinimumWageTable,
}

impl Default for TaxYearConfig {
    fn default() -> Self {
        Self {
            tax_year: 2025,
            local_income_tax_rate: dec!(0.10),
            insurance: InsuranceRates::default(),
            allowances: AllowanceCaps::default(),
            earned_income: EarnedIncomeRules::default(),
            loan: LoanRegulation::default(),
            pension: PensionParameters::default(),
            severance: SeveranceParameters::default(),
            income_tax: IncomeTaxParameters::default(),
            capital_gains: CapitalGainsParameters::default(),
            minimum_wage: MinimumWageTable::default(),
        }
    }
}

fn check_fraction(
    field: &'static str,
    value: Decimal,
) -> Result<(), ConfigError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(ConfigError::FractionOutOfRange { field, value });
    }
    Ok(())
}

fn check_non_negative(
    field: &'static str,
    value: Decimal,
) -> Result<(), ConfigError> {
    if value < Decimal::ZERO {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

fn check_positive(
    field: &'static str,
    value: Decimal,
) -> Result<(), ConfigError> {
    if value <= Decimal::ZERO {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(())
}

impl TaxYearConfig {
    /// Validates every rate and limit.
    ///
    /// The built-in defaults always pass; overrides loaded from a file may not.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_fraction("local_income_tax_rate", self.local_income_tax_rate)?;

        let ins = &self.insurance;
        check_fraction("insurance.national_pension_rate", ins.national_pension_rate)?;
        check_fraction("insurance.health_insurance_rate", ins.health_insurance_rate)?;
        check_fraction("insurance.long_term_care_rate", ins.long_term_care_rate)?;
        check_fraction(
            "insurance.employment_insurance_rate",
            ins.employment_insurance_rate,
        )?;
        check_non_negative("insurance.pension_base_floor", ins.pension_base_floor)?;
        if ins.pension_base_floor > ins.pension_base_ceiling {
            return Err(ConfigError::PensionBaseRange {
                floor: ins.pension_base_floor,
                ceiling: ins.pension_base_ceiling,
            });
        }

        check_non_negative("allowances.meal", self.allowances.meal)?;
        check_non_negative("allowances.car", self.allowances.car)?;
        check_non_negative("allowances.childcare", self.allowances.childcare)?;

        let earned = &self.earned_income;
        earned.deduction.validate("earned income")?;
        check_non_negative("earned_income.personal_deduction", earned.personal_deduction)?;
        check_fraction("earned_income.credit_low_rate", earned.credit_low_rate)?;
        check_fraction("earned_income.credit_high_rate", earned.credit_high_rate)?;
        check_positive(
            "earned_income.net_to_gross_initial_ratio",
            earned.net_to_gross_initial_ratio,
        )?;
        check_positive(
            "earned_income.net_to_gross_tolerance",
            earned.net_to_gross_tolerance,
        )?;

        let loan = &self.loan;
        check_positive("loan.dsr_limit_percent", loan.dsr_limit_percent)?;
        for (rate_type, add_on) in loan.stress_table() {
            check_non_negative(rate_type.as_str(), add_on)?;
        }
        for (zone, ltv) in loan.ltv_table() {
            check_non_negative(zone.as_str(), ltv)?;
        }
        check_non_negative("loan.first_time_buyer_bonus", loan.first_time_buyer_bonus)?;
        check_positive("loan.ltv_ceiling", loan.ltv_ceiling)?;

        check_fraction("pension.contribution_rate", self.pension.contribution_rate)?;
        check_fraction("pension.replacement_rate", self.pension.replacement_rate)?;
        check_positive(
            "pension.full_contribution_years",
            Decimal::from(self.pension.full_contribution_years),
        )?;

        self.severance
            .service_year_deduction
            .validate("service year")?;
        check_fraction("severance.tax_credit_rate", self.severance.tax_credit_rate)?;
        check_non_negative("severance.tax_credit_cap", self.severance.tax_credit_cap)?;

        check_fraction("income_tax.tax_credit_rate", self.income_tax.tax_credit_rate)?;
        check_non_negative("income_tax.tax_credit_cap", self.income_tax.tax_credit_cap)?;

        let gains = &self.capital_gains;
        check_non_negative("capital_gains.basic_deduction", gains.basic_deduction)?;
        check_fraction("capital_gains.holding_rate_per_year", gains.holding_rate_per_year)?;
        check_fraction("capital_gains.holding_max_rate", gains.holding_max_rate)?;
        check_positive(
            "capital_gains.multi_home_multiplier",
            gains.multi_home_multiplier,
        )?;

        check_positive(
            "minimum_wage.statutory_monthly_hours",
            self.minimum_wage.statutory_monthly_hours,
        )?;
        let mut years: Vec<i32> = self.minimum_wage.rates.iter().map(|r| r.year).collect();
        years.sort_unstable();
        if let Some(pair) = years.windows(2).find(|w| w[0] == w[1]) {
            return Err(ConfigError::DuplicateMinimumWageYear(pair[0]));
        }
        for rate in &self.minimum_wage.rates {
            check_non_negative("minimum_wage.hourly", rate.hourly)?;
        }

        Ok(())
    }
}
