use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use clap::Args;
use finance_core::calculations::amortization::AmortizationSchedule;
use finance_core::calculations::compound_interest::calculate_compound_interest;
use finance_core::calculations::{
    CapitalGainsCalculator, CapitalGainsInput, CompoundInterestInput, DsrContext, DsrResult,
    IncomeDeductions, IncomeTaxCalculator, IncomeTaxInput, LoanCalculationInput, LoanCalculator,
    LoanInput, LtvContext, LtvResult, MinimumWageCalculator, MinimumWageInput,
    MortgageCalculator, MortgageInput, NetToGrossInput, PensionCalculator, PensionInput,
    SalaryCalculator, SalaryInput, SeveranceCalculator, SeveranceInput, TaxExemptAllowances,
};
use finance_core::{
    CompoundingFrequency, RateType, RegulatoryZone, RepaymentMethod, TaxBracket, TaxYearConfig,
};
use finance_data::BracketTables;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::output::{Report, emit, format_rate, format_won};
use crate::utils::{
    parse_date, parse_decimal, parse_frequency, parse_method, parse_rate_type, parse_zone,
};

/// Reference data and output mode shared by every subcommand.
pub struct Context {
    pub config: TaxYearConfig,
    pub tables: BracketTables,
    pub json: bool,
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

// ─── salary ──────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AllowanceArgs {
    /// Meal allowance per month (exempt up to the statutory cap)
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub meal: Decimal,

    /// Own-car driving allowance per month
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub car: Decimal,

    /// Childcare allowance per month
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub childcare: Decimal,

    /// Research allowance per month (uncapped)
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub research: Decimal,

    /// Any other tax-exempt allowance per month (uncapped)
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub other_allowance: Decimal,

    /// Dependents other than yourself
    #[arg(long, default_value_t = 0)]
    pub dependents: u32,

    /// Children eligible for the child tax credit
    #[arg(long, default_value_t = 0)]
    pub children: u32,
}

impl AllowanceArgs {
    fn allowances(&self) -> TaxExemptAllowances {
        TaxExemptAllowances {
            meal: self.meal,
            car: self.car,
            childcare: self.childcare,
            research: self.research,
            other: self.other_allowance,
        }
    }
}

#[derive(Debug, Args)]
pub struct SalaryArgs {
    /// Gross monthly salary in won, allowances included
    #[arg(long, value_parser = parse_decimal)]
    pub gross: Decimal,

    /// One-time incentive paid in addition to the salary
    #[arg(long, value_parser = parse_decimal)]
    pub incentive: Option<Decimal>,

    #[command(flatten)]
    pub allowances: AllowanceArgs,
}

pub fn salary(
    ctx: &Context,
    args: &SalaryArgs,
) -> Result<()> {
    let input = SalaryInput {
        gross_monthly_salary: args.gross,
        allowances: args.allowances.allowances(),
        dependents: args.allowances.dependents,
        children: args.allowances.children,
        incentive: args.incentive,
    };
    let result = SalaryCalculator::new(&ctx.config, &ctx.tables.income_tax)
        .calculate(&input)
        .context("Salary calculation failed")?;

    emit(ctx.json, &result, |r| {
        let tax = &r.annual_tax;
        let mut report = Report::new("Monthly salary")
            .won("Gross salary", r.gross_monthly_salary)
            .won("Tax-exempt allowances", r.allowances.total_exempt)
            .won("Taxable salary", r.taxable_monthly_salary)
            .section("Deductions")
            .won("National pension", r.insurance.national_pension)
            .won("Health insurance", r.insurance.health_insurance)
            .won("Long-term care", r.insurance.long_term_care)
            .won("Employment insurance", r.insurance.employment_insurance)
            .won("Income tax", r.monthly_income_tax)
            .won("Local income tax", r.monthly_local_income_tax)
            .won("Total deductions", r.total_deductions)
            .section("Annual tax")
            .won("Annual wage", tax.annual_wage)
            .won("Earned income deduction", tax.earned_income_deduction)
            .won("Tax base", tax.tax_base)
            .won("Calculated tax", tax.calculated_tax)
            .won("Earned income tax credit", tax.earned_income_tax_credit)
            .won("Child tax credit", tax.child_tax_credit)
            .text("Marginal rate", format_rate(tax.marginal_rate))
            .percent("Effective tax rate", r.effective_tax_rate);
        if let Some(incentive) = &r.incentive {
            report = report
                .section("Incentive")
                .won("Amount", incentive.amount)
                .won("Additional income tax", incentive.additional_income_tax)
                .won(
                    "Additional local income tax",
                    incentive.additional_local_income_tax,
                )
                .won("Net incentive", incentive.net_incentive)
                .text("Crossed bracket", yes_no(incentive.crossed_bracket));
        }
        report.won("Net salary", r.net_salary).to_string()
    })
}

#[derive(Debug, Args)]
pub struct NetToGrossArgs {
    /// Desired monthly take-home pay in won
    #[arg(long, value_parser = parse_decimal)]
    pub target_net: Decimal,

    #[command(flatten)]
    pub allowances: AllowanceArgs,
}

pub fn net_to_gross(
    ctx: &Context,
    args: &NetToGrossArgs,
) -> Result<()> {
    let input = NetToGrossInput {
        target_net_salary: args.target_net,
        allowances: args.allowances.allowances(),
        dependents: args.allowances.dependents,
        children: args.allowances.children,
    };
    let estimate = SalaryCalculator::new(&ctx.config, &ctx.tables.income_tax)
        .estimate_gross_salary(&input)
        .context("Gross salary estimate failed")?;

    emit(ctx.json, &estimate, |e| {
        Report::new("Gross salary estimate")
            .won("Target net salary", e.target_net_salary)
            .won("Gross salary", e.gross_monthly_salary)
            .won("Net salary at gross", e.net_salary)
            .text("Iterations", e.iterations)
            .text("Converged", yes_no(e.converged))
            .to_string()
    })
}

// ─── loans ───────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoanTermsArgs {
    /// Principal in won
    #[arg(long, value_parser = parse_decimal)]
    pub principal: Decimal,

    /// Nominal annual rate in percent (e.g. 4.5)
    #[arg(long, value_parser = parse_decimal)]
    pub rate: Decimal,

    /// Term in months
    #[arg(long)]
    pub months: u32,

    /// equal-payment or equal-principal
    #[arg(long, value_parser = parse_method, default_value = "equal-payment")]
    pub method: RepaymentMethod,

    /// Print every period of the schedule
    #[arg(long)]
    pub schedule: bool,
}

impl LoanTermsArgs {
    fn terms(&self) -> LoanInput {
        LoanInput {
            principal: self.principal,
            annual_rate_percent: self.rate,
            term_months: self.months,
            method: self.method,
        }
    }
}

#[derive(Debug, Args)]
pub struct DsrArgs {
    /// Annual income in won; enables the DSR check
    #[arg(long, value_parser = parse_decimal)]
    pub income: Option<Decimal>,

    /// Annual payments already owed on other loans
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub existing_debt: Decimal,

    /// fixed, variable, mixed or periodic
    #[arg(long, value_parser = parse_rate_type, default_value = "fixed")]
    pub rate_type: RateType,
}

impl DsrArgs {
    fn context(&self) -> Option<DsrContext> {
        self.income.map(|annual_income| DsrContext {
            annual_income,
            existing_annual_debt_payment: self.existing_debt,
            rate_type: self.rate_type,
        })
    }
}

#[derive(Debug, Args)]
pub struct LoanArgs {
    #[command(flatten)]
    pub terms: LoanTermsArgs,

    #[command(flatten)]
    pub dsr: DsrArgs,

    /// Property value in won; enables the LTV check
    #[arg(long, value_parser = parse_decimal)]
    pub property_value: Option<Decimal>,

    /// speculation, overheated, adjustment or non-regulated
    #[arg(long, value_parser = parse_zone, default_value = "non-regulated")]
    pub zone: RegulatoryZone,

    /// Apply the first-time buyer LTV bonus
    #[arg(long)]
    pub first_time_buyer: bool,
}

pub fn loan(
    ctx: &Context,
    args: &LoanArgs,
) -> Result<()> {
    let input = LoanCalculationInput {
        terms: args.terms.terms(),
        dsr: args.dsr.context(),
        ltv: args.property_value.map(|property_value| LtvContext {
            property_value,
            zone: args.zone,
            first_time_buyer: args.first_time_buyer,
        }),
    };
    let result = LoanCalculator::new(&ctx.config)
        .calculate(&input)
        .context("Loan calculation failed")?;

    emit(ctx.json, &result, |r| {
        let mut text = schedule_report(&r.schedule, args.terms.rate).to_string();
        if let Some(dsr) = &r.dsr {
            text.push('\n');
            text.push_str(&dsr_report(dsr).to_string());
        }
        if let Some(ltv) = &r.ltv {
            text.push('\n');
            text.push_str(&ltv_report(ltv).to_string());
        }
        if args.terms.schedule {
            text.push('\n');
            text.push_str(&schedule_table(&r.schedule));
        }
        text
    })
}

#[derive(Debug, Args)]
pub struct MortgageArgs {
    #[command(flatten)]
    pub terms: LoanTermsArgs,

    #[command(flatten)]
    pub dsr: DsrArgs,

    /// Property value in won
    #[arg(long, value_parser = parse_decimal)]
    pub property_value: Decimal,

    /// speculation, overheated, adjustment or non-regulated
    #[arg(long, value_parser = parse_zone)]
    pub zone: RegulatoryZone,

    /// Apply the first-time buyer LTV bonus
    #[arg(long)]
    pub first_time_buyer: bool,
}

pub fn mortgage(
    ctx: &Context,
    args: &MortgageArgs,
) -> Result<()> {
    let input = MortgageInput {
        terms: args.terms.terms(),
        ltv: LtvContext {
            property_value: args.property_value,
            zone: args.zone,
            first_time_buyer: args.first_time_buyer,
        },
        dsr: args.dsr.context(),
    };
    let result = MortgageCalculator::new(&ctx.config)
        .calculate(&input)
        .context("Mortgage calculation failed")?;

    emit(ctx.json, &result, |r| {
        let mut text = schedule_report(&r.schedule, args.terms.rate)
            .won("Down payment", r.down_payment)
            .to_string();
        text.push('\n');
        text.push_str(&ltv_report(&r.ltv).to_string());
        if let Some(dsr) = &r.dsr {
            text.push('\n');
            text.push_str(&dsr_report(dsr).to_string());
        }
        if args.terms.schedule {
            text.push('\n');
            text.push_str(&schedule_table(&r.schedule));
        }
        text
    })
}

fn schedule_report(
    schedule: &AmortizationSchedule,
    annual_rate_percent: Decimal,
) -> Report {
    Report::new(format!("Loan ({})", schedule.method.as_str()))
        .won("Principal", schedule.principal)
        .text("Annual rate", format!("{}%", annual_rate_percent.normalize()))
        .text("Term", format!("{} months", schedule.entries.len()))
        .won("First payment", schedule.first_payment)
        .won("Last payment", schedule.last_payment)
        .won("Total payment", schedule.total_payment)
        .won("Total interest", schedule.total_interest)
}

fn dsr_report(dsr: &DsrResult) -> Report {
    Report::new("DSR")
        .text("Rate type", dsr.rate_type.as_str())
        .text("Stress add-on", format!("{}pp", dsr.stress_add_on.normalize()))
        .text(
            "Stressed rate",
            format!("{}%", dsr.stressed_annual_rate_percent.normalize()),
        )
        .won("Annual payment", dsr.annual_payment)
        .won("Stressed annual payment", dsr.stressed_annual_payment)
        .percent("DSR", dsr.dsr_percent)
        .percent("Stressed DSR", dsr.stressed_dsr_percent)
        .percent("Limit", Some(dsr.limit_percent))
        .text("Within limit", yes_no(dsr.within_limit))
        .won("Max principal", dsr.max_principal)
        .won("Stressed max principal", dsr.stressed_max_principal)
        .won("Capacity reduction", dsr.capacity_reduction)
}

fn ltv_report(ltv: &LtvResult) -> Report {
    Report::new("LTV")
        .text("Zone", ltv.zone.as_str())
        .percent("Base LTV", Some(ltv.base_ltv_percent))
        .percent("First-time buyer bonus", Some(ltv.first_time_buyer_bonus))
        .percent("Applied LTV", Some(ltv.applied_ltv_percent))
        .won("Max loan", ltv.max_loan)
        .percent("Requested LTV", ltv.requested_ltv_percent)
        .text("Within limit", yes_no(ltv.within_limit))
}

fn schedule_table(schedule: &AmortizationSchedule) -> String {
    let mut text = format!(
        "{:>6}  {:>15}  {:>15}  {:>15}  {:>15}\n",
        "Period", "Principal", "Interest", "Payment", "Balance"
    );
    for entry in &schedule.entries {
        text.push_str(&format!(
            "{:>6}  {:>15}  {:>15}  {:>15}  {:>15}\n",
            entry.period,
            format_won(entry.principal_portion),
            format_won(entry.interest_portion),
            format_won(entry.total_payment),
            format_won(entry.remaining_balance),
        ));
    }
    text
}

// ─── savings and retirement ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompoundArgs {
    /// Initial deposit in won
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub principal: Decimal,

    /// Deposit added every month
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub monthly_deposit: Decimal,

    /// Nominal annual rate in percent
    #[arg(long, value_parser = parse_decimal)]
    pub rate: Decimal,

    /// Projection length in years
    #[arg(long)]
    pub years: u32,

    /// monthly, quarterly, semi-annual or annual
    #[arg(long, value_parser = parse_frequency, default_value = "monthly")]
    pub frequency: CompoundingFrequency,
}

pub fn compound(
    ctx: &Context,
    args: &CompoundArgs,
) -> Result<()> {
    let input = CompoundInterestInput {
        principal: args.principal,
        monthly_deposit: args.monthly_deposit,
        annual_rate_percent: args.rate,
        years: args.years,
        frequency: args.frequency,
    };
    let result = calculate_compound_interest(&input).context("Savings projection failed")?;

    emit(ctx.json, &result, |r| {
        let mut report = Report::new(format!(
            "Savings projection ({} compounding)",
            args.frequency.as_str()
        ))
        .won("Final balance", r.final_balance)
        .won("Total contributions", r.total_contributions)
        .won("Total interest", r.total_interest)
        .percent(
            "Effective annual rate",
            Some(r.effective_annual_rate_percent),
        )
        .section("By year");
        for year in &r.yearly {
            report = report.won(&format!("Year {}", year.year), year.balance);
        }
        report.to_string()
    })
}

#[derive(Debug, Args)]
pub struct PensionArgs {
    /// Average monthly income in won
    #[arg(long, value_parser = parse_decimal)]
    pub income: Decimal,

    /// Years of contributions
    #[arg(long)]
    pub years: u32,

    /// Age at which benefits start (60 to 70)
    #[arg(long)]
    pub start_age: Option<u32>,
}

pub fn pension(
    ctx: &Context,
    args: &PensionArgs,
) -> Result<()> {
    let input = PensionInput {
        average_monthly_income: args.income,
        contribution_years: args.years,
        start_age: args.start_age,
    };
    let result = PensionCalculator::new(&ctx.config)
        .calculate(&input)
        .context("Pension projection failed")?;

    emit(ctx.json, &result, |r| {
        Report::new("National pension (simplified estimate)")
            .won("Monthly contribution", r.monthly_contribution)
            .won("Total contributions", r.total_contributions)
            .won("Monthly benefit", r.monthly_benefit)
            .percent("Replacement ratio", r.replacement_ratio_percent)
            .text("Start age", r.start_age)
            .text("Payout years", r.payout_years)
            .won("Lifetime benefit", r.lifetime_benefit)
            .text(
                "Break-even age",
                r.break_even_age
                    .map(|age| age.to_string())
                    .unwrap_or_else(|| "n/a".to_string()),
            )
            .to_string()
    })
}

#[derive(Debug, Args)]
pub struct SeveranceArgs {
    /// First day of employment (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub start: NaiveDate,

    /// Last day of employment (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub end: NaiveDate,

    /// Average monthly salary over the last three months
    #[arg(long, value_parser = parse_decimal)]
    pub salary: Decimal,
}

pub fn severance(
    ctx: &Context,
    args: &SeveranceArgs,
) -> Result<()> {
    let input = SeveranceInput {
        start_date: args.start,
        end_date: args.end,
        average_monthly_salary: args.salary,
    };
    let result = SeveranceCalculator::new(&ctx.config, &ctx.tables.retirement_income)
        .calculate(&input)
        .context("Severance calculation failed")?;

    emit(ctx.json, &result, |r| {
        Report::new("Severance pay")
            .text("Tenure", format!("{} days", r.tenure_days))
            .text("Eligible", yes_no(r.eligible))
            .won("Severance pay", r.severance_pay)
            .text("Service years", r.service_years)
            .won("Service year deduction", r.service_year_deduction)
            .won("Retirement income tax", r.retirement_income_tax)
            .won("Local income tax", r.local_income_tax)
            .percent("Effective tax rate", r.effective_tax_rate)
            .won("Net severance pay", r.net_severance_pay)
            .to_string()
    })
}

// ─── taxes ───────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct IncomeTaxArgs {
    /// Annual income in won
    #[arg(long, value_parser = parse_decimal)]
    pub income: Decimal,

    /// Personal deduction
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub personal: Decimal,

    /// National pension contributions
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub national_pension: Decimal,

    /// Insurance premiums
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub insurance: Decimal,

    /// Housing fund deduction
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub housing_fund: Decimal,

    /// Credit card deduction
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub credit_card: Decimal,

    /// Other deductions
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub other: Decimal,
}

pub fn income_tax(
    ctx: &Context,
    args: &IncomeTaxArgs,
) -> Result<()> {
    let input = IncomeTaxInput {
        annual_income: args.income,
        deductions: IncomeDeductions {
            personal: args.personal,
            national_pension: args.national_pension,
            insurance_premiums: args.insurance,
            housing_fund: args.housing_fund,
            credit_card: args.credit_card,
            other: args.other,
        },
    };
    let result = IncomeTaxCalculator::new(&ctx.config, &ctx.tables.income_tax)
        .calculate(&input)
        .context("Income tax calculation failed")?;

    emit(ctx.json, &result, |r| {
        Report::new("Income tax")
            .won("Annual income", r.annual_income)
            .won("Total deductions", r.total_deductions)
            .won("Taxable income", r.taxable_income)
            .won("Calculated tax", r.calculated_tax)
            .won("Tax credit", r.tax_credit)
            .won("Income tax", r.income_tax)
            .won("Local income tax", r.local_income_tax)
            .won("Total tax", r.total_tax)
            .text("Marginal rate", format_rate(r.marginal_rate))
            .percent("Effective tax rate", r.effective_tax_rate)
            .to_string()
    })
}

#[derive(Debug, Args)]
pub struct CapitalGainsArgs {
    /// Acquisition price in won
    #[arg(long, value_parser = parse_decimal)]
    pub acquisition: Decimal,

    /// Transfer (sale) price in won
    #[arg(long, value_parser = parse_decimal)]
    pub transfer: Decimal,

    /// Costs incurred on acquisition
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub acquisition_costs: Decimal,

    /// Costs incurred on transfer
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub transfer_costs: Decimal,

    /// Whole years held
    #[arg(long)]
    pub holding_years: u32,

    /// Seller owns several homes
    #[arg(long)]
    pub multi_home: bool,
}

pub fn capital_gains(
    ctx: &Context,
    args: &CapitalGainsArgs,
) -> Result<()> {
    let input = CapitalGainsInput {
        acquisition_price: args.acquisition,
        transfer_price: args.transfer,
        acquisition_costs: args.acquisition_costs,
        transfer_costs: args.transfer_costs,
        holding_years: args.holding_years,
        multi_home: args.multi_home,
    };
    let result = CapitalGainsCalculator::new(&ctx.config, &ctx.tables.income_tax)
        .calculate(&input)
        .context("Capital gains calculation failed")?;

    emit(ctx.json, &result, |r| {
        Report::new("Capital gains tax")
            .won("Transfer gain", r.transfer_gain)
            .text("Holding deduction rate", format_rate(r.holding_deduction_rate))
            .won("Holding deduction", r.holding_deduction)
            .won("Basic deduction", r.basic_deduction)
            .won("Taxable income", r.taxable_income)
            .text("Multi-home surcharge", yes_no(r.surcharge_applied))
            .won("Capital gains tax", r.capital_gains_tax)
            .won("Local income tax", r.local_income_tax)
            .won("Total tax", r.total_tax)
            .percent("Effective tax rate", r.effective_tax_rate)
            .to_string()
    })
}

// ─── wages ───────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MinimumWageArgs {
    /// Hourly wage in won
    #[arg(long, value_parser = parse_decimal)]
    pub hourly: Decimal,

    /// Contracted hours per week
    #[arg(long, value_parser = parse_decimal, default_value = "40")]
    pub weekly_hours: Decimal,

    /// Year whose statutory minimum applies
    #[arg(long, default_value_t = 2025)]
    pub year: i32,
}

pub fn minimum_wage(
    ctx: &Context,
    args: &MinimumWageArgs,
) -> Result<()> {
    let input = MinimumWageInput {
        hourly_wage: args.hourly,
        weekly_hours: args.weekly_hours,
        year: args.year,
    };
    let result = MinimumWageCalculator::new(&ctx.config)
        .calculate(&input)
        .context("Minimum wage check failed")?;

    emit(ctx.json, &result, |r| {
        Report::new(format!("Minimum wage ({})", r.year))
            .won("Hourly wage", r.hourly_wage)
            .won("Statutory hourly minimum", r.statutory_hourly_minimum)
            .text("Weekly holiday hours", r.weekly_holiday_hours.normalize())
            .text("Monthly paid hours", r.monthly_paid_hours.round_dp(1))
            .won("Monthly wage", r.monthly_wage)
            .won("Statutory monthly minimum", r.statutory_monthly_minimum)
            .text("Compliant", yes_no(r.compliant))
            .won("Hourly shortfall", r.hourly_shortfall)
            .to_string()
    })
}

// ─── reference tables ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct TablesView<'a> {
    tax_year: i32,
    income_tax: &'a [TaxBracket],
    retirement_income: &'a [TaxBracket],
    dsr_limit_percent: Decimal,
    stress_rates: Vec<(RateType, Decimal)>,
    ltv_by_zone: Vec<(RegulatoryZone, Decimal)>,
    minimum_wage: Vec<(i32, Decimal)>,
}

pub fn tables(ctx: &Context) -> Result<()> {
    let loans = LoanCalculator::new(&ctx.config);
    let view = TablesView {
        tax_year: ctx.config.tax_year,
        income_tax: ctx.tables.income_tax.brackets(),
        retirement_income: ctx.tables.retirement_income.brackets(),
        dsr_limit_percent: loans.dsr_limit_percent(),
        stress_rates: loans.stress_rates(),
        ltv_by_zone: loans.ltv_by_zone(),
        minimum_wage: MinimumWageCalculator::new(&ctx.config).rates(),
    };
    debug!(tax_year = view.tax_year, "Printing reference tables");

    emit(ctx.json, &view, |v| {
        let mut report = Report::new(format!("Reference tables ({})", v.tax_year));
        for (title, brackets) in [
            ("Income tax brackets", v.income_tax),
            ("Retirement income brackets", v.retirement_income),
        ] {
            report = report.section(title);
            for bracket in brackets {
                let label = match bracket.upper_limit {
                    Some(limit) => format!("up to {}", format_won(limit)),
                    None => "above".to_string(),
                };
                report = report.text(
                    &label,
                    format!(
                        "{} less {}",
                        format_rate(bracket.rate),
                        format_won(bracket.cumulative_deduction.unwrap_or_default())
                    ),
                );
            }
        }
        report = report
            .section("DSR stress add-ons")
            .percent("Limit", Some(v.dsr_limit_percent));
        for (rate_type, add_on) in &v.stress_rates {
            report = report.text(rate_type.as_str(), format!("{}pp", add_on.normalize()));
        }
        report = report.section("LTV by zone");
        for (zone, ltv) in &v.ltv_by_zone {
            report = report.percent(zone.as_str(), Some(*ltv));
        }
        report = report.section("Minimum wage");
        for (year, hourly) in &v.minimum_wage {
            report = report.won(&year.to_string(), *hourly);
        }
        report.to_string()
    })
}
