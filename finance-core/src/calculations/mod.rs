//! Personal finance calculators.
//!
//! Each calculator is a struct borrowing a [`crate::TaxYearConfig`] (and a
//! [`crate::TaxBracketTable`] where tax is involved) with a `calculate`
//! method, plus a `calculate_*` function that uses the built-in 2025 values.

pub mod amortization;
pub mod capital_gains;
pub mod common;
pub mod compound_interest;
pub mod income_tax;
pub mod loan;
pub mod minimum_wage;
pub mod pension;
pub mod salary;
pub mod severance;

pub use amortization::{AmortizationError, AmortizationSchedule, LoanInput, ScheduleEntry};
pub use capital_gains::{
    CapitalGainsCalculator, CapitalGainsError, CapitalGainsInput, CapitalGainsResult,
};
pub use compound_interest::{
    CompoundInterestError, CompoundInterestInput, CompoundInterestResult, YearlyBalance,
};
pub use income_tax::{
    IncomeDeductions, IncomeTaxCalculator, IncomeTaxError, IncomeTaxInput, IncomeTaxResult,
};
pub use loan::{
    DsrContext, DsrResult, LoanCalculationInput, LoanCalculator, LoanError, LoanResult,
    LtvContext, LtvResult, MortgageCalculator, MortgageInput, MortgageResult,
};
pub use minimum_wage::{
    MinimumWageCalculator, MinimumWageError, MinimumWageInput, MinimumWageResult,
};
pub use pension::{PensionCalculator, PensionError, PensionInput, PensionResult};
pub use salary::{
    GrossSalaryEstimate, NetToGrossInput, SalaryCalculator, SalaryError, SalaryInput,
    SalaryResult, TaxExemptAllowances,
};
pub use severance::{SeveranceCalculator, SeveranceError, SeveranceInput, SeveranceResult};
