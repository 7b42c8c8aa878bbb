mod loan_terms;
mod tax_bracket;
mod tax_year_config;

pub use loan_terms::{CompoundingFrequency, RateType, RegulatoryZone, RepaymentMethod};
pub use tax_bracket::{BracketTableError, TaxBracket, TaxBracketTable};
pub use tax_year_config::{
    AllowanceCaps, CapitalGainsParameters, ConfigError, DeductionBand, DeductionSchedule,
    EarnedIncomeRules, IncomeTaxParameters, InsuranceRates, LoanRegulation, MinimumWageRate,
    MinimumWageTable, PensionParameters, SeveranceParameters, TaxYearConfig,
};
