use chrono::NaiveDate;
use finance_core::{CompoundingFrequency, RateType, RegulatoryZone, RepaymentMethod};
use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
pub enum ParseDecimalError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid amount '{input}': {source}")]
    Invalid {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },
}

/// Normalizes input for decimal parsing: trims whitespace and removes
/// commas (thousands separator) and underscores.
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace([',', '_'], "")
}

/// Parses a command-line amount into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"5,000,000"`).
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Err(ParseDecimalError::Empty);
    }
    normalized.parse().map_err(|source| ParseDecimalError::Invalid {
        input: s.to_string(),
        source,
    })
}

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{s}' (expected YYYY-MM-DD): {e}"))
}

pub fn parse_method(s: &str) -> Result<RepaymentMethod, String> {
    RepaymentMethod::parse(s)
        .ok_or_else(|| format!("unknown method '{s}' (expected equal-payment or equal-principal)"))
}

pub fn parse_rate_type(s: &str) -> Result<RateType, String> {
    RateType::parse(s).ok_or_else(|| {
        format!("unknown rate type '{s}' (expected fixed, variable, mixed or periodic)")
    })
}

pub fn parse_zone(s: &str) -> Result<RegulatoryZone, String> {
    RegulatoryZone::parse(s).ok_or_else(|| {
        format!(
            "unknown zone '{s}' (expected speculation, overheated, adjustment or non-regulated)"
        )
    })
}

pub fn parse_frequency(s: &str) -> Result<CompoundingFrequency, String> {
    CompoundingFrequency::parse(s).ok_or_else(|| {
        format!("unknown frequency '{s}' (expected monthly, quarterly, semi-annual or annual)")
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_decimal_accepts_thousands_separators() {
        assert_eq!(parse_decimal("5,000,000").unwrap(), dec!(5000000));
        assert_eq!(parse_decimal("1_234.5").unwrap(), dec!(1234.5));
    }

    #[test]
    fn parse_decimal_trims_whitespace() {
        assert_eq!(parse_decimal("  4.25  ").unwrap(), dec!(4.25));
    }

    #[test]
    fn parse_decimal_rejects_empty_input() {
        assert!(matches!(parse_decimal("  "), Err(ParseDecimalError::Empty)));
    }

    #[test]
    fn parse_decimal_rejects_garbage() {
        assert!(matches!(
            parse_decimal("abc"),
            Err(ParseDecimalError::Invalid { .. })
        ));
    }

    #[test]
    fn parse_date_accepts_iso_dates() {
        assert_eq!(
            parse_date("2025-03-01").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
        assert!(parse_date("03/01/2025").is_err());
    }

    #[test]
    fn parse_enums_use_kebab_case_names() {
        assert_eq!(parse_method("equal-principal"), Ok(RepaymentMethod::EqualPrincipal));
        assert_eq!(parse_rate_type("mixed"), Ok(RateType::Mixed));
        assert_eq!(parse_zone("non-regulated"), Ok(RegulatoryZone::NonRegulated));
        assert_eq!(parse_frequency("semi-annual"), Ok(CompoundingFrequency::SemiAnnual));
        assert!(parse_zone("seoul").is_err());
    }
}
