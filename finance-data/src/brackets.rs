use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use finance_core::{BracketTableError, TaxBracket, TaxBracketTable};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading bracket tables.
#[derive(Debug, Error)]
pub enum BracketLoaderError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Unknown bracket table '{0}' (expected income_tax or retirement_income)")]
    UnknownTable(String),

    #[error("Invalid '{table}' table: {source}")]
    InvalidTable {
        table: String,
        source: BracketTableError,
    },
}

impl From<csv::Error> for BracketLoaderError {
    fn from(err: csv::Error) -> Self {
        BracketLoaderError::CsvParse(err.to_string())
    }
}

/// Names of the tables a bracket file may define.
const INCOME_TAX: &str = "income_tax";
const RETIREMENT_INCOME: &str = "retirement_income";

/// A single row of a bracket CSV file.
///
/// - `table`: `income_tax` or `retirement_income`
/// - `upper_limit`: top of the bracket (empty for the unbounded last bracket)
/// - `rate`: marginal rate as a fraction (e.g., 0.15 for 15%)
/// - `cumulative_deduction`: quick deduction (empty to derive it)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub table: String,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_limit: Option<Decimal>,
    pub rate: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub cumulative_deduction: Option<Decimal>,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// The progressive schedules used by the calculators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketTables {
    pub income_tax: TaxBracketTable,
    pub retirement_income: TaxBracketTable,
}

impl Default for BracketTables {
    fn default() -> Self {
        Self {
            income_tax: TaxBracketTable::income_tax_2025(),
            retirement_income: TaxBracketTable::retirement_income_2025(),
        }
    }
}

/// Loader for bracket tables from CSV files.
///
/// Rows are grouped by their `table` column in file order. A table the file
/// does not mention keeps its built-in 2025 schedule.
pub struct BracketTableLoader;

impl BracketTableLoader {
    /// Parse bracket records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, BracketLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Validate parsed records and build the tables they describe.
    ///
    /// Every table goes through [`TaxBracketTable::try_new`], so a malformed
    /// file is reported as an error rather than a panic.
    pub fn build(records: &[BracketRecord]) -> Result<BracketTables, BracketLoaderError> {
        let mut groups: BTreeMap<&str, Vec<TaxBracket>> = BTreeMap::new();

        for record in records {
            let name = record.table.trim();
            if name != INCOME_TAX && name != RETIREMENT_INCOME {
                return Err(BracketLoaderError::UnknownTable(name.to_string()));
            }
            let bracket = match record.cumulative_deduction {
                Some(deduction) => {
                    TaxBracket::with_deduction(record.upper_limit, record.rate, deduction)
                }
                None => TaxBracket::new(record.upper_limit, record.rate),
            };
            groups.entry(name).or_default().push(bracket);
        }

        let mut tables = BracketTables::default();
        for (name, brackets) in groups {
            debug!(table = name, brackets = brackets.len(), "Building bracket table");
            let table =
                TaxBracketTable::try_new(brackets).map_err(|source| {
                    BracketLoaderError::InvalidTable {
                        table: name.to_string(),
                        source,
                    }
                })?;
            match name {
                INCOME_TAX => tables.income_tax = table,
                _ => tables.retirement_income = table,
            }
        }

        Ok(tables)
    }

    /// Parse and build the tables in one step.
    pub fn load<R: Read>(reader: R) -> Result<BracketTables, BracketLoaderError> {
        Self::build(&Self::parse(reader)?)
    }

    /// Load the tables from a CSV file on disk.
    pub fn load_file(path: &Path) -> Result<BracketTables, BracketLoaderError> {
        let file = File::open(path).map_err(|source| BracketLoaderError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tables = Self::load(file)?;
        info!(path = %path.display(), "Loaded bracket tables");
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const HEADER: &str = "table,upper_limit,rate,cumulative_deduction";

    fn csv(rows: &[&str]) -> String {
        let mut text = HEADER.to_string();
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    // =========================================================================
    // parse tests
    // =========================================================================

    #[test]
    fn test_parse_single_bracket() {
        let text = csv(&["income_tax,14000000,0.06,0"]);

        let records = BracketTableLoader::parse(text.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(
            records,
            vec![BracketRecord {
                table: "income_tax".to_string(),
                upper_limit: Some(dec!(14000000)),
                rate: dec!(0.06),
                cumulative_deduction: Some(dec!(0)),
            }]
        );
    }

    #[test]
    fn test_parse_empty_optional_columns() {
        let text = csv(&["income_tax,,0.45,"]);

        let records = BracketTableLoader::parse(text.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records[0].upper_limit, None);
        assert_eq!(records[0].cumulative_deduction, None);
        assert_eq!(records[0].rate, dec!(0.45));
    }

    #[test]
    fn test_parse_bad_decimal() {
        let text = csv(&["income_tax,abc,0.06,0"]);

        let err = BracketTableLoader::parse(text.as_bytes()).expect_err("Should fail");

        let BracketLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(msg.contains("invalid"), "Expected 'invalid' in error, got: {}", msg);
    }

    #[test]
    fn test_parse_missing_column() {
        let text = "table,upper_limit\nincome_tax,14000000";

        let err = BracketTableLoader::parse(text.as_bytes()).expect_err("Should fail");

        let BracketLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(msg.contains("missing field"), "got: {}", msg);
    }

    #[test]
    fn test_parse_header_only() {
        let records = BracketTableLoader::parse(HEADER.as_bytes()).expect("Failed to parse CSV");

        assert!(records.is_empty());
    }

    // =========================================================================
    // build tests
    // =========================================================================

    #[test]
    fn test_build_derives_missing_deductions() {
        let text = csv(&[
            "retirement_income,10000000,0.1,",
            "retirement_income,,0.2,",
        ]);

        let tables = BracketTableLoader::load(text.as_bytes()).expect("Failed to load");

        let brackets = tables.retirement_income.brackets();
        assert_eq!(brackets.len(), 2);
        assert_eq!(brackets[1].cumulative_deduction, Some(dec!(1000000)));
        assert_eq!(tables.income_tax, TaxBracketTable::income_tax_2025());
    }

    #[test]
    fn test_build_empty_file_keeps_defaults() {
        let tables = BracketTableLoader::load(HEADER.as_bytes()).expect("Failed to load");

        assert_eq!(tables, BracketTables::default());
    }

    #[test]
    fn test_build_rejects_unknown_table() {
        let text = csv(&["gift_tax,,0.1,"]);

        let err = BracketTableLoader::load(text.as_bytes()).expect_err("Should fail");

        match err {
            BracketLoaderError::UnknownTable(ref name) => assert_eq!(name, "gift_tax"),
            other => panic!("expected UnknownTable, got {other:?}"),
        }
    }

    #[test]
    fn test_build_rejects_bounded_last_bracket() {
        let text = csv(&["income_tax,14000000,0.06,", "income_tax,50000000,0.15,"]);

        let err = BracketTableLoader::load(text.as_bytes()).expect_err("Should fail");

        match err {
            BracketLoaderError::InvalidTable { table, source } => {
                assert_eq!(table, "income_tax");
                assert_eq!(source, BracketTableError::BoundedLastBracket(dec!(50000000)));
            }
            other => panic!("expected InvalidTable, got {other:?}"),
        }
    }

    #[test]
    fn test_build_rejects_wrong_deduction() {
        let text = csv(&["income_tax,14000000,0.06,0", "income_tax,,0.15,1000000"]);

        let err = BracketTableLoader::load(text.as_bytes()).expect_err("Should fail");

        assert!(matches!(
            err,
            BracketLoaderError::InvalidTable {
                source: BracketTableError::DeductionMismatch { index: 1, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_load_file_reports_missing_path() {
        let err = BracketTableLoader::load_file(Path::new("does/not/exist.csv"))
            .expect_err("Should fail");

        assert!(matches!(err, BracketLoaderError::Io { .. }));
    }
}
