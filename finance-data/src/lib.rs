//! Loaders for externally supplied reference data: progressive bracket
//! tables from CSV and statutory rate overrides from TOML.

mod brackets;
mod config;

pub use brackets::{BracketLoaderError, BracketRecord, BracketTableLoader, BracketTables};
pub use config::{ConfigLoader, ConfigLoaderError};
