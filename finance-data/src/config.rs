use std::fs;
use std::path::Path;

use finance_core::{ConfigError, TaxYearConfig};
use thiserror::Error;
use tracing::info;

/// Errors that can occur when loading statutory rate overrides.
#[derive(Debug, Error)]
pub enum ConfigLoaderError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
}

impl From<toml::de::Error> for ConfigLoaderError {
    fn from(err: toml::de::Error) -> Self {
        ConfigLoaderError::TomlParse(err.to_string())
    }
}

/// Loader for [`TaxYearConfig`] overrides from TOML.
///
/// Fields a file leaves out keep their built-in 2025 values. Amounts may be
/// written as integers or quoted decimals (`rate = "0.045"`).
pub struct ConfigLoader;

impl ConfigLoader {
    /// Parse and validate a configuration from TOML text.
    pub fn parse(text: &str) -> Result<TaxYearConfig, ConfigLoaderError> {
        let config: TaxYearConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file on disk.
    pub fn load_file(path: &Path) -> Result<TaxYearConfig, ConfigLoaderError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigLoaderError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::parse(&text)?;
        info!(
            path = %path.display(),
            tax_year = config.tax_year,
            "Loaded rate configuration"
        );
        Ok(config)
    }
}
