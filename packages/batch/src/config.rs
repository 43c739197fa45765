//! Pipeline configuration loading.
//!
//! The defaults are embedded at compile time from `config/default.toml`.
//! A user config file is layered on top section by section: any section or
//! key it leaves out keeps its default value.

use std::collections::BTreeSet;
use std::path::Path;

use prea_report_models::Config;

use crate::BatchError;

/// Default configuration baked into the binary.
pub const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Parses and validates a TOML configuration string.
///
/// # Errors
///
/// Returns [`BatchError::Config`] if the TOML is malformed or describes
/// impossible page windows or table settings.
pub fn parse_config(toml_str: &str) -> Result<Config, BatchError> {
    let config: Config = toml::de::from_str(toml_str).map_err(|e| BatchError::Config {
        message: e.to_string(),
    })?;
    validate(&config)?;
    Ok(config)
}

/// Loads the configuration from `path`, or the embedded defaults when no
/// path is given.
///
/// # Errors
///
/// Returns [`BatchError::Io`] if the file cannot be read, or
/// [`BatchError::Config`] if it does not parse or validate.
pub fn load_config(path: Option<&Path>) -> Result<Config, BatchError> {
    let Some(path) = path else {
        log::debug!("Using embedded default configuration");
        return parse_config(DEFAULT_CONFIG);
    };

    log::debug!("Loading configuration from {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Renders a configuration back to TOML.
///
/// # Errors
///
/// Returns [`BatchError::Config`] if serialization fails.
pub fn to_toml(config: &Config) -> Result<String, BatchError> {
    toml::to_string(config).map_err(|e| BatchError::Config {
        message: e.to_string(),
    })
}

fn validate(config: &Config) -> Result<(), BatchError> {
    let mut seen = BTreeSet::new();
    for window in &config.windowed.page_windows {
        if window.start == 0 {
            return Err(config_error(format!(
                "page window for {} starts at page 0; pages are 1-based",
                window.year
            )));
        }
        if let Some(end) = window.end.filter(|&end| end < window.start) {
            return Err(config_error(format!(
                "page window for {} ends at page {end} before it starts at page {}",
                window.year, window.start
            )));
        }
        if !seen.insert(window.year) {
            return Err(config_error(format!(
                "more than one page window for {}",
                window.year
            )));
        }
    }

    if config.pdf.min_column_gap == 0 {
        return Err(config_error("pdf.min_column_gap must be at least 1".to_owned()));
    }
    if config.pdf.min_table_rows == 0 {
        return Err(config_error("pdf.min_table_rows must be at least 1".to_owned()));
    }

    Ok(())
}

const fn config_error(message: String) -> BatchError {
    BatchError::Config { message }
}
