//! Pipeline configuration
//!
//! Built-in defaults are layered under an optional config file and
//! `AGRI__*` environment variables. The resulting value is immutable and
//! handed to each processor at construction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::*;

/// One regex, or an ordered list of alternatives tried first to last
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternSpec {
    Single(String),
    Alternatives(Vec<String>),
}

impl PatternSpec {
    pub fn alternatives(&self) -> Vec<&str> {
        match self {
            PatternSpec::Single(pattern) => vec![pattern.as_str()],
            PatternSpec::Alternatives(patterns) => patterns.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PipelineConfig {
    #[validate(length(min = 1))]
    pub sql_query: String,

    #[validate(length(min = 1))]
    pub db_path: String,

    /// Known label swaps in the field table (old label -> label it should carry)
    pub columns_to_rename: BTreeMap<String, String>,

    /// Misspelled crop values -> corrected value
    pub values_to_rename: BTreeMap<String, String>,

    #[validate(length(min = 1))]
    pub weather_map_data: String,

    #[validate(length(min = 1))]
    pub weather_csv_path: String,

    pub regex_patterns: BTreeMap<String, PatternSpec>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let columns_to_rename = BTreeMap::from([
            (ANNUAL_YIELD.to_string(), CROP_TYPE.to_string()),
            (CROP_TYPE.to_string(), ANNUAL_YIELD.to_string()),
        ]);

        let values_to_rename = DEFAULT_VALUE_RENAMES
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();

        let regex_patterns = BTreeMap::from([
            (
                "Rainfall".to_string(),
                PatternSpec::Single(RAINFALL_PATTERN.to_string()),
            ),
            (
                "Temperature".to_string(),
                PatternSpec::Single(TEMPERATURE_PATTERN.to_string()),
            ),
            (
                "Pollution_level".to_string(),
                PatternSpec::Single(POLLUTION_PATTERN.to_string()),
            ),
        ]);

        Self {
            sql_query: DEFAULT_SQL_QUERY.to_string(),
            db_path: DEFAULT_DB_PATH.to_string(),
            columns_to_rename,
            values_to_rename,
            weather_map_data: DEFAULT_WEATHER_MAP_URL.to_string(),
            weather_csv_path: DEFAULT_WEATHER_CSV_URL.to_string(),
            regex_patterns,
        }
    }
}

impl PipelineConfig {
    /// Load defaults, then the optional file, then `AGRI__` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = ::config::Config::try_from(&PipelineConfig::default())?;
        let mut builder = ::config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            if !path.exists() {
                return Err(ProcessingError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(::config::File::from(path));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        );

        let settings: PipelineConfig = builder.build()?.try_deserialize()?;
        settings.check()?;
        Ok(settings)
    }

    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;
        if self.regex_patterns.is_empty() {
            return Err(ProcessingError::Config(
                "regex_patterns must name at least one field".to_string(),
            ));
        }
        Ok(())
    }
}
