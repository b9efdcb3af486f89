//! Regex extraction of numeric values from free-text station messages
//!
//! Every field owns an ordered list of alternative patterns. Alternatives are
//! tried first to last and the first one that matches wins; inside a match
//! the first non-empty capture group carries the value. Patterns without
//! capture groups use the whole match.

use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::PatternSpec;
use crate::error::{ProcessingError, Result};
use crate::models::{WeatherField, WeatherReading};

#[derive(Debug, Clone)]
pub struct FieldPattern {
    field: WeatherField,
    alternatives: Vec<Regex>,
}

impl FieldPattern {
    pub fn new(field: WeatherField, patterns: &[&str]) -> Result<Self> {
        if patterns.is_empty() {
            return Err(ProcessingError::Config(format!(
                "No pattern configured for {}",
                field
            )));
        }

        let alternatives = patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ProcessingError::Pattern {
                    field: field.key().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            field,
            alternatives,
        })
    }

    pub fn field(&self) -> WeatherField {
        self.field
    }

    /// First value any alternative yields for this message
    pub fn extract(&self, message: &str) -> Option<f64> {
        self.alternatives
            .iter()
            .find_map(|regex| extract_with(regex, message))
    }
}

fn extract_with(regex: &Regex, message: &str) -> Option<f64> {
    let captures = regex.captures(message)?;

    let raw = if captures.len() > 1 {
        captures
            .iter()
            .skip(1)
            .flatten()
            .map(|m| m.as_str().trim())
            .find(|s| !s.is_empty())?
    } else {
        captures.get(0)?.as_str().trim()
    };

    match raw.parse::<f64>() {
        Ok(value) => Some(value),
        Err(_) => {
            debug!("Pattern matched '{}' but it is not a number", raw);
            None
        }
    }
}

/// Extraction patterns for every configured weather field
#[derive(Debug, Clone)]
pub struct PatternMap {
    patterns: BTreeMap<WeatherField, FieldPattern>,
}

impl PatternMap {
    pub fn from_config(regex_patterns: &BTreeMap<String, PatternSpec>) -> Result<Self> {
        let mut patterns = BTreeMap::new();
        for (key, spec) in regex_patterns {
            let field = WeatherField::parse(key).ok_or_else(|| {
                ProcessingError::Config(format!("Unknown weather field in regex_patterns: '{}'", key))
            })?;
            if patterns.contains_key(&field) {
                return Err(ProcessingError::Config(format!(
                    "Weather field {} configured more than once",
                    field
                )));
            }
            patterns.insert(field, FieldPattern::new(field, &spec.alternatives())?);
        }
        Ok(Self { patterns })
    }

    pub fn fields(&self) -> impl Iterator<Item = WeatherField> + '_ {
        self.patterns.keys().copied()
    }

    /// Run every field's patterns over one message
    pub fn extract(&self, station_id: u32, message: &str) -> WeatherReading {
        let mut reading = WeatherReading::new(station_id, message.to_string());
        for (field, pattern) in &self.patterns {
            reading.set(*field, pattern.extract(message));
        }
        reading
    }
}
