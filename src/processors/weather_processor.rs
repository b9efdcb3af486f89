use std::collections::BTreeMap;
use tracing::{debug, info};
use validator::Validate;

use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{ColumnCheck, StationMapping, StationMean, Table, WeatherField, WeatherReading};
use crate::processors::PatternMap;
use crate::readers::CsvSource;
use crate::utils::constants::{MESSAGE, WEATHER_COLUMNS, WEATHER_STATION_ID};

/// Station messages as loaded plus the values extracted from them
#[derive(Debug, Clone)]
pub struct WeatherDataset {
    pub table: Table,
    pub readings: Vec<WeatherReading>,
}

impl WeatherDataset {
    pub fn matched_count(&self, field: WeatherField) -> usize {
        self.readings.iter().filter(|r| r.get(field).is_some()).count()
    }

    pub fn unmatched_count(&self) -> usize {
        self.readings.iter().filter(|r| r.is_unmatched()).count()
    }
}

pub struct WeatherProcessor {
    weather_csv_path: String,
    weather_map_data: String,
    patterns: PatternMap,
}

impl WeatherProcessor {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            weather_csv_path: config.weather_csv_path.clone(),
            weather_map_data: config.weather_map_data.clone(),
            patterns: PatternMap::from_config(&config.regex_patterns)?,
        })
    }

    pub fn patterns(&self) -> &PatternMap {
        &self.patterns
    }

    /// Fetch the station message table; exactly `Weather_station_ID`, `Message`
    pub fn load(&self, source: &impl CsvSource) -> Result<Table> {
        let table = source.fetch_csv(&self.weather_csv_path)?;
        table.require_columns(&WEATHER_COLUMNS, ColumnCheck::ExactOrder)?;
        Ok(table)
    }

    /// Run the pattern map over every message
    pub fn extract(&self, table: &Table) -> Result<Vec<WeatherReading>> {
        let station_col = table.require_column(WEATHER_STATION_ID)?;
        let message_col = table.require_column(MESSAGE)?;

        let mut readings = Vec::with_capacity(table.height());
        for (row_number, row) in table.rows().iter().enumerate() {
            let station_id = row[station_col]
                .as_i64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| {
                    ProcessingError::data(format!(
                        "{} in row {} is not a station id: '{}'",
                        WEATHER_STATION_ID, row_number, row[station_col]
                    ))
                })?;

            // Null messages extract nothing and count as unmatched
            let message = match &row[message_col] {
                crate::models::Cell::Null => String::new(),
                cell => cell.to_string(),
            };

            let reading = self.patterns.extract(station_id, &message);
            if reading.is_unmatched() {
                debug!("No pattern matched message in row {}: '{}'", row_number, message);
            }
            readings.push(reading);
        }

        Ok(readings)
    }

    /// Extracted rainfall must be non-negative
    pub fn validate_readings(&self, readings: &[WeatherReading]) -> Result<()> {
        for (row_number, reading) in readings.iter().enumerate() {
            reading.validate().map_err(|_| {
                ProcessingError::validation(format!(
                    "Rainfall {:?} extracted from row {} (station {}) is negative: '{}'",
                    reading.rainfall, row_number, reading.station_id, reading.message
                ))
            })?;
        }
        Ok(())
    }

    pub fn process(&self, source: &impl CsvSource) -> Result<WeatherDataset> {
        let table = self.load(source)?;
        let readings = self.extract(&table)?;
        // Fail on the first negative rainfall
        self.validate_readings(&readings)?;

        let dataset = WeatherDataset { table, readings };
        info!(
            "Extracted {} messages: rainfall {}, temperature {}, pollution {}, unmatched {}",
            dataset.readings.len(),
            dataset.matched_count(WeatherField::Rainfall),
            dataset.matched_count(WeatherField::Temperature),
            dataset.matched_count(WeatherField::PollutionLevel),
            dataset.unmatched_count()
        );
        Ok(dataset)
    }

    /// Field to station mapping from `weather_map_data`
    pub fn load_station_mapping(&self, source: &impl CsvSource) -> Result<StationMapping> {
        let table = source.fetch_csv(&self.weather_map_data)?;
        let mapping = StationMapping::from_table(&table)?;
        info!("Loaded station mapping for {} fields", mapping.len());
        Ok(mapping)
    }
}

/// Mean of each station's primary measurements, ordered by station then field
pub fn station_means(readings: &[WeatherReading]) -> Vec<StationMean> {
    let mut sums: BTreeMap<(u32, WeatherField), (f64, usize)> = BTreeMap::new();
    for reading in readings {
        if let Some((field, value)) = reading.primary_value() {
            let entry = sums.entry((reading.station_id, field)).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .map(|((station_id, measurement), (sum, count))| StationMean {
            station_id,
            measurement,
            mean: sum / count as f64,
            count,
        })
        .collect()
}
