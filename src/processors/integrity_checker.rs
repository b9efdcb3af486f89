use crate::models::{CropType, FieldRecord, StationMean, WeatherReading};
use crate::processors::weather_processor::station_means;
use crate::utils::constants::{MAX_VALID_PH, MIN_VALID_PH};
use serde::Serialize;
use std::collections::BTreeMap;
use validator::Validate;

#[derive(Debug, Clone, Serialize)]
pub struct IntegrityReport {
    pub total_fields: usize,
    pub total_readings: usize,
    pub unmapped_fields: usize,
    pub unmatched_messages: usize,
    pub violations: Vec<Violation>,
    pub crop_counts: BTreeMap<CropType, usize>,
    pub station_statistics: BTreeMap<u32, StationStatistics>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub subject: String,
    pub violation_type: ViolationType,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViolationType {
    NegativeElevation,
    OutOfRange,
    NegativeRainfall,
    TemperatureOrder,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StationStatistics {
    pub readings: usize,
    pub unmatched: usize,
    pub fields_served: usize,
    pub means: BTreeMap<String, f64>,
}

pub struct IntegrityChecker {
    temperature_tolerance: f64,
}

impl IntegrityChecker {
    pub fn new() -> Self {
        Self {
            temperature_tolerance: 0.5,
        }
    }

    pub fn with_temperature_tolerance(temperature_tolerance: f64) -> Self {
        Self {
            temperature_tolerance,
        }
    }

    /// Re-check the processed output and collect statistics
    pub fn check_integrity(
        &self,
        fields: &[FieldRecord],
        readings: &[WeatherReading],
    ) -> IntegrityReport {
        let mut report = IntegrityReport {
            total_fields: fields.len(),
            total_readings: readings.len(),
            unmapped_fields: 0,
            unmatched_messages: 0,
            violations: Vec::new(),
            crop_counts: BTreeMap::new(),
            station_statistics: BTreeMap::new(),
        };

        // Field checks, crop counts and station coverage
        for record in fields {
            self.check_field(record, &mut report);
            *report.crop_counts.entry(record.crop_type).or_insert(0) += 1;

            match record.weather_station_id {
                Some(station_id) => {
                    report
                        .station_statistics
                        .entry(station_id)
                        .or_default()
                        .fields_served += 1;
                }
                None => report.unmapped_fields += 1,
            }
        }

        // Reading checks and per-station message counts
        for (row, reading) in readings.iter().enumerate() {
            self.check_reading(row, reading, &mut report);

            let stats = report
                .station_statistics
                .entry(reading.station_id)
                .or_default();
            stats.readings += 1;
            if reading.is_unmatched() {
                stats.unmatched += 1;
                report.unmatched_messages += 1;
            }
        }

        // Means over primary measurements only
        for StationMean {
            station_id,
            measurement,
            mean,
            ..
        } in station_means(readings)
        {
            report
                .station_statistics
                .entry(station_id)
                .or_default()
                .means
                .insert(measurement.key().to_string(), mean);
        }

        report
    }

    fn check_field(&self, record: &FieldRecord, report: &mut IntegrityReport) {
        let subject = format!("Field {}", record.field_id);

        if record.elevation < 0.0 {
            report.violations.push(Violation {
                subject: subject.clone(),
                violation_type: ViolationType::NegativeElevation,
                details: format!("elevation {} is negative", record.elevation),
            });
        }

        if !(MIN_VALID_PH..=MAX_VALID_PH).contains(&record.ph) {
            report.violations.push(Violation {
                subject: subject.clone(),
                violation_type: ViolationType::OutOfRange,
                details: format!(
                    "pH {} is outside valid range [{}, {}]",
                    record.ph, MIN_VALID_PH, MAX_VALID_PH
                ),
            });
        }

        if let Err(e) = record.validate() {
            // negative elevation and pH are reported above with clearer messages
            let other: Vec<String> = e
                .field_errors()
                .keys()
                .filter(|k| {
                    let name: &str = k.as_ref();
                    !matches!(name, "elevation" | "ph")
                })
                .map(|k| k.to_string())
                .collect();
            if !other.is_empty() {
                report.violations.push(Violation {
                    subject: subject.clone(),
                    violation_type: ViolationType::OutOfRange,
                    details: format!("out of range: {}", other.join(", ")),
                });
            }
        }

        if record.min_temperature_c > record.max_temperature_c + self.temperature_tolerance {
            report.violations.push(Violation {
                subject,
                violation_type: ViolationType::TemperatureOrder,
                details: format!(
                    "min temperature {} > max temperature {} (tolerance={})",
                    record.min_temperature_c, record.max_temperature_c, self.temperature_tolerance
                ),
            });
        }
    }

    fn check_reading(&self, row: usize, reading: &WeatherReading, report: &mut IntegrityReport) {
        if let Some(rainfall) = reading.rainfall {
            if rainfall < 0.0 {
                report.violations.push(Violation {
                    subject: format!("Station {} message {}", reading.station_id, row),
                    violation_type: ViolationType::NegativeRainfall,
                    details: format!("rainfall {} extracted from '{}'", rainfall, reading.message),
                });
            }
        }
    }

    /// Generate a summary report
    pub fn generate_summary(&self, report: &IntegrityReport) -> String {
        let mut summary = String::new();

        summary.push_str("=== Integrity Check Report ===\n");
        summary.push_str(&format!("Fields: {}\n", report.total_fields));
        summary.push_str(&format!(
            "Fields without weather station: {}\n",
            report.unmapped_fields
        ));
        summary.push_str(&format!("Weather messages: {}\n", report.total_readings));
        summary.push_str(&format!(
            "Unmatched messages: {} ({:.1}%)\n",
            report.unmatched_messages,
            percentage(report.unmatched_messages, report.total_readings)
        ));

        if !report.crop_counts.is_empty() {
            summary.push_str("\nCrops:\n");
            for (crop, count) in &report.crop_counts {
                summary.push_str(&format!("  {:<8} {}\n", crop, count));
            }
        }

        if !report.station_statistics.is_empty() {
            summary.push_str("\nStations:\n");
            for (station_id, stats) in &report.station_statistics {
                let means: Vec<String> = stats
                    .means
                    .iter()
                    .map(|(field, mean)| format!("{}={:.2}", field, mean))
                    .collect();
                summary.push_str(&format!(
                    "  Station {}: {} messages, {} fields, {}\n",
                    station_id,
                    stats.readings,
                    stats.fields_served,
                    if means.is_empty() {
                        "no measurements".to_string()
                    } else {
                        means.join(", ")
                    }
                ));
            }
        }

        summary.push_str(&format!("\nViolations: {}\n", report.violations.len()));

        if !report.violations.is_empty() {
            summary.push_str("\nTop 10 Violations:\n");
            for (i, violation) in report.violations.iter().take(10).enumerate() {
                summary.push_str(&format!(
                    "  {}. {}: {}\n",
                    i + 1,
                    violation.subject,
                    violation.details
                ));
            }
        }

        summary
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}
