use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Numeric fields extracted from station messages, in extraction order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WeatherField {
    Rainfall,
    Temperature,
    PollutionLevel,
}

impl WeatherField {
    pub const ALL: [WeatherField; 3] = [
        WeatherField::Rainfall,
        WeatherField::Temperature,
        WeatherField::PollutionLevel,
    ];

    /// Parse a pattern-map key; case and separators are not significant
    pub fn parse(s: &str) -> Option<Self> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | ' ' | '-'))
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "rainfall" | "rain" => Some(WeatherField::Rainfall),
            "temperature" | "temp" => Some(WeatherField::Temperature),
            "pollutionlevel" | "pollution" => Some(WeatherField::PollutionLevel),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            WeatherField::Rainfall => "Rainfall",
            WeatherField::Temperature => "Temperature",
            WeatherField::PollutionLevel => "Pollution_level",
        }
    }

    pub fn units(&self) -> &'static str {
        match self {
            WeatherField::Rainfall => "mm",
            WeatherField::Temperature => "°C",
            WeatherField::PollutionLevel => "",
        }
    }
}

impl fmt::Display for WeatherField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Values extracted from one station message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct WeatherReading {
    pub station_id: u32,
    pub message: String,

    #[validate(range(min = 0.0))]
    pub rainfall: Option<f64>,

    pub temperature: Option<f64>,
    pub pollution_level: Option<f64>,

    /// First field, in extraction order, that holds a value
    pub measurement: Option<WeatherField>,
}

impl WeatherReading {
    pub fn new(station_id: u32, message: String) -> Self {
        Self {
            station_id,
            message,
            rainfall: None,
            temperature: None,
            pollution_level: None,
            measurement: None,
        }
    }

    pub fn get(&self, field: WeatherField) -> Option<f64> {
        match field {
            WeatherField::Rainfall => self.rainfall,
            WeatherField::Temperature => self.temperature,
            WeatherField::PollutionLevel => self.pollution_level,
        }
    }

    pub fn set(&mut self, field: WeatherField, value: Option<f64>) {
        match field {
            WeatherField::Rainfall => self.rainfall = value,
            WeatherField::Temperature => self.temperature = value,
            WeatherField::PollutionLevel => self.pollution_level = value,
        }
        self.measurement = WeatherField::ALL
            .into_iter()
            .find(|f| self.get(*f).is_some());
    }

    /// Value of the primary measurement, if any pattern matched
    pub fn primary_value(&self) -> Option<(WeatherField, f64)> {
        self.measurement
            .and_then(|field| self.get(field).map(|value| (field, value)))
    }

    pub fn is_unmatched(&self) -> bool {
        self.measurement.is_none()
    }
}

/// Mean of one measurement across a station's messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationMean {
    pub station_id: u32,
    pub measurement: WeatherField,
    pub mean: f64,
    pub count: usize,
}
