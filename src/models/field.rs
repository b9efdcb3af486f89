use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::models::{Cell, CellKind, Table};
use crate::utils::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropType {
    Cassava,
    Tea,
    Wheat,
    Potato,
    Banana,
    Coffee,
    Rice,
    Maize,
}

impl CropType {
    pub const ALL: [CropType; 8] = [
        CropType::Cassava,
        CropType::Tea,
        CropType::Wheat,
        CropType::Potato,
        CropType::Banana,
        CropType::Coffee,
        CropType::Rice,
        CropType::Maize,
    ];

    /// Parse an already normalized (trimmed, lower-case) crop label
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cassava" => Some(CropType::Cassava),
            "tea" => Some(CropType::Tea),
            "wheat" => Some(CropType::Wheat),
            "potato" => Some(CropType::Potato),
            "banana" => Some(CropType::Banana),
            "coffee" => Some(CropType::Coffee),
            "rice" => Some(CropType::Rice),
            "maize" => Some(CropType::Maize),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CropType::Cassava => "cassava",
            CropType::Tea => "tea",
            CropType::Wheat => "wheat",
            CropType::Potato => "potato",
            CropType::Banana => "banana",
            CropType::Coffee => "coffee",
            CropType::Rice => "rice",
            CropType::Maize => "maize",
        }
    }
}

impl fmt::Display for CropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Expected kind of each field survey column
pub fn field_column_kind(column: &str) -> Option<CellKind> {
    let kind = match column {
        FIELD_ID => CellKind::Integer,
        LOCATION | SOIL_TYPE | CROP_TYPE => CellKind::Text,
        _ if FIELD_COLUMNS.contains(&column) => CellKind::Real,
        _ => return None,
    };
    Some(kind)
}

/// One surveyed field after corrections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FieldRecord {
    pub field_id: u32,

    #[validate(range(min = 0.0))]
    pub elevation: f64,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    pub location: String,
    pub slope: f64,
    pub rainfall: f64,
    pub min_temperature_c: f64,
    pub max_temperature_c: f64,
    pub ave_temps: f64,
    pub soil_fertility: f64,
    pub soil_type: String,

    #[validate(range(min = 0.0, max = 14.0))]
    pub ph: f64,

    pub pollution_level: f64,
    pub plot_size: f64,
    pub crop_type: CropType,
    pub annual_yield: f64,
    pub standard_yield: f64,

    /// Station serving this field, attached from the mapping file
    pub weather_station_id: Option<u32>,
}

impl FieldRecord {
    /// Build typed records from a corrected field table
    pub fn from_table(table: &Table) -> Result<Vec<FieldRecord>> {
        let index = FieldColumnIndex::new(table)?;
        let mut records = Vec::with_capacity(table.height());

        for (row_number, row) in table.rows().iter().enumerate() {
            let row = FieldRow {
                cells: row,
                index: &index,
                row_number,
            };
            let record = FieldRecord {
                field_id: row.id(FIELD_ID)?,
                elevation: row.real(ELEVATION)?,
                latitude: row.real(LATITUDE)?,
                longitude: row.real(LONGITUDE)?,
                location: row.text(LOCATION)?,
                slope: row.real(SLOPE)?,
                rainfall: row.real(RAINFALL)?,
                min_temperature_c: row.real(MIN_TEMPERATURE)?,
                max_temperature_c: row.real(MAX_TEMPERATURE)?,
                ave_temps: row.real(AVE_TEMPS)?,
                soil_fertility: row.real(SOIL_FERTILITY)?,
                soil_type: row.text(SOIL_TYPE)?,
                ph: row.real(PH)?,
                pollution_level: row.real(POLLUTION_LEVEL)?,
                plot_size: row.real(PLOT_SIZE)?,
                crop_type: row.crop(CROP_TYPE)?,
                annual_yield: row.real(ANNUAL_YIELD)?,
                standard_yield: row.real(STANDARD_YIELD)?,
                weather_station_id: None,
            };
            record.validate()?;
            records.push(record);
        }

        Ok(records)
    }
}

/// Column label to index mapping for the field table
struct FieldColumnIndex {
    name_to_index: HashMap<&'static str, usize>,
}

impl FieldColumnIndex {
    fn new(table: &Table) -> Result<Self> {
        let mut name_to_index = HashMap::with_capacity(FIELD_COLUMNS.len());
        for name in FIELD_COLUMNS {
            name_to_index.insert(name, table.require_column(name)?);
        }
        Ok(Self { name_to_index })
    }

    fn get(&self, name: &str) -> usize {
        self.name_to_index[name]
    }
}

struct FieldRow<'a> {
    cells: &'a [Cell],
    index: &'a FieldColumnIndex,
    row_number: usize,
}

impl FieldRow<'_> {
    fn cell(&self, name: &str) -> Result<&Cell> {
        match &self.cells[self.index.get(name)] {
            Cell::Null => Err(ProcessingError::MissingData(format!(
                "{} is null in row {}",
                name, self.row_number
            ))),
            cell => Ok(cell),
        }
    }

    fn real(&self, name: &str) -> Result<f64> {
        let cell = self.cell(name)?;
        cell.as_f64().ok_or_else(|| {
            ProcessingError::data(format!(
                "{} in row {} is not numeric: '{}'",
                name, self.row_number, cell
            ))
        })
    }

    fn id(&self, name: &str) -> Result<u32> {
        let cell = self.cell(name)?;
        cell.as_i64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| {
                ProcessingError::data(format!(
                    "{} in row {} is not a valid identifier: '{}'",
                    name, self.row_number, cell
                ))
            })
    }

    fn text(&self, name: &str) -> Result<String> {
        Ok(self.cell(name)?.to_string())
    }

    fn crop(&self, name: &str) -> Result<CropType> {
        let cell = self.cell(name)?;
        cell.as_str()
            .and_then(CropType::parse)
            .ok_or_else(|| {
                ProcessingError::validation(format!(
                    "{} in row {} is not a valid crop: '{}'",
                    name, self.row_number, cell
                ))
            })
    }
}
