use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ProcessingError, Result};
use crate::models::{ColumnCheck, Table};
use crate::utils::constants::{FIELD_ID, STATION_MAPPING_COLUMNS, WEATHER_STATION_ID};

/// Which weather station serves each surveyed field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationMapping {
    field_to_station: HashMap<u32, u32>,
}

impl StationMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the mapping from a table with `Field_ID` and `Weather_station_ID` columns
    pub fn from_table(table: &Table) -> Result<Self> {
        table.require_columns(&STATION_MAPPING_COLUMNS, ColumnCheck::Contains)?;
        let field_col = table.require_column(FIELD_ID)?;
        let station_col = table.require_column(WEATHER_STATION_ID)?;

        let mut mapping = Self::new();
        for (row_number, row) in table.rows().iter().enumerate() {
            let field_id = parse_id(&row[field_col], FIELD_ID, row_number)?;
            let station_id = parse_id(&row[station_col], WEATHER_STATION_ID, row_number)?;
            mapping.insert(field_id, station_id);
        }

        Ok(mapping)
    }

    pub fn insert(&mut self, field_id: u32, station_id: u32) {
        self.field_to_station.insert(field_id, station_id);
    }

    pub fn station_for(&self, field_id: u32) -> Option<u32> {
        self.field_to_station.get(&field_id).copied()
    }

    pub fn len(&self) -> usize {
        self.field_to_station.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field_to_station.is_empty()
    }
}

fn parse_id(cell: &crate::models::Cell, column: &str, row_number: usize) -> Result<u32> {
    cell.as_i64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            ProcessingError::InvalidFormat(format!(
                "Invalid {} in row {}: '{}'",
                column, row_number, cell
            ))
        })
}
