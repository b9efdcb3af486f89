use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::{ColumnCheck, CropType, FieldRecord, StationMapping, Table};
use crate::processors::corrections::{ColumnSwap, CropTypeNormalizer, ElevationCorrection};
use crate::readers::TableQuery;
use crate::utils::constants::{CROP_TYPE, ELEVATION, FIELD_COLUMNS};

/// Corrected field table and the typed records built from it
#[derive(Debug, Clone)]
pub struct FieldDataset {
    pub table: Table,
    pub records: Vec<FieldRecord>,
}

impl FieldDataset {
    pub fn crop_counts(&self) -> BTreeMap<CropType, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.crop_type).or_insert(0) += 1;
        }
        counts
    }
}

pub struct FieldProcessor {
    sql_query: String,
    swaps: Vec<ColumnSwap>,
    crop_normalizer: CropTypeNormalizer,
    elevation: ElevationCorrection,
}

impl FieldProcessor {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            sql_query: config.sql_query.clone(),
            swaps: ColumnSwap::from_rename_map(&config.columns_to_rename)?,
            crop_normalizer: CropTypeNormalizer::new(CROP_TYPE, &config.values_to_rename),
            elevation: ElevationCorrection::new(ELEVATION),
        })
    }

    /// Run the survey query; the result must carry exactly the field columns
    pub fn load(&self, source: &impl TableQuery) -> Result<Table> {
        let table = source.query(&self.sql_query)?;
        table.require_columns(&FIELD_COLUMNS, ColumnCheck::ExactSet)?;
        info!("Loaded {} field records", table.height());
        Ok(table)
    }

    /// Label swap, crop normalization, then elevation sign correction
    pub fn apply_corrections(&self, table: Table) -> Result<Table> {
        let mut table = table;
        // Swaps first so later steps find values under their real labels
        for swap in &self.swaps {
            table = swap.apply(table)?;
        }
        let table = self.crop_normalizer.apply(table)?;
        let table = self.elevation.apply(table)?;

        // Documented order holds only after the swaps
        table.require_columns(&FIELD_COLUMNS, ColumnCheck::ExactOrder)?;
        Ok(table)
    }

    pub fn process(&self, source: &impl TableQuery) -> Result<FieldDataset> {
        let table = self.load(source)?;
        let table = self.apply_corrections(table)?;
        let records = FieldRecord::from_table(&table)?;
        Ok(FieldDataset { table, records })
    }

    /// Attach the serving weather station to each record
    pub fn map_weather_stations(&self, dataset: &mut FieldDataset, mapping: &StationMapping) {
        let mut unmapped = 0usize;
        for record in &mut dataset.records {
            record.weather_station_id = mapping.station_for(record.field_id);
            if record.weather_station_id.is_none() {
                unmapped += 1;
            }
        }
        if unmapped > 0 {
            warn!("{} fields have no weather station mapping", unmapped);
        }
    }
}
