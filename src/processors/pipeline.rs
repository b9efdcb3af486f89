use crate::config::PipelineConfig;
use crate::error::Result;
use crate::processors::{
    FieldDataset, FieldProcessor, IntegrityChecker, IntegrityReport, WeatherDataset,
    WeatherProcessor,
};
use crate::readers::{CsvSource, TableQuery};
use crate::utils::progress::ProgressReporter;

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub fields: FieldDataset,
    pub weather: WeatherDataset,
    pub report: IntegrityReport,
}

/// Straight-line run of both processors followed by the integrity check
pub struct Pipeline {
    field_processor: FieldProcessor,
    weather_processor: WeatherProcessor,
    checker: IntegrityChecker,
}

impl Pipeline {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        config.check()?;
        Ok(Self {
            field_processor: FieldProcessor::new(config)?,
            weather_processor: WeatherProcessor::new(config)?,
            checker: IntegrityChecker::new(),
        })
    }

    pub fn with_checker(mut self, checker: IntegrityChecker) -> Self {
        self.checker = checker;
        self
    }

    pub fn checker(&self) -> &IntegrityChecker {
        &self.checker
    }

    pub fn weather_processor(&self) -> &WeatherProcessor {
        &self.weather_processor
    }

    pub fn run(
        &self,
        database: &impl TableQuery,
        files: &impl CsvSource,
        progress: Option<&ProgressReporter>,
    ) -> Result<PipelineOutput> {
        if let Some(p) = progress {
            p.set_message("Loading and correcting field survey...");
        }
        let mut fields = self.field_processor.process(database)?;

        if let Some(p) = progress {
            p.set_message("Mapping fields to weather stations...");
        }
        // Mapping is read before the messages so field records carry their station
        let mapping = self.weather_processor.load_station_mapping(files)?;
        self.field_processor.map_weather_stations(&mut fields, &mapping);

        if let Some(p) = progress {
            p.set_message("Extracting weather measurements...");
        }
        let weather = self.weather_processor.process(files)?;

        if let Some(p) = progress {
            p.set_message("Checking data integrity...");
        }
        let report = self
            .checker
            .check_integrity(&fields.records, &weather.readings);

        if let Some(p) = progress {
            p.finish_with_message("Processing complete");
        }

        Ok(PipelineOutput {
            fields,
            weather,
            report,
        })
    }
}
