pub mod corrections;
pub mod field_processor;
pub mod integrity_checker;
pub mod pattern_extractor;
pub mod pipeline;
pub mod weather_processor;

pub use corrections::{ColumnSwap, CropTypeNormalizer, ElevationCorrection, SwapState};
pub use field_processor::{FieldDataset, FieldProcessor};
pub use integrity_checker::{
    IntegrityChecker, IntegrityReport, StationStatistics, Violation, ViolationType,
};
pub use pattern_extractor::{FieldPattern, PatternMap};
pub use pipeline::{Pipeline, PipelineOutput};
pub use weather_processor::{station_means, WeatherDataset, WeatherProcessor};
