use agri_survey_processor::cli::{Cli, Commands};
use agri_survey_processor::config::PipelineConfig;
use agri_survey_processor::error::ProcessingError;
use agri_survey_processor::models::{CropType, WeatherField};
use agri_survey_processor::processors::{FieldProcessor, IntegrityChecker, Pipeline, ViolationType};
use agri_survey_processor::readers::{CsvFetcher, SqlReader};
use agri_survey_processor::utils::constants::{FIELD_COLUMNS, WEATHER_COLUMNS};
use clap::Parser;
use pretty_assertions::assert_eq;
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use validator::Validate;

const SURVEY_SQL: &str = "
    CREATE TABLE geographic_features (Field_ID INTEGER, Elevation REAL, Latitude REAL, Longitude REAL, Location TEXT, Slope REAL);
    CREATE TABLE weather_features (Field_ID INTEGER, Rainfall REAL, Min_temperature_C REAL, Max_temperature_C REAL, Ave_temps REAL);
    CREATE TABLE soil_and_crop_features (Field_ID INTEGER, Soil_fertility REAL, Soil_type TEXT, pH REAL);
    CREATE TABLE farm_management_features (Field_ID INTEGER, Pollution_level REAL, Plot_size REAL, Annual_yield TEXT, Crop_type REAL, Standard_yield REAL);
    INSERT INTO geographic_features VALUES
        (40734, 786.05, -7.389, -7.556, 'Rural_Akatsi', 14.795),
        (30629, -674.34, -7.736, -1.051, 'Rural_Sokoto', 11.374),
        (39924, 826.53, -9.926, 0.116, 'Rural_Sokoto', 11.339),
        (5754, 574.94, -2.420, -6.592, 'Rural_Kilimani', 7.109);
    INSERT INTO weather_features VALUES
        (40734, 1125.2, -3.1, 33.1, 15.0),
        (30629, 1450.7, -3.9, 30.6, 13.35),
        (39924, 2208.9, -1.8, 28.4, 13.3),
        (5754, 560.4, -5.0, 32.8, 13.9);
    INSERT INTO soil_and_crop_features VALUES
        (40734, 0.62, 'Sandy', 6.169),
        (30629, 0.64, 'Volcanic', 5.676),
        (39924, 0.69, 'Volcanic', 5.331),
        (5754, 0.54, 'Loamy', 5.741);
    INSERT INTO farm_management_features VALUES
        (40734, 0.083, 1.3, 'cassava ', 0.751, 0.578),
        (30629, 0.072, 2.2, 'wheatn', 1.069, 0.486),
        (39924, 0.073, 3.4, 'teaa', 2.208, 0.649),
        (5754, 0.085, 2.3, 'potato', 0.454, 0.317);
";

const WEATHER_CSV: &str = "\
Weather_station_ID,Message
0,2022-01-01 10:00:00 Weather station 0 - Rainfall: 12.5 mm
0,2022-01-01 11:00:00 Weather station 0 - Rainfall: 7.5 mm
1,2022-01-01 10:00:00 Weather station 1 - Temperature: 24.1 C
2,2022-01-01 10:00:00 Weather station 2 - Pollution at 3.5
2,2022-01-01 11:00:00 Weather station 2 - Air Quality Index = 4.5
1,Sensor offline
";

const STATION_MAP_CSV: &str = "\
Field_ID,Weather_station_ID
40734,0
30629,1
39924,2
";

struct Fixture {
    _dir: TempDir,
    config: PipelineConfig,
}

fn write_fixture() -> Fixture {
    let dir = TempDir::new().expect("Failed to create temp directory");

    let db_path = dir.path().join("survey.db");
    let conn = Connection::open(&db_path).unwrap();
    conn.execute_batch(SURVEY_SQL).unwrap();
    drop(conn);

    let weather_path = dir.path().join("weather_station_data.csv");
    fs::write(&weather_path, WEATHER_CSV).unwrap();
    let map_path = dir.path().join("weather_data_field_mapping.csv");
    fs::write(&map_path, STATION_MAP_CSV).unwrap();

    let config = PipelineConfig {
        db_path: format!("sqlite:///{}", db_path.display()),
        weather_csv_path: weather_path.display().to_string(),
        weather_map_data: format!("file://{}", map_path.display()),
        ..PipelineConfig::default()
    };

    Fixture { _dir: dir, config }
}

fn run(config: &PipelineConfig) -> agri_survey_processor::processors::PipelineOutput {
    let pipeline = Pipeline::new(config).unwrap();
    let database = SqlReader::open(&config.db_path).unwrap();
    pipeline.run(&database, &CsvFetcher::new(), None).unwrap()
}

#[test]
fn test_pipeline_end_to_end() {
    let fixture = write_fixture();
    let output = run(&fixture.config);

    assert_eq!(output.fields.table.columns(), &FIELD_COLUMNS);
    assert_eq!(output.fields.table.shape(), (4, 18));
    assert_eq!(output.weather.table.columns(), &WEATHER_COLUMNS);
    assert_eq!(output.weather.table.shape(), (6, 2));

    for record in &output.fields.records {
        assert!(record.elevation >= 0.0, "field {}", record.field_id);
        assert!(CropType::ALL.contains(&record.crop_type));
        assert!(record.validate().is_ok());
    }

    let crops: Vec<CropType> = output.fields.records.iter().map(|r| r.crop_type).collect();
    assert_eq!(
        crops,
        vec![CropType::Cassava, CropType::Wheat, CropType::Tea, CropType::Potato]
    );

    for reading in &output.weather.readings {
        if let Some(rainfall) = reading.rainfall {
            assert!(rainfall >= 0.0);
        }
    }

    assert!(output.report.is_clean());
    assert_eq!(output.report.total_fields, 4);
    assert_eq!(output.report.total_readings, 6);
}

#[test]
fn test_swapped_labels_are_corrected() {
    let fixture = write_fixture();
    let output = run(&fixture.config);

    let sokoto = &output.fields.records[1];
    assert_eq!(sokoto.field_id, 30629);
    assert_eq!(sokoto.crop_type, CropType::Wheat);
    assert!((sokoto.annual_yield - 1.069).abs() < 1e-9);
    assert!((sokoto.elevation - 674.34).abs() < 1e-9);
}

#[test]
fn test_weather_extraction_and_station_means() {
    let fixture = write_fixture();
    let output = run(&fixture.config);
    let readings = &output.weather.readings;

    assert_eq!(readings[0].rainfall, Some(12.5));
    assert_eq!(readings[0].measurement, Some(WeatherField::Rainfall));
    assert_eq!(readings[2].temperature, Some(24.1));
    assert_eq!(readings[3].pollution_level, Some(3.5));
    assert_eq!(readings[4].pollution_level, Some(4.5));
    assert!(readings[5].is_unmatched());

    assert_eq!(output.weather.matched_count(WeatherField::Rainfall), 2);
    assert_eq!(output.weather.unmatched_count(), 1);
    assert_eq!(output.report.unmatched_messages, 1);

    let station_0 = &output.report.station_statistics[&0];
    assert_eq!(station_0.readings, 2);
    assert_eq!(station_0.fields_served, 1);
    assert_eq!(station_0.means.get("Rainfall"), Some(&10.0));

    let station_2 = &output.report.station_statistics[&2];
    assert_eq!(station_2.means.get("Pollution_level"), Some(&4.0));
}

#[test]
fn test_station_mapping_attached_to_fields() {
    let fixture = write_fixture();
    let output = run(&fixture.config);

    let stations: Vec<Option<u32>> = output
        .fields
        .records
        .iter()
        .map(|r| r.weather_station_id)
        .collect();
    assert_eq!(stations, vec![Some(0), Some(1), Some(2), None]);
    assert_eq!(output.report.unmapped_fields, 1);
}

#[test]
fn test_corrections_idempotent_on_database() {
    let fixture = write_fixture();
    let processor = FieldProcessor::new(&fixture.config).unwrap();
    let database = SqlReader::open(&fixture.config.db_path).unwrap();

    let raw = processor.load(&database).unwrap();
    let once = processor.apply_corrections(raw).unwrap();
    let twice = processor.apply_corrections(once.clone()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_invalid_crop_fails_with_field_id() {
    let fixture = write_fixture();
    let db = fixture.config.db_path.trim_start_matches("sqlite:///").to_string();
    let conn = Connection::open(&db).unwrap();
    conn.execute(
        "UPDATE farm_management_features SET Annual_yield = 'sorghum' WHERE Field_ID = 5754",
        [],
    )
    .unwrap();
    drop(conn);

    let pipeline = Pipeline::new(&fixture.config).unwrap();
    let database = SqlReader::open(&fixture.config.db_path).unwrap();
    let err = pipeline
        .run(&database, &CsvFetcher::new(), None)
        .unwrap_err();

    match err {
        ProcessingError::Validation(message) => {
            assert!(message.contains("sorghum"));
            assert!(message.contains("5754"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_weather_file_with_extra_column_is_rejected() {
    let fixture = write_fixture();
    fs::write(
        &fixture.config.weather_csv_path,
        "Weather_station_ID,Message,Extra\n0,Rainfall: 1 mm,x\n",
    )
    .unwrap();

    let pipeline = Pipeline::new(&fixture.config).unwrap();
    let database = SqlReader::open(&fixture.config.db_path).unwrap();
    let err = pipeline
        .run(&database, &CsvFetcher::new(), None)
        .unwrap_err();
    assert!(matches!(err, ProcessingError::Data(_)));
}

#[test]
fn test_missing_weather_file_is_fetch_error() {
    let mut fixture = write_fixture();
    fixture.config.weather_csv_path = "/nonexistent/weather.csv".to_string();

    let pipeline = Pipeline::new(&fixture.config).unwrap();
    let database = SqlReader::open(&fixture.config.db_path).unwrap();
    let err = pipeline
        .run(&database, &CsvFetcher::new(), None)
        .unwrap_err();
    assert!(matches!(err, ProcessingError::Fetch { .. }));
}

#[test]
fn test_missing_database_is_connection_error() {
    let err = SqlReader::open("sqlite:///nonexistent/survey.db").err().unwrap();
    assert!(matches!(err, ProcessingError::Connection { .. }));
}

#[test]
fn test_checker_flags_negative_rainfall() {
    let fixture = write_fixture();
    let output = run(&fixture.config);

    let mut readings = output.weather.readings.clone();
    readings[0].rainfall = Some(-1.0);

    let pipeline = Pipeline::new(&fixture.config).unwrap();
    let report = pipeline
        .checker()
        .check_integrity(&output.fields.records, &readings);
    assert!(!report.is_clean());
    assert_eq!(
        report.violations[0].violation_type,
        ViolationType::NegativeRainfall
    );
}

#[test]
fn test_validate_tolerance_flag_reaches_checker() {
    let fixture = write_fixture();
    let db = fixture.config.db_path.trim_start_matches("sqlite:///").to_string();
    let conn = Connection::open(&db).unwrap();
    conn.execute(
        "UPDATE weather_features SET Min_temperature_C = 31.0, Max_temperature_C = 30.0 WHERE Field_ID = 5754",
        [],
    )
    .unwrap();
    drop(conn);

    let cli = Cli::try_parse_from([
        "agri-processor",
        "validate",
        "--temperature-tolerance",
        "2",
    ])
    .unwrap();
    let tolerance = match cli.command {
        Commands::Validate {
            temperature_tolerance,
            ..
        } => temperature_tolerance,
        _ => panic!("expected the validate command"),
    };
    assert_eq!(tolerance, 2.0);

    let database = SqlReader::open(&fixture.config.db_path).unwrap();
    let default_run = Pipeline::new(&fixture.config)
        .unwrap()
        .run(&database, &CsvFetcher::new(), None)
        .unwrap();
    assert_eq!(default_run.report.violations.len(), 1);
    assert_eq!(
        default_run.report.violations[0].violation_type,
        ViolationType::TemperatureOrder
    );

    let lenient = Pipeline::new(&fixture.config)
        .unwrap()
        .with_checker(IntegrityChecker::with_temperature_tolerance(tolerance));
    let output = lenient.run(&database, &CsvFetcher::new(), None).unwrap();
    assert!(output.report.is_clean());
}

#[test]
fn test_config_file_overrides_paths() {
    let fixture = write_fixture();
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("pipeline.toml");
    write_config(&config_path, &fixture.config);

    let loaded = PipelineConfig::load(Some(&config_path)).unwrap();
    assert_eq!(loaded.db_path, fixture.config.db_path);
    assert_eq!(loaded.weather_csv_path, fixture.config.weather_csv_path);
    assert_eq!(loaded.sql_query, PipelineConfig::default().sql_query);

    let output = run(&loaded);
    assert_eq!(output.fields.records.len(), 4);
}

fn write_config(path: &Path, config: &PipelineConfig) {
    let toml = format!(
        "db_path = '{}'\nweather_csv_path = '{}'\nweather_map_data = '{}'\n",
        config.db_path, config.weather_csv_path, config.weather_map_data
    );
    fs::write(path, toml).unwrap();
}
