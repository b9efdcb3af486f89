use crate::cli::args::{Cli, Commands};
use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::processors::{IntegrityChecker, Pipeline, PipelineOutput};
use crate::readers::{CsvFetcher, SqlReader};
use crate::utils::progress::ProgressReporter;
use tracing::{debug, info};

pub fn run(cli: Cli) -> Result<()> {
    let config = PipelineConfig::load(cli.config.as_deref())?;
    debug!(db_path = %config.db_path, "configuration loaded");

    match cli.command {
        Commands::Process { sample } => {
            println!("Processing field survey and weather data...");
            println!("Database: {}", config.db_path);
            println!("Weather messages: {}", config.weather_csv_path);

            let pipeline = Pipeline::new(&config)?;
            let output = run_pipeline(&pipeline, &config, false)?;
            println!("\n{}", pipeline.checker().generate_summary(&output.report));

            if sample > 0 {
                print_samples(&output, sample);
            }

            info!(
                fields = output.fields.records.len(),
                readings = output.weather.readings.len(),
                "processing complete"
            );
        }

        Commands::Validate {
            json,
            temperature_tolerance,
        } => {
            let checker = IntegrityChecker::with_temperature_tolerance(temperature_tolerance);
            let pipeline = Pipeline::new(&config)?.with_checker(checker);
            let output = run_pipeline(&pipeline, &config, json)?;

            if json {
                let rendered = serde_json::to_string_pretty(&output.report).map_err(|e| {
                    ProcessingError::InvalidFormat(format!("Cannot render report: {}", e))
                })?;
                println!("{}", rendered);
            } else {
                println!("\n{}", pipeline.checker().generate_summary(&output.report));
            }

            if output.report.is_clean() {
                if !json {
                    println!("All data passed validation checks");
                }
            } else {
                return Err(ProcessingError::validation(format!(
                    "Found {} validation issues",
                    output.report.violations.len()
                )));
            }
        }

        Commands::Extract {
            message,
            station_id,
        } => {
            let pipeline = Pipeline::new(&config)?;
            let reading = pipeline
                .weather_processor()
                .patterns()
                .extract(station_id, &message);

            match reading.measurement {
                Some(primary) => {
                    for field in pipeline.weather_processor().patterns().fields() {
                        if let Some(value) = reading.get(field) {
                            println!("{}: {} {}", field, value, field.units());
                        }
                    }
                    println!("Measurement: {}", primary);
                }
                None => println!("No pattern matched"),
            }
        }
    }

    Ok(())
}

fn run_pipeline(
    pipeline: &Pipeline,
    config: &PipelineConfig,
    silent: bool,
) -> Result<PipelineOutput> {
    let database = SqlReader::open(&config.db_path)?;
    let fetcher = CsvFetcher::new();

    let progress = ProgressReporter::new_spinner("Processing data...", silent);
    pipeline.run(&database, &fetcher, Some(&progress))
}

fn print_samples(output: &PipelineOutput, sample: usize) {
    println!("Sample fields (showing {}):", sample.min(output.fields.records.len()));
    for (i, record) in output.fields.records.iter().take(sample).enumerate() {
        println!(
            "{}. Field {}: {} in {}, elevation {:.1}m, yield {:.2}, station {}",
            i + 1,
            record.field_id,
            record.crop_type,
            record.location,
            record.elevation,
            record.annual_yield,
            record
                .weather_station_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }

    println!(
        "\nSample weather messages (showing {}):",
        sample.min(output.weather.readings.len())
    );
    for (i, reading) in output.weather.readings.iter().take(sample).enumerate() {
        let extracted = match reading.primary_value() {
            Some((field, value)) => format!("{}={} {}", field, value, field.units()),
            None => "unmatched".to_string(),
        };
        println!(
            "{}. Station {}: \"{}\" -> {}",
            i + 1,
            reading.station_id,
            reading.message,
            extracted
        );
    }
}
