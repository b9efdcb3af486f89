use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agri-processor")]
#[command(about = "Field survey and weather message cleaning pipeline")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(
        short,
        long,
        global = true,
        help = "Config file (TOML, YAML or JSON) layered over the built-in defaults"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load, correct and extract both datasets, then print the integrity summary
    Process {
        #[arg(short, long, default_value = "5", help = "Sample records to print")]
        sample: usize,
    },

    /// Run the pipeline and report violations; exits non-zero when any are found
    Validate {
        #[arg(long, default_value = "false", help = "Print the report as JSON")]
        json: bool,

        #[arg(
            long,
            default_value = "0.5",
            help = "Allowed excess of min over max temperature before a field is flagged"
        )]
        temperature_tolerance: f64,
    },

    /// Run the configured patterns over a single message
    Extract {
        #[arg(help = "Message text, e.g. \"Pollution at 3.5\"")]
        message: String,

        #[arg(long, default_value = "0")]
        station_id: u32,
    },
}
