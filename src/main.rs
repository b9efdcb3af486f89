use agri_survey_processor::cli::{init_tracing, run, Cli};
use anyhow::Context;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    run(cli).context("agri-processor failed")
}
