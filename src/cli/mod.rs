pub mod args;
pub mod commands;

pub use args::{Cli, Commands};
pub use commands::run;

use tracing_subscriber::EnvFilter;

/// Logs go to stderr so `validate --json` output stays parseable
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
