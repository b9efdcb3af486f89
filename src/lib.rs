pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod utils;

pub use crate::config::PipelineConfig;
pub use error::{ProcessingError, Result};
