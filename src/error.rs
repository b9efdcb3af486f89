use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection error for '{path}': {message}")]
    Connection { path: String, message: String },

    #[error("Query error: {message} (query: {sql})")]
    Query { sql: String, message: String },

    #[error("Fetch error for '{location}': {message}")]
    Fetch { location: String, message: String },

    #[error("CSV parsing error in '{location}': {message}")]
    Parse { location: String, message: String },

    #[error("Data error: {0}")]
    Data(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Record validation error: {0}")]
    RecordValidation(#[from] validator::ValidationErrors),

    #[error("Invalid pattern for {field}: {source}")]
    Pattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] ::config::ConfigError),

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl ProcessingError {
    pub fn data(message: impl Into<String>) -> Self {
        ProcessingError::Data(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ProcessingError::Validation(message.into())
    }
}
