use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse {file}: {source}")]
    Report {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error("Data file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("Column '{column}' missing from {file}")]
    MissingColumn { file: String, column: String },

    #[error("Metric '{metric}' missing from global summary")]
    MissingMetric { metric: String },

    #[error("Invalid value '{value}' in {file} column '{column}'")]
    InvalidValue {
        file: String,
        column: String,
        value: String,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl DashboardError {
    pub fn not_found(message: &str) -> Self {
        DashboardError::NotFound(message.to_string())
    }

    pub fn config(message: impl Into<String>) -> Self {
        DashboardError::Config {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DashboardError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
