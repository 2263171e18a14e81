use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV processing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML (de)serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV file not found at: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Input is not readable as delimited text: {0}")]
    InputFormat(String),
}

pub type Result<T> = std::result::Result<T, AdapterError>;
