//! Error handling for ETL job operations.
//!
//! Provides error types with context for source discovery, format parsing,
//! sink writing and database failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Config file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Source directory not found at path: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Invalid source pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to parse file: {path} - {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Schema mismatch in file: {path} - missing column '{missing}'")]
    SchemaMismatch { path: PathBuf, missing: String },

    #[error("Column '{column}' has type {found}, expected {expected}")]
    ColumnType {
        column: String,
        expected: String,
        found: String,
    },

    #[error("Null value in column '{column}' at row {row}")]
    NullValue { column: String, row: usize },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl EtlError {
    /// Create a parse error for a source file
    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
