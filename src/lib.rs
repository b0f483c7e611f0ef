//! ETL Project Library
//!
//! Gathers people records (name, height in inches, weight in pounds) from
//! CSV, JSON-lines and XML files, converts them to metres and kilograms, and
//! loads the result into a flat CSV file and a PostgreSQL table.
//!
//! This library provides tools for:
//! - Discovering and reading source files of each format into one table
//! - Unit conversion with two-decimal rounding
//! - Writing the flat file and replacing the database table
//! - Reading the table back and logging progress at every phase boundary

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod processor;
pub mod progress_log;

// Re-export commonly used types
pub use config::{DatabaseConfig, EtlConfig};
pub use error::{EtlError, Result};
pub use models::{Phase, ProcessingStats, Record, SourceFormat, Table};
pub use processor::EtlJob;
pub use progress_log::{ProgressEvent, ProgressLogger};
