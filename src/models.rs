//! Core data structures and types for the ETL job.
//!
//! Defines source formats, the person record, the polars-backed table
//! every phase passes along, job phases and run statistics.

use crate::constants::{HEIGHT_COLUMN, NAME_COLUMN, RECORD_COLUMNS, WEIGHT_COLUMN};
use crate::error::{EtlError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Source file formats, in the order they are extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SourceFormat {
    Csv,
    Json,
    Xml,
}

impl SourceFormat {
    /// All formats in extraction order
    pub const ALL: [SourceFormat; 3] = [SourceFormat::Csv, SourceFormat::Json, SourceFormat::Xml];

    /// File extension matched during discovery
    pub fn extension(&self) -> &'static str {
        match self {
            SourceFormat::Csv => "csv",
            SourceFormat::Json => "json",
            SourceFormat::Xml => "xml",
        }
    }

    /// Detect the format from a file extension (exact, lowercase)
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        Self::ALL
            .into_iter()
            .find(|format| format.extension() == extension)
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceFormat::Csv => "CSV",
            SourceFormat::Json => "JSON",
            SourceFormat::Xml => "XML",
        })
    }
}

/// A discovered source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub format: SourceFormat,
    pub path: PathBuf,
}

/// One person record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub height: f64,
    pub weight: f64,
}

impl Record {
    pub fn new(name: impl Into<String>, height: f64, weight: f64) -> Self {
        Self {
            name: name.into(),
            height,
            weight,
        }
    }
}

/// Ordered collection of records with columns `name`, `height`, `weight`
#[derive(Debug, Clone)]
pub struct Table {
    frame: DataFrame,
}

impl Table {
    /// Table with the canonical schema and no rows
    pub fn empty() -> Self {
        let schema = Schema::from_iter([
            (PlSmallStr::from(NAME_COLUMN), DataType::String),
            (PlSmallStr::from(HEIGHT_COLUMN), DataType::Float64),
            (PlSmallStr::from(WEIGHT_COLUMN), DataType::Float64),
        ]);

        Self {
            frame: DataFrame::empty_with_schema(&schema),
        }
    }

    /// Build a table from records, preserving their order
    pub fn from_records(records: &[Record]) -> Result<Self> {
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        let heights: Vec<f64> = records.iter().map(|r| r.height).collect();
        let weights: Vec<f64> = records.iter().map(|r| r.weight).collect();

        let frame = df!(
            NAME_COLUMN => names,
            HEIGHT_COLUMN => heights,
            WEIGHT_COLUMN => weights
        )?;

        Ok(Self { frame })
    }

    /// Wrap a frame, checking column presence, types and nulls.
    ///
    /// Extra columns are dropped and the canonical order is restored.
    pub fn from_frame(frame: DataFrame) -> Result<Self> {
        for (column, expected) in [
            (NAME_COLUMN, DataType::String),
            (HEIGHT_COLUMN, DataType::Float64),
            (WEIGHT_COLUMN, DataType::Float64),
        ] {
            let found = frame.column(column)?;
            if found.dtype() != &expected {
                return Err(EtlError::ColumnType {
                    column: column.to_string(),
                    expected: expected.to_string(),
                    found: found.dtype().to_string(),
                });
            }
            if found.null_count() > 0 {
                let mask = found.as_materialized_series().is_null();
                let row = (&mask)
                    .into_iter()
                    .position(|is_null| is_null == Some(true))
                    .unwrap_or(0);
                return Err(EtlError::NullValue {
                    column: column.to_string(),
                    row,
                });
            }
        }

        let frame = frame.select(RECORD_COLUMNS)?;
        Ok(Self { frame })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materialize the rows as records
    pub fn records(&self) -> Result<Vec<Record>> {
        let names = self.frame.column(NAME_COLUMN)?.as_materialized_series().str()?;
        let heights = self.frame.column(HEIGHT_COLUMN)?.as_materialized_series().f64()?;
        let weights = self.frame.column(WEIGHT_COLUMN)?.as_materialized_series().f64()?;

        names
            .into_iter()
            .zip(heights)
            .zip(weights)
            .enumerate()
            .map(|(row, ((name, height), weight))| {
                let null = |column: &str| EtlError::NullValue {
                    column: column.to_string(),
                    row,
                };
                Ok(Record {
                    name: name.ok_or_else(|| null(NAME_COLUMN))?.to_string(),
                    height: height.ok_or_else(|| null(HEIGHT_COLUMN))?,
                    weight: weight.ok_or_else(|| null(WEIGHT_COLUMN))?,
                })
            })
            .collect()
    }
}

/// Sequential phases of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Extract,
    Transform,
    Load,
    Query,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Extract => "Extract",
            Phase::Transform => "Transform",
            Phase::Load => "Load",
            Phase::Query => "Query",
        })
    }
}

/// Processing statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub files_processed: usize,
    pub rows_by_format: BTreeMap<SourceFormat, usize>,
    pub rows_extracted: usize,
    pub rows_written: usize,
    pub rows_loaded: u64,
    pub rows_queried: usize,
    pub output_path: PathBuf,
    pub processing_time_ms: u128,
}

impl ProcessingStats {
    /// Record one parsed source file
    pub fn record_file(&mut self, format: SourceFormat, rows: usize) {
        self.files_processed += 1;
        *self.rows_by_format.entry(format).or_insert(0) += rows;
    }

    /// Rows parsed from files of one format
    pub fn rows_for(&self, format: SourceFormat) -> usize {
        self.rows_by_format.get(&format).copied().unwrap_or(0)
    }
}
