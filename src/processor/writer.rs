//! Flat-file sink
//!
//! Writes the transformed table as comma-separated text. The file is
//! overwritten on every run and starts with a zero-based row-index column
//! whose header is empty.

use crate::constants::INDEX_COLUMN;
use crate::error::Result;
use crate::models::Table;

use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// CSV writer for the final table
#[derive(Debug)]
pub struct CsvSink {
    output_path: PathBuf,
}

impl CsvSink {
    /// Create a new CSV sink
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Write the table, replacing any existing file. Returns the rows written.
    pub fn write(&self, table: &Table) -> Result<usize> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut frame = table.frame().with_row_index(INDEX_COLUMN.into(), None)?;

        let mut file = File::create(&self.output_path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut frame)?;

        debug!(
            "Wrote {} rows to {}",
            frame.height(),
            self.output_path.display()
        );
        Ok(frame.height())
    }
}
