//! Format readers and aggregation
//!
//! Each reader parses one source file into a [`Table`] with the canonical
//! `name`/`height`/`weight` columns. CSV and JSON-lines go through polars and
//! are then normalized (column projection, strict casts, null rejection); XML
//! is deserialized record by record. [`aggregate`] merges the per-file tables
//! in a single concatenation.

use crate::constants::{HEIGHT_COLUMN, NAME_COLUMN, WEIGHT_COLUMN};
use crate::error::{EtlError, Result};
use crate::models::{Record, SourceFile, SourceFormat, Table};

use polars::prelude::*;
use serde::Deserialize;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Read one discovered source file
pub fn read_source(file: &SourceFile) -> Result<Table> {
    let table = match file.format {
        SourceFormat::Csv => read_csv(&file.path)?,
        SourceFormat::Json => read_json(&file.path)?,
        SourceFormat::Xml => read_xml(&file.path)?,
    };

    debug!(
        "Read {} rows from {} file {}",
        table.len(),
        file.format,
        file.path.display()
    );
    Ok(table)
}

/// Read a header-plus-rows CSV file
pub fn read_csv(path: &Path) -> Result<Table> {
    // Every column as text; normalize_frame applies the record types
    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| EtlError::parse(path, e.to_string()))?;

    normalize_frame(frame, path)
}

/// Read a file holding one JSON object per line
pub fn read_json(path: &Path) -> Result<Table> {
    let content = fs::read(path)?;

    // No lines, no records
    if content.iter().all(u8::is_ascii_whitespace) {
        return Ok(Table::empty());
    }

    // Types come from every line, so a late decimal widens the column
    let frame = JsonReader::new(Cursor::new(content))
        .with_json_format(JsonFormat::JsonLines)
        .infer_schema_len(None)
        .finish()
        .map_err(|e| EtlError::parse(path, e.to_string()))?;

    normalize_frame(frame, path)
}

/// XML document root: zero or more `<person>` children
#[derive(Debug, Deserialize)]
struct PersonDocument {
    #[serde(rename = "person", default)]
    people: Vec<Record>,
}

/// Read an XML document of `<person>` elements.
///
/// Each element must carry `name`, `height` and `weight` children; a missing
/// child or a non-numeric height/weight fails the whole file.
pub fn read_xml(path: &Path) -> Result<Table> {
    let content = fs::read_to_string(path)?;

    let document: PersonDocument =
        quick_xml::de::from_str(&content).map_err(|e| EtlError::parse(path, e.to_string()))?;

    Table::from_records(&document.people)
}

/// Project a parsed frame onto the canonical columns with strict types
fn normalize_frame(frame: DataFrame, path: &Path) -> Result<Table> {
    let mut columns = Vec::with_capacity(3);

    for (column, dtype) in [
        (NAME_COLUMN, DataType::String),
        (HEIGHT_COLUMN, DataType::Float64),
        (WEIGHT_COLUMN, DataType::Float64),
    ] {
        let source = frame
            .column(column)
            .map_err(|_| EtlError::SchemaMismatch {
                path: path.to_path_buf(),
                missing: column.to_string(),
            })?;

        let cast = source
            .as_materialized_series()
            .strict_cast(&dtype)
            .map_err(|e| EtlError::parse(path, format!("column '{}': {}", column, e)))?;

        let nulls = cast.null_count();
        if nulls > 0 {
            return Err(EtlError::parse(
                path,
                format!("column '{}' has {} missing values", column, nulls),
            ));
        }

        columns.push(cast.into_column());
    }

    Table::from_frame(DataFrame::new(columns)?)
}

/// Concatenate per-file tables in the given order
pub fn aggregate(tables: Vec<Table>) -> Result<Table> {
    if tables.is_empty() {
        return Ok(Table::empty());
    }

    let expected_rows: usize = tables.iter().map(Table::len).sum();
    let frames: Vec<LazyFrame> = tables
        .into_iter()
        .map(|table| table.into_frame().lazy())
        .collect();

    let combined = concat(
        frames,
        UnionArgs {
            parallel: false,
            ..Default::default()
        },
    )?
    .collect()?;

    debug!(
        "Aggregated {} rows (expected {})",
        combined.height(),
        expected_rows
    );

    Table::from_frame(combined)
}
