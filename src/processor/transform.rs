//! Unit conversion for the aggregated table
//!
//! Heights go from inches to metres and weights from pounds to kilograms,
//! both rounded to two decimal places. The conversion applies uniformly to
//! every row.

use crate::constants::{
    CONVERSION_DECIMALS, HEIGHT_COLUMN, INCHES_TO_METRES, POUNDS_TO_KILOGRAMS, WEIGHT_COLUMN,
};
use crate::error::Result;
use crate::models::Table;

use polars::prelude::*;
use tracing::debug;

/// Round to a fixed number of decimal places, halves to even
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

/// Convert inches to metres
pub fn inches_to_metres(inches: f64) -> f64 {
    round_to(inches * INCHES_TO_METRES, CONVERSION_DECIMALS)
}

/// Convert pounds to kilograms
pub fn pounds_to_kilograms(pounds: f64) -> f64 {
    round_to(pounds * POUNDS_TO_KILOGRAMS, CONVERSION_DECIMALS)
}

/// Apply both conversions to a table
pub fn transform(table: Table) -> Result<Table> {
    let mut frame = table.into_frame();

    let heights = convert_column(&frame, HEIGHT_COLUMN, inches_to_metres)?;
    let weights = convert_column(&frame, WEIGHT_COLUMN, pounds_to_kilograms)?;

    frame.with_column(heights)?;
    frame.with_column(weights)?;

    debug!("Converted units for {} rows", frame.height());
    Table::from_frame(frame)
}

fn convert_column(frame: &DataFrame, column: &str, convert: fn(f64) -> f64) -> Result<Series> {
    let values = frame.column(column)?.as_materialized_series().f64()?;

    let converted: Float64Chunked = values
        .into_iter()
        .map(|value| value.map(convert))
        .collect();

    Ok(converted.with_name(column.into()).into_series())
}
