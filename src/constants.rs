//! Application constants for the ETL job
//!
//! Conversion factors, canonical column names, default paths and the
//! database connection defaults used when no configuration overrides them.

// =============================================================================
// Schema
// =============================================================================

/// Column holding the person's name
pub const NAME_COLUMN: &str = "name";

/// Column holding the height (inches on read, metres after transform)
pub const HEIGHT_COLUMN: &str = "height";

/// Column holding the weight (pounds on read, kilograms after transform)
pub const WEIGHT_COLUMN: &str = "weight";

/// Canonical column order of every table
pub const RECORD_COLUMNS: [&str; 3] = [NAME_COLUMN, HEIGHT_COLUMN, WEIGHT_COLUMN];

// =============================================================================
// Unit Conversion
// =============================================================================

/// 1 inch is 0.0254 metres
pub const INCHES_TO_METRES: f64 = 0.0254;

/// 1 pound is 0.45359237 kilograms
pub const POUNDS_TO_KILOGRAMS: f64 = 0.45359237;

/// Decimal places kept after conversion
pub const CONVERSION_DECIMALS: i32 = 2;

// =============================================================================
// Default Paths
// =============================================================================

pub const DEFAULT_SOURCE_DIR: &str = "source";
pub const DEFAULT_OUTPUT_PATH: &str = "transformed_data.csv";
pub const DEFAULT_LOG_PATH: &str = "log_file.txt";
pub const DEFAULT_CONFIG_PATH: &str = "config.ini";

/// Header of the row-index column in the flat-file output
pub const INDEX_COLUMN: &str = "";

// =============================================================================
// Database Defaults
// =============================================================================

pub const DEFAULT_DB_HOST: &str = "127.0.0.1";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_USER: &str = "postgres";
pub const DEFAULT_DB_NAME: &str = "etl_project";
pub const DEFAULT_TABLE_NAME: &str = "data";

/// Rows bound per multi-row INSERT statement. Postgres caps a statement at
/// 65535 bind parameters; three per row keeps this well below it.
pub const DEFAULT_INSERT_BATCH_SIZE: usize = 1000;
pub const MAX_INSERT_BATCH_SIZE: usize = 65535 / RECORD_COLUMNS.len();

// =============================================================================
// Progress Log
// =============================================================================

/// Year-Monthname-Day-Hour:Minute:Second
pub const PROGRESS_TIMESTAMP_FORMAT: &str = "%Y-%b-%d-%H:%M:%S";
