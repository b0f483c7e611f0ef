//! Configuration management and validation.
//!
//! One explicit configuration object is built at startup and passed to each
//! component. Values are layered: built-in defaults, then the local INI file
//! (which carries the database password under `[secret]`), then CLI overrides.

use crate::constants::{
    DEFAULT_DB_HOST, DEFAULT_DB_NAME, DEFAULT_DB_PORT, DEFAULT_DB_USER,
    DEFAULT_INSERT_BATCH_SIZE, DEFAULT_LOG_PATH, DEFAULT_OUTPUT_PATH, DEFAULT_SOURCE_DIR,
    DEFAULT_TABLE_NAME, MAX_INSERT_BATCH_SIZE,
};
use crate::error::{EtlError, Result};
use config::{Config as ConfigLoader, File, FileFormat};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::debug;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier pattern"));

/// Database connection settings
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub name: String,

    /// Read from `[secret] PASSWORD`
    pub password: Option<String>,

    /// Full connection string; takes precedence over the individual fields
    pub dsn: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            user: DEFAULT_DB_USER.to_string(),
            name: DEFAULT_DB_NAME.to_string(),
            password: None,
            dsn: None,
        }
    }
}

// Keeps the password out of logs.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("name", &self.name)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("dsn", &self.dsn.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl DatabaseConfig {
    /// Build connection options from the DSN or the individual fields
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        if let Some(dsn) = &self.dsn {
            return Ok(PgConnectOptions::from_str(dsn)?);
        }

        let password = self.password.as_deref().ok_or_else(|| {
            EtlError::configuration("database password missing: set PASSWORD under [secret]")
        })?;

        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(password)
            .database(&self.name))
    }
}

/// Global configuration for an ETL run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlConfig {
    /// Directory scanned for `*.csv`, `*.json` and `*.xml`
    pub source_dir: PathBuf,

    /// Flat-file sink target, overwritten each run
    pub output_path: PathBuf,

    /// Append-only progress log
    pub log_path: PathBuf,

    /// Table replaced by the database sink and read back by the query
    pub table_name: String,

    /// Rows per multi-row INSERT
    pub insert_batch_size: usize,

    pub database: DatabaseConfig,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            insert_batch_size: DEFAULT_INSERT_BATCH_SIZE,
            database: DatabaseConfig::default(),
        }
    }
}

/// Layout of the local INI file. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IniSettings {
    secret: SecretSection,
    database: DatabaseSection,
    paths: PathsSection,
    load: LoadSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SecretSection {
    #[serde(alias = "PASSWORD")]
    password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DatabaseSection {
    #[serde(alias = "HOST")]
    host: Option<String>,
    #[serde(alias = "PORT")]
    port: Option<u16>,
    #[serde(alias = "USER")]
    user: Option<String>,
    #[serde(alias = "NAME")]
    name: Option<String>,
    #[serde(alias = "DSN")]
    dsn: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PathsSection {
    source_dir: Option<PathBuf>,
    output_path: Option<PathBuf>,
    log_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoadSection {
    table_name: Option<String>,
    insert_batch_size: Option<usize>,
}

impl EtlConfig {
    /// Load defaults overlaid with the INI file at `config_file`, if present
    pub fn load_layered(config_file: &Path) -> Result<Self> {
        let mut config = Self::default();

        if !config_file.exists() {
            debug!(
                "No config file at {}, using defaults",
                config_file.display()
            );
            return Ok(config);
        }

        let settings: IniSettings = ConfigLoader::builder()
            .add_source(File::from(config_file).format(FileFormat::Ini))
            .build()?
            .try_deserialize()?;

        debug!("Loaded config file: {}", config_file.display());
        config.apply_ini(settings);
        Ok(config)
    }

    fn apply_ini(&mut self, settings: IniSettings) {
        let IniSettings {
            secret,
            database,
            paths,
            load,
        } = settings;

        if let Some(password) = secret.password {
            self.database.password = Some(password);
        }
        if let Some(host) = database.host {
            self.database.host = host;
        }
        if let Some(port) = database.port {
            self.database.port = port;
        }
        if let Some(user) = database.user {
            self.database.user = user;
        }
        if let Some(name) = database.name {
            self.database.name = name;
        }
        if let Some(dsn) = database.dsn {
            self.database.dsn = Some(dsn);
        }
        if let Some(source_dir) = paths.source_dir {
            self.source_dir = source_dir;
        }
        if let Some(output_path) = paths.output_path {
            self.output_path = output_path;
        }
        if let Some(log_path) = paths.log_path {
            self.log_path = log_path;
        }
        if let Some(table_name) = load.table_name {
            self.table_name = table_name;
        }
        if let Some(batch_size) = load.insert_batch_size {
            self.insert_batch_size = batch_size;
        }
    }

    /// Check values the components rely on
    pub fn validate(&self) -> Result<()> {
        if self.source_dir.as_os_str().is_empty() {
            return Err(EtlError::configuration("source_dir must not be empty"));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(EtlError::configuration("output_path must not be empty"));
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(EtlError::configuration("log_path must not be empty"));
        }
        if !IDENTIFIER.is_match(&self.table_name) {
            return Err(EtlError::configuration(format!(
                "table_name '{}' is not a plain SQL identifier",
                self.table_name
            )));
        }
        if self.insert_batch_size == 0 || self.insert_batch_size > MAX_INSERT_BATCH_SIZE {
            return Err(EtlError::configuration(format!(
                "insert_batch_size must be between 1 and {}",
                MAX_INSERT_BATCH_SIZE
            )));
        }
        Ok(())
    }

    /// Builder pattern methods
    pub fn with_source_dir(mut self, source_dir: impl Into<PathBuf>) -> Self {
        self.source_dir = source_dir.into();
        self
    }

    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }

    pub fn with_log_path(mut self, log_path: impl Into<PathBuf>) -> Self {
        self.log_path = log_path.into();
        self
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn with_insert_batch_size(mut self, batch_size: usize) -> Self {
        self.insert_batch_size = batch_size;
        self
    }

    pub fn with_dsn(mut self, dsn: impl Into<String>) -> Self {
        self.database.dsn = Some(dsn.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = EtlConfig::default();

        assert_eq!(config.source_dir, PathBuf::from("source"));
        assert_eq!(config.output_path, PathBuf::from("transformed_data.csv"));
        assert_eq!(config.log_path, PathBuf::from("log_file.txt"));
        assert_eq!(config.table_name, "data");
        assert_eq!(config.database.host, "127.0.0.1");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.user, "postgres");
        assert_eq!(config.database.name, "etl_project");
        assert!(config.database.password.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = EtlConfig::load_layered(&temp_dir.path().join("config.ini")).unwrap();

        assert_eq!(config.table_name, "data");
        assert!(config.database.password.is_none());
    }

    #[test]
    fn test_load_password_from_secret_section() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");
        fs::write(&path, "[secret]\nPASSWORD=hunter2\n").unwrap();

        let config = EtlConfig::load_layered(&path).unwrap();

        assert_eq!(config.database.password.as_deref(), Some("hunter2"));
        assert_eq!(config.database.host, "127.0.0.1");
    }

    #[test]
    fn test_load_optional_sections() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");
        fs::write(
            &path,
            "[secret]\nPASSWORD=pw\n\n[database]\nhost=db.internal\nport=6543\n\n[paths]\nsource_dir=/data/in\n\n[load]\ntable_name=people\ninsert_batch_size=250\n",
        )
        .unwrap();

        let config = EtlConfig::load_layered(&path).unwrap();

        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.source_dir, PathBuf::from("/data/in"));
        assert_eq!(config.table_name, "people");
        assert_eq!(config.insert_batch_size, 250);
        assert_eq!(config.output_path, PathBuf::from("transformed_data.csv"));
    }

    #[test]
    fn test_validate_rejects_bad_table_name() {
        let config = EtlConfig::default().with_table_name("data; DROP TABLE users");
        assert!(config.validate().is_err());

        let config = EtlConfig::default().with_table_name("1data");
        assert!(config.validate().is_err());

        let config = EtlConfig::default().with_table_name("person_data_2");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_batch_size() {
        assert!(EtlConfig::default().with_insert_batch_size(0).validate().is_err());
        assert!(
            EtlConfig::default()
                .with_insert_batch_size(MAX_INSERT_BATCH_SIZE + 1)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_connect_options_require_password() {
        let config = EtlConfig::default();
        match config.database.connect_options() {
            Err(EtlError::Configuration { message }) => assert!(message.contains("PASSWORD")),
            other => panic!("Expected configuration error, got {:?}", other.map(|_| ())),
        }

        let config = EtlConfig::default().with_dsn("postgres://postgres:pw@localhost:5432/etl_project");
        assert!(config.database.connect_options().is_ok());
    }

    #[test]
    fn test_debug_redacts_password() {
        let mut config = EtlConfig::default();
        config.database.password = Some("hunter2".to_string());

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
