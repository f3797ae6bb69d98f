use crate::benchmark::DEFAULT_PRECISION;
use crate::core::db::{ConnectParams, SqliteDriver};
use crate::core::{PrefSqlError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub sqlite: SqliteConfig,
    #[serde(default)]
    pub benchmark: BenchmarkConfig,
}

/// Connection target and error display policy.
#[derive(Debug, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
    pub database: String,
    #[serde(default)]
    pub show_errors: bool,
}

/// SQLite driver options.
#[derive(Debug, Deserialize)]
pub struct SqliteConfig {
    #[serde(default = "default_true")]
    pub create_if_missing: bool,
    pub busy_timeout_ms: Option<u64>,
    #[serde(default = "default_true")]
    pub foreign_keys: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        SqliteConfig {
            create_if_missing: true,
            busy_timeout_ms: None,
            foreign_keys: true,
        }
    }
}

/// Benchmark reporting options.
#[derive(Debug, Deserialize)]
pub struct BenchmarkConfig {
    #[serde(default = "default_precision")]
    pub precision: u32,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            precision: DEFAULT_PRECISION,
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_true() -> bool {
    true
}

fn default_precision() -> u32 {
    DEFAULT_PRECISION
}

impl FromStr for Config {
    type Err = PrefSqlError;

    fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| PrefSqlError::Config(e.to_string()))
    }
}

impl Config {
    pub fn connect_params(&self) -> ConnectParams {
        ConnectParams::new(
            self.connection.host.as_str(),
            self.connection.login.as_str(),
            self.connection.password.as_str(),
            self.connection.database.as_str(),
        )
    }

    pub fn sqlite_driver(&self) -> SqliteDriver {
        let mut driver = SqliteDriver::new()
            .create_if_missing(self.sqlite.create_if_missing)
            .foreign_keys(self.sqlite.foreign_keys);
        if let Some(ms) = self.sqlite.busy_timeout_ms {
            driver = driver.busy_timeout(Duration::from_millis(ms));
        }
        driver
    }
}

/// Loads configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// let config = prefsql::config::load_config("prefsql.toml").expect("Failed to load config");
/// println!("{:?}", config);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    content.parse()
}

/// `<config dir>/prefsql/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("prefsql").join("config.toml"))
}
