//! Configuration file
//!
//! ```json
//! {
//!   "db_name": "default",
//!   "data_dir": ".",
//!   "extension": "pallas",
//!   "log_level": "info",
//!   "http": { "port": 5100, "request_timeout_ms": 30000 }
//! }
//! ```
//!
//! Every field is optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::observability::Severity;
use crate::rest_api::HttpConfig;
use crate::store::{StoreOptions, DEFAULT_DB_NAME, DEFAULT_EXTENSION};

use super::errors::{CliError, CliResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Database name; the file is `<data_dir>/<db_name>.<extension>`
    #[serde(default = "default_db_name")]
    pub db_name: String,

    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_extension")]
    pub extension: String,

    /// trace, info, warn, error or fatal
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub http: HttpConfig,
}

fn default_db_name() -> String {
    DEFAULT_DB_NAME.to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_name: default_db_name(),
            data_dir: default_data_dir(),
            extension: default_extension(),
            log_level: default_log_level(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> CliResult<()> {
        self.store_options()
            .validate()
            .map_err(|e| CliError::config_error(e.message().to_string()))?;

        self.severity()?;

        if self.http.request_timeout_ms == 0 {
            return Err(CliError::config_error("http.request_timeout_ms must be > 0"));
        }

        let operator = &self.http.equality_operator;
        if operator.is_empty() || operator.contains('.') {
            return Err(CliError::config_error(format!(
                "Invalid http.equality_operator: '{}'",
                operator
            )));
        }

        Ok(())
    }

    /// Minimum log severity
    pub fn severity(&self) -> CliResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            CliError::config_error(format!("Invalid log_level: '{}'", self.log_level))
        })
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions::new()
            .with_db_name(self.db_name.clone())
            .with_extension(self.extension.clone())
            .with_data_dir(self.data_dir.clone())
    }
}
