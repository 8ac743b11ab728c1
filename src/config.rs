//! Layered configuration.
//!
//! Sources, highest priority first:
//! 1. Command line overrides (`--base-url`, `--log-level`)
//! 2. Environment variables (`TASKDESK_*`, `__` separates sections)
//! 3. `./taskdesk.toml`
//! 4. `<config dir>/taskdesk/config.toml`
//! 5. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_PREFIX: &str = "TASKDESK_";
const LOCAL_CONFIG: &str = "taskdesk.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Figment(Box::new(err))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// chrono format string for task dates.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_date_format() -> String {
    "%-m/%-d/%Y".to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file used while the TUI owns the terminal.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl LogConfig {
    pub fn file_path(&self) -> PathBuf {
        self.file.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("taskdesk")
                .join("taskdesk.log")
        })
    }
}

/// Values given on the command line; `None` leaves the layered value alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub log_level: Option<String>,
}

/// Reads `.env` into the process environment. A missing file is not an
/// error; an unreadable or malformed one is returned so the caller can report
/// it once logging is up.
pub fn load_dotenv() -> Result<(), dotenvy::Error> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e),
    }
}

impl Config {
    /// Extracts from all layers. Call [`load_dotenv`] first so `.env` values
    /// reach the env layer.
    pub fn load(overrides: &Overrides) -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment(), overrides)
    }

    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if let Some(global) = Self::global_config_path() {
            if global.exists() {
                figment = figment.merge(Toml::file(global));
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG);
        if local.exists() {
            figment = figment.merge(Toml::file(local));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: Figment, overrides: &Overrides) -> Result<Self, ConfigError> {
        let mut figment = figment;
        if let Some(url) = &overrides.base_url {
            figment = figment.merge(Serialized::default("api.base_url", url));
        }
        if let Some(level) = &overrides.log_level {
            figment = figment.merge(Serialized::default("log.level", level));
        }

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "api.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("taskdesk").join("config.toml"))
    }
}
