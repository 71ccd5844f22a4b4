//! Application settings, read from an optional `settings.toml` and
//! `PAYCODE__*` environment variables (e.g. `PAYCODE__APP__LEVEL=debug`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Self::Sqlite("paycode.db".to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
    /// Key the session snapshot is saved under.
    pub key: String,
    /// Simulated network latency in milliseconds.
    pub latency_ms: u64,
    /// IANA timezone used to date transactions.
    pub timezone: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            key: engine::DEFAULT_KEY.to_string(),
            latency_ms: engine::DEFAULT_LATENCY.as_millis() as u64,
            timezone: "UTC".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Storage {
    pub database: Database,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub storage: Storage,
}

impl Settings {
    pub fn new(path: Option<&str>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path.unwrap_or(DEFAULT_CONFIG_PATH)).required(false))
            .add_source(Environment::with_prefix("PAYCODE").separator("__"))
            .build()?
            .try_deserialize()
    }
}
