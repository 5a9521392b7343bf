use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use pool::{DEFAULT_CONNECTION_LIMIT, DEFAULT_PROBE_INTERVAL};

use crate::error::{FacadeError, Result};

/// Tunables for the facade, with the documented defaults baked in:
/// connection limit 30, probe interval 30 seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct FacadeSettings {
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,

    #[serde(default = "default_connection_limit")]
    pub connection_limit: u32,

    #[serde(default)]
    pub mysql_url: Option<String>,

    #[serde(default)]
    pub mongodb_url: Option<String>,

    #[serde(default)]
    pub postgres_url: Option<String>,
}

fn default_probe_interval_secs() -> u64 {
    DEFAULT_PROBE_INTERVAL.as_secs()
}

fn default_connection_limit() -> u32 {
    DEFAULT_CONNECTION_LIMIT
}

impl Default for FacadeSettings {
    fn default() -> Self {
        Self {
            probe_interval_secs: default_probe_interval_secs(),
            connection_limit: default_connection_limit(),
            mysql_url: None,
            mongodb_url: None,
            postgres_url: None,
        }
    }
}

impl FacadeSettings {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FacadeError::Config(format!("Failed to read settings file: {}", e)))?;

        let settings = toml::from_str(&content)
            .map_err(|e| FacadeError::Config(format!("Failed to parse settings file: {}", e)))?;

        Ok(settings)
    }

    /// Defaults overlaid with environment variables; loads a `.env` file
    /// first when one is present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut settings = Self::default();
        settings.apply_env();
        settings
    }

    pub fn apply_env(&mut self) {
        if let Some(value) = env_parse("POOL_PROBE_INTERVAL_SECS") {
            self.probe_interval_secs = value;
        }
        if let Some(value) = env_parse("POOL_CONNECTION_LIMIT") {
            self.connection_limit = value;
        }
        if let Ok(value) = std::env::var("MYSQL_URL") {
            self.mysql_url = Some(value);
        }
        if let Ok(value) = std::env::var("MONGODB_URL") {
            self.mongodb_url = Some(value);
        }
        if let Ok(value) = std::env::var("POSTGRES_URL") {
            self.postgres_url = Some(value);
        }
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|value| value.parse().ok())
}
