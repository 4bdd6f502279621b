//! Runtime configuration.
//!
//! Sources, later overriding earlier:
//! 1. Built-in defaults
//! 2. A TOML document (optional, see [`SyncConfig::from_toml`])
//! 3. Environment variables prefixed with [`ENV_PREFIX`], e.g.
//!    `CANTEEN_SYNC_STORE_TIMEOUT_MS=1500`

use std::time::Duration;

use ::config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "CANTEEN_SYNC";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Upper bound for every single store call.
    pub store_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub actor_buffer_size: usize,
    /// Minutes added to a queue wait estimate per entry ahead.
    pub wait_minutes_per_order: u32,
    pub order_service_url: String,
    pub queue_service_url: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            store_timeout_ms: 3_000,
            poll_interval_ms: 10_000,
            actor_buffer_size: 32,
            wait_minutes_per_order: 5,
            order_service_url: "http://localhost:8000".to_string(),
            queue_service_url: "http://localhost:8080".to_string(),
        }
    }
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    pub fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix(prefix).try_parsing(true))
            .build()?;
        Self::finish(config)
    }

    /// Parses a TOML document; environment variables still take precedence.
    pub fn from_toml(document: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(document, FileFormat::Toml))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        Self::finish(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_timeout_ms == 0 {
            return Err(ConfigError::Invalid("store_timeout_ms must be positive".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be positive".into()));
        }
        if self.actor_buffer_size == 0 {
            return Err(ConfigError::Invalid("actor_buffer_size must be positive".into()));
        }
        Ok(())
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    fn finish(config: Config) -> Result<Self, ConfigError> {
        let parsed: SyncConfig = config.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }
}
