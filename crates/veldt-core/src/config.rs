//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `veldt-config.yaml` at the
//! project root. Every field has a default matching the contract
//! constants, so an absent file yields a fully working server.

use std::path::Path;

use serde::Deserialize;

use veldt_world::constants::TICK_INTERVAL_MS;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (name, seed, timing).
    #[serde(default)]
    pub world: WorldConfig,

    /// Infrastructure connection settings.
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for infrastructure:
    /// `DATABASE_URL` overrides `infrastructure.database_url`, and
    /// `VELDT_PORT` overrides `infrastructure.gateway_port`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.infrastructure.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.infrastructure.apply_env_overrides();
        Ok(config)
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable world name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility. Absent means draw one from
    /// entropy at startup.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Real-time milliseconds per tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: None,
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Infrastructure connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InfrastructureConfig {
    /// `SQLite` database URL.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// TCP port the `WebSocket` gateway binds.
    #[serde(default = "default_gateway_port")]
    pub gateway_port: u16,
}

impl InfrastructureConfig {
    /// Apply environment overrides to the loaded values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL")
            && !url.is_empty()
        {
            self.database_url = url;
        }
        if let Ok(port) = std::env::var("VELDT_PORT")
            && let Ok(parsed) = port.parse::<u16>()
        {
            self.gateway_port = parsed;
        }
    }
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            gateway_port: default_gateway_port(),
        }
    }
}

fn default_world_name() -> String {
    "veldt".to_owned()
}

const fn default_tick_interval_ms() -> u64 {
    TICK_INTERVAL_MS
}

fn default_database_url() -> String {
    "sqlite:veldt.db?mode=rwc".to_owned()
}

const fn default_gateway_port() -> u16 {
    8765
}
