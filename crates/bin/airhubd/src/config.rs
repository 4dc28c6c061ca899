//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `airhub.toml` in the working directory. Every field but the
//! device list has a sensible default so the file is optional. Environment
//! variables take precedence over file values.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use serde::Deserialize;

use airhub_app::ports::Endpoint;
use airhub_domain::id::EntityId;
use airhub_app::services::fan_service::DeviceSettings;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Status polling settings.
    pub polling: PollingConfig,
    /// Managed devices.
    pub devices: Vec<DeviceConfig>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Periodic status refresh.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between two polls of every device.
    pub interval_secs: u64,
}

/// One `[[devices]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    /// Network address of the device.
    pub host: String,
    /// 32-character hexadecimal device token.
    pub token: String,
    /// Display name, also the source of the entity id.
    pub name: String,
    /// Model string; detected from the device when absent.
    #[serde(default)]
    pub model: Option<String>,
    /// Misbehaviour of the simulated device at this host.
    #[serde(default)]
    pub simulate_faults: Option<SimulatedFaults>,
}

/// Fault injected into a simulated device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulatedFaults {
    /// Never answers.
    Offline,
    /// Answers every command with an error reply.
    Rejecting,
}

impl DeviceConfig {
    /// Setup parameters for this device.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for an empty host or a
    /// malformed token.
    pub fn settings(&self) -> Result<DeviceSettings, ConfigError> {
        let endpoint = Endpoint::new(&self.host, &self.token).map_err(|err| {
            ConfigError::Validation(format!("device {:?}: {err}", self.name))
        })?;
        Ok(DeviceSettings {
            name: self.name.clone(),
            endpoint,
            model: self.model.clone(),
        })
    }
}

impl Config {
    /// Load configuration from `airhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("airhub.toml")?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("AIRHUB_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("AIRHUB_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("AIRHUB_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("AIRHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(secs) = var("AIRHUB_POLL_INTERVAL_SECS").and_then(|val| val.parse().ok()) {
            self.polling.interval_secs = secs;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.polling.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "poll interval must be non-zero".to_string(),
            ));
        }
        let mut hosts = HashSet::new();
        let mut entity_ids: HashMap<EntityId, &str> = HashMap::new();
        for device in &self.devices {
            device.settings()?;
            if !hosts.insert(device.host.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "host {} is configured more than once",
                    device.host
                )));
            }
            let entity_id = EntityId::from_name(&device.name).map_err(|err| {
                ConfigError::Validation(format!("device at {}: {err}", device.host))
            })?;
            if let Some(other) = entity_ids.insert(entity_id.clone(), &device.name) {
                return Err(ConfigError::Validation(format!(
                    "names {other:?} and {:?} both map to {entity_id}",
                    device.name
                )));
            }
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.polling.interval_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "airhubd=info,airhub_app=info,airhub_adapter_virtual=info,tower_http=debug"
                .to_string(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
