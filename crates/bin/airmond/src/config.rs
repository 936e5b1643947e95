//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `airmon.toml` in the working directory (or the path in
//! `AIRMON_CONFIG`). Every field has a default so the file is optional,
//! unknown keys are rejected. Environment variables take precedence over
//! file values.

use std::time::Duration;

use airmon_adapter_miio::MiioConfig;
use airmon_app::poller::PollIntervals;
use airmon_domain::model::Model;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    /// The monitor to integrate.
    pub device: DeviceConfig,
    pub polling: PollingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// The monitor and how requests reach it.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    pub host: String,
    /// 32 hexadecimal characters.
    pub token: String,
    /// Skips model detection when set.
    pub model: Option<String>,
    pub name: String,
    pub mac: Option<String>,
    pub transport: TransportKind,
}

/// Where device requests go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// An in-process monitor answering both request dialects.
    #[default]
    Simulated,
}

/// Poll cadence in seconds.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollingConfig {
    pub air_quality_interval_secs: u64,
    pub entity_interval_secs: u64,
}

impl DeviceConfig {
    /// Settings handed to the monitor integration.
    #[must_use]
    pub fn miio_config(&self) -> MiioConfig {
        MiioConfig {
            host: self.host.clone(),
            token: self.token.clone(),
            model: self.model.clone(),
            name: self.name.clone(),
            mac: self.mac.clone(),
        }
    }
}

impl Config {
    /// Load configuration from the config file (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("AIRMON_CONFIG").unwrap_or_else(|_| "airmon.toml".to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
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

    /// Apply `AIRMON_*` and `RUST_LOG` overrides read through `var`.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("AIRMON_HOST") {
            self.server.host = val;
        }
        if let Some(val) = var("AIRMON_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Some(val) = var("AIRMON_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("AIRMON_DEVICE_HOST") {
            self.device.host = val;
        }
        if let Some(val) = var("AIRMON_DEVICE_TOKEN") {
            self.device.token = val;
        }
        if let Some(val) = var("AIRMON_DEVICE_MODEL") {
            self.device.model = Some(val);
        }
        if let Some(val) = var("AIRMON_DEVICE_NAME") {
            self.device.name = val;
        }
        if let Some(val) = var("AIRMON_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.polling.air_quality_interval_secs == 0 || self.polling.entity_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "poll intervals must be non-zero".to_string(),
            ));
        }
        self.device
            .miio_config()
            .validate()
            .map_err(|err| ConfigError::Validation(format!("device: {err}")))?;
        self.simulated_model()?;
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Model the simulated monitor reports: the configured device model,
    /// or the Lite when none is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for an unsupported model.
    pub fn simulated_model(&self) -> Result<Model, ConfigError> {
        self.device.model.as_deref().map_or(Ok(Model::AirMonitorLite), |model| {
            model
                .parse()
                .map_err(|err| ConfigError::Validation(format!("device: {err}")))
        })
    }

    #[must_use]
    pub fn poll_intervals(&self) -> PollIntervals {
        PollIntervals {
            air_quality: Duration::from_secs(self.polling.air_quality_interval_secs),
            entity: Duration::from_secs(self.polling.entity_interval_secs),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        let miio = MiioConfig::default();
        Self {
            host: "127.0.0.1".to_string(),
            token: "0".repeat(32),
            model: None,
            name: miio.name,
            mac: None,
            transport: TransportKind::default(),
        }
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
            filter: "airmond=info,airmon=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        let intervals = PollIntervals::default();
        Self {
            air_quality_interval_secs: intervals.air_quality.as_secs(),
            entity_interval_secs: intervals.entity.as_secs(),
        }
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
