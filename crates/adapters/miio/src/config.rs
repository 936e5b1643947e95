//! Monitor connection settings.

use airmon_domain::error::ValidationError;
use airmon_domain::model::Model;
use serde::Deserialize;

pub const DEFAULT_NAME: &str = "Xiaomi Mi/QingPing Air Quality Monitor";

/// Connection settings of one monitor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MiioConfig {
    /// IP address or host name of the monitor.
    pub host: String,
    /// 32-character hexadecimal device token.
    pub token: String,
    /// Vendor model identifier. Detected with `miIO.info` when absent.
    pub model: Option<String>,
    /// Display name of the device, prefix of every entity name.
    pub name: String,
    /// MAC address, used for the device unique id when the model is given.
    pub mac: Option<String>,
}

impl Default for MiioConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            token: String::new(),
            model: None,
            name: DEFAULT_NAME.to_string(),
            mac: None,
        }
    }
}

impl MiioConfig {
    /// Check the settings and parse the configured model, if any.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<Option<Model>, ValidationError> {
        if self.host.trim().is_empty() {
            return Err(ValidationError::EmptyHost);
        }
        if self.token.len() != 32 || !self.token.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidToken);
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        self.model.as_deref().map(str::parse).transpose()
    }
}
