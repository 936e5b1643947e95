//! Device: the physical monitor that exposes the entities.

use serde::{Deserialize, Serialize};

use crate::error::{AirmonError, ValidationError};
use crate::id::DeviceId;

/// Host-facing device metadata (the `device_info` block).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    /// Display name chosen by the user.
    pub name: String,
    pub manufacturer: Option<String>,
    /// Vendor model identifier (e.g. `cgllc.airm.cgdn1`).
    pub model: Option<String>,
    /// Which integration registered the device.
    pub integration: String,
    /// Stable identifier within the integration.
    pub unique_id: String,
    /// Firmware version.
    pub sw_version: Option<String>,
    /// Hardware revision.
    pub hw_version: Option<String>,
    /// Network identity (MAC address), when known.
    pub mac: Option<String>,
}

impl Device {
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AirmonError::Validation`] when `name` is empty.
    pub fn validate(&self) -> Result<(), AirmonError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    name: Option<String>,
    manufacturer: Option<String>,
    model: Option<String>,
    integration: Option<String>,
    unique_id: Option<String>,
    sw_version: Option<String>,
    hw_version: Option<String>,
    mac: Option<String>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: DeviceId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn integration(mut self, integration: impl Into<String>) -> Self {
        self.integration = Some(integration.into());
        self
    }

    #[must_use]
    pub fn unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    #[must_use]
    pub fn sw_version(mut self, version: Option<String>) -> Self {
        self.sw_version = version;
        self
    }

    #[must_use]
    pub fn hw_version(mut self, version: Option<String>) -> Self {
        self.hw_version = version;
        self
    }

    #[must_use]
    pub fn mac(mut self, mac: Option<String>) -> Self {
        self.mac = mac;
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// # Errors
    ///
    /// Returns [`AirmonError::Validation`] if `name` is missing or empty.
    pub fn build(self) -> Result<Device, AirmonError> {
        let device = Device {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            manufacturer: self.manufacturer,
            model: self.model,
            integration: self.integration.unwrap_or_default(),
            unique_id: self.unique_id.unwrap_or_default(),
            sw_version: self.sw_version,
            hw_version: self.hw_version,
            mac: self.mac,
        };
        device.validate()?;
        Ok(device)
    }
}
