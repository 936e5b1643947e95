//! Entity: one host-visible value or control of a device.
//!
//! The monitor is surfaced as several entities: one air-quality entity,
//! one per reported sensor, one per writable configuration number and one
//! per power switch. Each entity carries its current [`EntityState`] plus a
//! bag of typed attributes (reading, unit, device class, …).

mod attribute_value;
mod state;

pub use attribute_value::AttributeValue;
pub use state::EntityState;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AirmonError, ValidationError};
use crate::id::{DeviceId, EntityId};
use crate::time::{Timestamp, now};

/// Host platform an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    AirQuality,
    #[default]
    Sensor,
    Number,
    Switch,
}

impl Platform {
    /// Prefix used for textual entity ids (`sensor.office_monitor_co2`).
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::AirQuality => "air_quality",
            Self::Sensor => "sensor",
            Self::Number => "number",
            Self::Switch => "switch",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A host-visible entity snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub device_id: DeviceId,
    /// Textual id, `<platform>.<slug>`.
    pub entity_id: String,
    /// Stable id derived from the device name and the attribute key.
    pub unique_id: String,
    pub friendly_name: String,
    pub platform: Platform,
    pub state: EntityState,
    pub attributes: HashMap<String, AttributeValue>,
    pub last_changed: Timestamp,
    pub last_updated: Timestamp,
}

impl Entity {
    #[must_use]
    pub fn builder() -> EntityBuilder {
        EntityBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AirmonError::Validation`] when the textual id or the
    /// friendly name is empty.
    pub fn validate(&self) -> Result<(), AirmonError> {
        if self.entity_id.is_empty() {
            return Err(ValidationError::EmptyEntityId.into());
        }
        if self.friendly_name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }

    #[must_use]
    pub fn get_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Insert or replace an attribute; `None` removes it.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: Option<AttributeValue>) {
        let key = key.into();
        match value {
            Some(value) => {
                self.attributes.insert(key, value);
            }
            None => {
                self.attributes.remove(&key);
            }
        }
    }

    /// Whether anything visible to the host differs from `other`.
    #[must_use]
    pub fn differs_from(&self, other: &Self) -> bool {
        self.state != other.state
            || self.attributes != other.attributes
            || self.friendly_name != other.friendly_name
    }
}

/// Step-by-step builder for [`Entity`].
#[derive(Debug, Default)]
pub struct EntityBuilder {
    id: Option<EntityId>,
    device_id: Option<DeviceId>,
    entity_id: Option<String>,
    unique_id: Option<String>,
    friendly_name: Option<String>,
    platform: Platform,
    state: EntityState,
    attributes: HashMap<String, AttributeValue>,
}

impl EntityBuilder {
    #[must_use]
    pub fn id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn device_id(mut self, device_id: DeviceId) -> Self {
        self.device_id = Some(device_id);
        self
    }

    #[must_use]
    pub fn entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    #[must_use]
    pub fn unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    #[must_use]
    pub fn friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    #[must_use]
    pub fn state(mut self, state: EntityState) -> Self {
        self.state = state;
        self
    }

    /// Add an attribute. `Into` lets callers pass plain numbers and strings.
    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Add an attribute only when a value is present.
    #[must_use]
    pub fn maybe_attribute(mut self, key: impl Into<String>, value: Option<AttributeValue>) -> Self {
        if let Some(value) = value {
            self.attributes.insert(key.into(), value);
        }
        self
    }

    /// Consume the builder, validate, and return an [`Entity`].
    ///
    /// # Errors
    ///
    /// Returns [`AirmonError::Validation`] if the textual id or the friendly
    /// name is missing.
    pub fn build(self) -> Result<Entity, AirmonError> {
        let ts = now();
        let entity_id = self.entity_id.unwrap_or_default();
        let entity = Entity {
            id: self.id.unwrap_or_default(),
            device_id: self.device_id.unwrap_or_default(),
            unique_id: self.unique_id.unwrap_or_else(|| entity_id.clone()),
            entity_id,
            friendly_name: self.friendly_name.unwrap_or_default(),
            platform: self.platform,
            state: self.state,
            attributes: self.attributes,
            last_changed: ts,
            last_updated: ts,
        };
        entity.validate()?;
        Ok(entity)
    }
}

/// Lowercase `[a-z0-9_]` slug used in textual entity ids.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_matches('_').to_string()
}
