//! Host-facing entities of one monitor.
//!
//! Every entity owns its availability flag and a copy of the shared
//! [`EntityContext`]. The air-quality entity is the one that polls the
//! device and refreshes the [`StatusCache`]; sensors, numbers and switches
//! read the cached snapshot and only poll when nothing is cached yet.

mod air_quality;
mod number;
mod sensor;
mod switch;

pub use air_quality::AirQualityEntity;
pub use number::NumberEntity;
pub use sensor::SensorEntity;
pub use switch::SwitchEntity;

use std::sync::Arc;

use airmon_domain::entity::{AttributeValue, Entity, EntityBuilder, EntityState, Platform, slugify};
use airmon_domain::error::{AirmonError, ValidationError};
use airmon_domain::id::{DeviceId, EntityId};
use airmon_domain::status::Status;

use crate::ports::DeviceClient;
use crate::status_cache::StatusCache;

/// What every entity of one monitor shares.
pub struct EntityContext<C> {
    pub device_id: DeviceId,
    /// User-chosen display name, prefix of every entity name.
    pub device_name: String,
    /// Device unique id (`{model}-{mac}` when detected).
    pub device_unique_id: String,
    /// Network address; key of the shared status cache.
    pub host: String,
    pub client: Arc<C>,
    pub cache: StatusCache,
}

impl<C> Clone for EntityContext<C> {
    fn clone(&self) -> Self {
        Self {
            device_id: self.device_id,
            device_name: self.device_name.clone(),
            device_unique_id: self.device_unique_id.clone(),
            host: self.host.clone(),
            client: Arc::clone(&self.client),
            cache: self.cache.clone(),
        }
    }
}

impl<C: DeviceClient> EntityContext<C> {
    /// Cached snapshot for this host, or a fresh poll when none is cached.
    /// A fresh poll is not written back; only the air-quality entity does
    /// that.
    pub(crate) async fn read_status(&self) -> Result<Arc<Status>, AirmonError> {
        if let Some(status) = self.cache.get(&self.host) {
            return Ok(status);
        }
        self.client.status().await.map(Arc::new)
    }
}

/// Identity shared by all entity kinds.
#[derive(Debug, Clone)]
pub(crate) struct EntityMeta {
    pub id: EntityId,
    pub unique_id: String,
    pub name: String,
    pub platform: Platform,
}

impl EntityMeta {
    /// `"{device name} {suffix}"` as name, `"{device name}_{key}"` as unique id.
    pub(crate) fn new<C>(ctx: &EntityContext<C>, platform: Platform, suffix: &str, key: &str) -> Self {
        Self {
            id: EntityId::new(),
            unique_id: format!("{}_{}", ctx.device_name, key),
            name: format!("{} {}", ctx.device_name, suffix),
            platform,
        }
    }

    pub(crate) fn builder(&self, device_id: DeviceId) -> EntityBuilder {
        Entity::builder()
            .id(self.id)
            .device_id(device_id)
            .entity_id(format!("{}.{}", self.platform.prefix(), slugify(&self.unique_id)))
            .unique_id(self.unique_id.clone())
            .friendly_name(self.name.clone())
            .platform(self.platform)
    }
}

/// State for a value-carrying entity.
pub(crate) fn value_state(available: bool, value: Option<&AttributeValue>) -> EntityState {
    match (available, value) {
        (false, _) => EntityState::Unavailable,
        (true, Some(_)) => EntityState::On,
        (true, None) => EntityState::Unknown,
    }
}

/// Interpret a raw command response.
///
/// - `"ok"` is a success, any other string is not;
/// - a list succeeds when its first element is `"ok"` or has `code == 0`,
///   an empty list is a success;
/// - an object succeeds when its `code == 0`;
/// - anything else is a failure.
#[must_use]
pub fn command_succeeded(response: &serde_json::Value) -> bool {
    use serde_json::Value;

    fn code_is_zero(value: Option<&Value>) -> bool {
        value
            .and_then(|item| item.get("code"))
            .and_then(Value::as_i64)
            == Some(0)
    }

    match response {
        Value::String(text) => text == "ok",
        Value::Array(items) => {
            items.is_empty()
                || items.first().and_then(Value::as_str) == Some("ok")
                || code_is_zero(items.first())
        }
        Value::Object(_) => code_is_zero(Some(response)),
        _ => false,
    }
}

/// Any entity of the monitor, dispatched statically.
pub enum MonitorEntity<C> {
    AirQuality(AirQualityEntity<C>),
    Sensor(SensorEntity<C>),
    Number(NumberEntity<C>),
    Switch(SwitchEntity<C>),
}

impl<C: DeviceClient> MonitorEntity<C> {
    fn meta(&self) -> &EntityMeta {
        match self {
            Self::AirQuality(e) => &e.meta,
            Self::Sensor(e) => &e.meta,
            Self::Number(e) => &e.meta,
            Self::Switch(e) => &e.meta,
        }
    }

    #[must_use]
    pub fn id(&self) -> EntityId {
        self.meta().id
    }

    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.meta().unique_id
    }

    #[must_use]
    pub fn platform(&self) -> Platform {
        self.meta().platform
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        match self {
            Self::AirQuality(e) => e.is_available(),
            Self::Sensor(e) => e.is_available(),
            Self::Number(e) => e.is_available(),
            Self::Switch(e) => e.is_available(),
        }
    }

    /// Refresh from the device or the shared cache. Never fails; a device
    /// error only flips the availability flag.
    pub async fn update(&mut self) {
        match self {
            Self::AirQuality(e) => e.update().await,
            Self::Sensor(e) => e.update().await,
            Self::Number(e) => e.update().await,
            Self::Switch(e) => e.update().await,
        }
    }

    /// Host-facing snapshot of the entity.
    ///
    /// # Errors
    ///
    /// Returns [`AirmonError::Validation`] if the device name is empty.
    pub fn snapshot(&self) -> Result<Entity, AirmonError> {
        match self {
            Self::AirQuality(e) => e.snapshot(),
            Self::Sensor(e) => e.snapshot(),
            Self::Number(e) => e.snapshot(),
            Self::Switch(e) => e.snapshot(),
        }
    }

    /// Run a service against this entity.
    ///
    /// Every entity accepts `update`. Numbers accept `set_value` with a
    /// numeric `value` field, switches accept `turn_on` and `turn_off`.
    /// Returns whether the device acknowledged the command (`true` for
    /// `update`).
    ///
    /// # Errors
    ///
    /// Returns [`AirmonError::Validation`] for an unsupported service, a
    /// missing value or a value outside the number's range.
    pub async fn call_service(
        &mut self,
        service: &str,
        data: &serde_json::Value,
    ) -> Result<bool, AirmonError> {
        match (self, service) {
            (entity, "update") => {
                entity.update().await;
                Ok(true)
            }
            (Self::Number(e), "set_value") => {
                let value = data
                    .get("value")
                    .and_then(serde_json::Value::as_f64)
                    .ok_or(ValidationError::MissingValue)?;
                e.set_native_value(value).await
            }
            (Self::Switch(e), "turn_on") => Ok(e.turn_on().await),
            (Self::Switch(e), "turn_off") => Ok(e.turn_off().await),
            (entity, _) => Err(ValidationError::UnsupportedService {
                entity: entity.unique_id().to_string(),
                service: service.to_string(),
            }
            .into()),
        }
    }
}
