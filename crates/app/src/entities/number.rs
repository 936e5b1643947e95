use airmon_domain::descriptor::NumberDescription;
use airmon_domain::entity::{AttributeValue, Entity, Platform};
use airmon_domain::error::AirmonError;

use super::{EntityContext, EntityMeta, command_succeeded, value_state};
use crate::availability::Availability;
use crate::ports::DeviceClient;

/// A writable configuration value (screen-off delay, monitoring interval, …).
pub struct NumberEntity<C> {
    pub(crate) meta: EntityMeta,
    ctx: EntityContext<C>,
    description: &'static NumberDescription,
    availability: Availability,
    value: Option<AttributeValue>,
}

impl<C: DeviceClient> NumberEntity<C> {
    #[must_use]
    pub fn new(ctx: EntityContext<C>, description: &'static NumberDescription) -> Self {
        let meta = EntityMeta::new(&ctx, Platform::Number, description.name, description.key.key());
        Self {
            meta,
            ctx,
            description,
            availability: Availability::new(),
            value: None,
        }
    }

    #[must_use]
    pub fn description(&self) -> &'static NumberDescription {
        self.description
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.availability.is_available()
    }

    #[must_use]
    pub fn native_value(&self) -> Option<&AttributeValue> {
        self.value.as_ref()
    }

    pub async fn update(&mut self) {
        match self.ctx.read_status().await {
            Ok(status) => {
                self.availability.record_success(&self.meta.unique_id);
                self.value = status.get(self.description.key);
            }
            Err(err) => {
                self.availability.record_failure(
                    &self.meta.unique_id,
                    "got exception while fetching the state",
                    &err,
                );
            }
        }
    }

    /// Write `value` to the device.
    ///
    /// The displayed value is not changed; the next poll reports what the
    /// device accepted. A transport failure marks the entity unavailable and
    /// returns `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`AirmonError::Validation`] when `value` is outside the
    /// description's range. Nothing is sent in that case.
    pub async fn set_native_value(&mut self, value: f64) -> Result<bool, AirmonError> {
        self.description.validate(value)?;
        let key = self.description.key.key();
        match self.ctx.client.set_value(key, value).await {
            Ok(response) => {
                tracing::debug!(entity = %self.meta.unique_id, %response, "response received");
                Ok(command_succeeded(&response))
            }
            Err(err) => {
                self.availability.record_failure(
                    &self.meta.unique_id,
                    "setting the value failed",
                    &err,
                );
                Ok(false)
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`AirmonError::Validation`] if the device name is empty.
    pub fn snapshot(&self) -> Result<Entity, AirmonError> {
        let d = self.description;
        self.meta
            .builder(self.ctx.device_id)
            .state(value_state(self.is_available(), self.value.as_ref()))
            .maybe_attribute("value", self.value.clone())
            .attribute("min", d.min)
            .attribute("max", d.max)
            .attribute("step", d.step)
            .maybe_attribute("unit_of_measurement", d.unit.map(|u| u.symbol().into()))
            .maybe_attribute("device_class", d.device_class.map(|c| c.as_str().into()))
            .maybe_attribute("icon", d.icon.map(Into::into))
            .build()
    }
}
