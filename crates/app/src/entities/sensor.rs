use airmon_domain::descriptor::SensorDescription;
use airmon_domain::entity::{AttributeValue, Entity, Platform};
use airmon_domain::error::AirmonError;

use super::{EntityContext, EntityMeta, value_state};
use crate::availability::Availability;
use crate::ports::DeviceClient;

/// One reported measurement (CO2, temperature, battery, …).
pub struct SensorEntity<C> {
    pub(crate) meta: EntityMeta,
    ctx: EntityContext<C>,
    description: &'static SensorDescription,
    availability: Availability,
    value: Option<AttributeValue>,
}

impl<C: DeviceClient> SensorEntity<C> {
    #[must_use]
    pub fn new(ctx: EntityContext<C>, description: &'static SensorDescription) -> Self {
        let meta = EntityMeta::new(&ctx, Platform::Sensor, description.name, description.key.key());
        Self {
            meta,
            ctx,
            description,
            availability: Availability::new(),
            value: None,
        }
    }

    #[must_use]
    pub fn description(&self) -> &'static SensorDescription {
        self.description
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.availability.is_available()
    }

    /// Last value read, `None` when the device did not report it.
    #[must_use]
    pub fn native_value(&self) -> Option<&AttributeValue> {
        self.value.as_ref()
    }

    pub async fn update(&mut self) {
        match self.ctx.read_status().await {
            Ok(status) => {
                self.availability.record_success(&self.meta.unique_id);
                self.value = status.get(self.description.key);
                tracing::debug!(entity = %self.meta.unique_id, value = ?self.value, "sensor updated");
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

    /// # Errors
    ///
    /// Returns [`AirmonError::Validation`] if the device name is empty.
    pub fn snapshot(&self) -> Result<Entity, AirmonError> {
        let d = self.description;
        self.meta
            .builder(self.ctx.device_id)
            .state(value_state(self.is_available(), self.value.as_ref()))
            .maybe_attribute("value", self.value.clone())
            .maybe_attribute("unit_of_measurement", d.unit.map(|u| u.symbol().into()))
            .maybe_attribute("device_class", d.device_class.map(|c| c.as_str().into()))
            .maybe_attribute("state_class", d.state_class.map(|c| c.as_str().into()))
            .maybe_attribute("icon", d.icon.map(Into::into))
            .build()
    }
}
