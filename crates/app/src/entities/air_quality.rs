use airmon_domain::entity::{AttributeValue, Entity, EntityState, Platform};
use airmon_domain::error::AirmonError;

use super::{EntityContext, EntityMeta};
use crate::availability::Availability;
use crate::ports::DeviceClient;

/// Summary entity of the monitor. The only entity that polls the device on
/// every update and the only writer of the shared status cache.
pub struct AirQualityEntity<C> {
    pub(crate) meta: EntityMeta,
    ctx: EntityContext<C>,
    availability: Availability,
    carbon_dioxide: Option<i64>,
    particulate_matter_2_5: Option<i64>,
    total_volatile_organic_compounds: Option<i64>,
}

impl<C: DeviceClient> AirQualityEntity<C> {
    /// Named after the device itself, unique id `"{device name}_{device unique id}"`.
    #[must_use]
    pub fn new(ctx: EntityContext<C>) -> Self {
        let mut meta = EntityMeta::new(&ctx, Platform::AirQuality, "", &ctx.device_unique_id);
        meta.name.clone_from(&ctx.device_name);
        Self {
            meta,
            ctx,
            availability: Availability::new(),
            carbon_dioxide: None,
            particulate_matter_2_5: None,
            total_volatile_organic_compounds: None,
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.availability.is_available()
    }

    /// Called once the entity is registered: fills the shared cache so the
    /// sibling entities' first update does not hit the device.
    pub async fn added(&mut self) {
        self.update().await;
    }

    pub async fn update(&mut self) {
        match self.ctx.client.status().await {
            Ok(status) => {
                let status = self.ctx.cache.put(&self.ctx.host, status);
                tracing::debug!(host = %self.ctx.host, ?status, "got new state");
                self.carbon_dioxide = status.co2();
                self.particulate_matter_2_5 = status.pm25();
                self.total_volatile_organic_compounds = status.tvoc();
                self.availability.record_success(&self.meta.unique_id);
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

    #[must_use]
    pub fn carbon_dioxide(&self) -> Option<i64> {
        self.carbon_dioxide
    }

    /// The monitor has no separate CO2e reading; mirrors [`Self::carbon_dioxide`].
    #[must_use]
    pub fn carbon_dioxide_equivalent(&self) -> Option<i64> {
        self.carbon_dioxide
    }

    #[must_use]
    pub fn particulate_matter_2_5(&self) -> Option<i64> {
        self.particulate_matter_2_5
    }

    #[must_use]
    pub fn total_volatile_organic_compounds(&self) -> Option<i64> {
        self.total_volatile_organic_compounds
    }

    /// Never computed by the device.
    #[must_use]
    pub fn air_quality_index(&self) -> Option<i64> {
        None
    }

    /// # Errors
    ///
    /// Returns [`AirmonError::Validation`] if the device name is empty.
    pub fn snapshot(&self) -> Result<Entity, AirmonError> {
        let has_reading = self.carbon_dioxide.is_some()
            || self.particulate_matter_2_5.is_some()
            || self.total_volatile_organic_compounds.is_some();
        let state = match (self.is_available(), has_reading) {
            (false, _) => EntityState::Unavailable,
            (true, true) => EntityState::On,
            (true, false) => EntityState::Unknown,
        };
        let int = |v: Option<i64>| v.map(AttributeValue::Int);
        self.meta
            .builder(self.ctx.device_id)
            .state(state)
            .maybe_attribute("carbon_dioxide", int(self.carbon_dioxide()))
            .maybe_attribute("carbon_dioxide_equivalent", int(self.carbon_dioxide_equivalent()))
            .maybe_attribute("particulate_matter_2_5", int(self.particulate_matter_2_5()))
            .maybe_attribute(
                "total_volatile_organic_compounds",
                int(self.total_volatile_organic_compounds()),
            )
            .maybe_attribute("air_quality_index", int(self.air_quality_index()))
            .build()
    }
}
