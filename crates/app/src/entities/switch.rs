use airmon_domain::descriptor::SwitchDescription;
use airmon_domain::entity::{Entity, EntityState, Platform};
use airmon_domain::error::AirmonError;

use super::{EntityContext, EntityMeta, command_succeeded};
use crate::availability::Availability;
use crate::ports::DeviceClient;

/// Screen or device power switch.
///
/// The monitor does not report the new position right after a command, so
/// a successful command sets the state optimistically and the next update
/// is skipped.
pub struct SwitchEntity<C> {
    pub(crate) meta: EntityMeta,
    ctx: EntityContext<C>,
    description: &'static SwitchDescription,
    availability: Availability,
    is_on: Option<bool>,
    skip_update: bool,
}

impl<C: DeviceClient> SwitchEntity<C> {
    #[must_use]
    pub fn new(ctx: EntityContext<C>, description: &'static SwitchDescription) -> Self {
        let meta = EntityMeta::new(&ctx, Platform::Switch, description.name, description.key);
        Self {
            meta,
            ctx,
            description,
            availability: Availability::new(),
            is_on: None,
            skip_update: false,
        }
    }

    #[must_use]
    pub fn description(&self) -> &'static SwitchDescription {
        self.description
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.availability.is_available()
    }

    /// Last known position, `None` until one is known.
    #[must_use]
    pub fn is_on(&self) -> Option<bool> {
        self.is_on
    }

    pub async fn update(&mut self) {
        if self.skip_update {
            self.skip_update = false;
            return;
        }
        match self.ctx.read_status().await {
            // snapshots carry no switch position, the last known one stays
            Ok(_) => {
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

    /// Returns whether the device acknowledged the command.
    pub async fn turn_on(&mut self) -> bool {
        let result = self.ctx.client.set_switch_on(self.description.key).await;
        self.apply(result, true, "turning the switch on failed")
    }

    /// Returns whether the device acknowledged the command.
    pub async fn turn_off(&mut self) -> bool {
        let result = self.ctx.client.set_switch_off(self.description.key).await;
        self.apply(result, false, "turning the switch off failed")
    }

    fn apply(
        &mut self,
        result: Result<serde_json::Value, AirmonError>,
        target: bool,
        message: &str,
    ) -> bool {
        match result {
            Ok(response) => {
                tracing::debug!(entity = %self.meta.unique_id, %response, "response received");
                let ok = command_succeeded(&response);
                if ok {
                    self.is_on = Some(target);
                    self.skip_update = true;
                }
                ok
            }
            Err(err) => {
                self.availability
                    .record_failure(&self.meta.unique_id, message, &err);
                false
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`AirmonError::Validation`] if the device name is empty.
    pub fn snapshot(&self) -> Result<Entity, AirmonError> {
        let state = if self.is_available() {
            EntityState::from_switch(self.is_on)
        } else {
            EntityState::Unavailable
        };
        self.meta
            .builder(self.ctx.device_id)
            .state(state)
            .maybe_attribute("icon", self.description.icon.map(Into::into))
            .build()
    }
}
