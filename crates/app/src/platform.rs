//! Builds the entity set of one monitor from its model's feature table.

use airmon_domain::descriptor::{NUMBERS, SENSORS, SWITCHES};
use airmon_domain::model::Model;

use crate::entities::{
    AirQualityEntity, EntityContext, MonitorEntity, NumberEntity, SensorEntity, SwitchEntity,
};
use crate::ports::DeviceClient;

/// Every entity `model` exposes, air-quality entity first.
///
/// A sensor or number is created only when its feature is in the model's
/// feature list. Numbers are limited to MIoT models and switches to models
/// with controllable power.
#[must_use]
#[tracing::instrument(skip(model, ctx), fields(%model, host = %ctx.host))]
pub fn setup_entities<C: DeviceClient>(model: Model, ctx: &EntityContext<C>) -> Vec<MonitorEntity<C>> {
    let mut entities = vec![MonitorEntity::AirQuality(AirQualityEntity::new(ctx.clone()))];

    entities.extend(
        SENSORS
            .iter()
            .filter(|d| model.supports(d.key))
            .map(|d| MonitorEntity::Sensor(SensorEntity::new(ctx.clone(), d))),
    );

    if model.has_numbers() {
        entities.extend(
            NUMBERS
                .iter()
                .filter(|d| model.supports(d.key))
                .map(|d| MonitorEntity::Number(NumberEntity::new(ctx.clone(), d))),
        );
    }

    if model.has_switches() {
        entities.extend(
            SWITCHES
                .iter()
                .map(|d| MonitorEntity::Switch(SwitchEntity::new(ctx.clone(), d))),
        );
    }

    tracing::debug!(count = entities.len(), "entities created");
    entities
}
