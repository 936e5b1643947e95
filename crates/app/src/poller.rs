//! Background poll loops.
//!
//! Each entity gets its own loop on a fixed cadence. There is no backoff: a
//! failing device is retried on the next tick, and the entity's
//! availability flag is the only trace of the failure.

use std::sync::Arc;
use std::time::Duration;

use airmon_domain::entity::Platform;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::entities::MonitorEntity;
use crate::ports::{DeviceClient, IntegrationContext};

/// An entity shared between its poll loop and service calls.
pub type SharedEntity<C> = Arc<Mutex<MonitorEntity<C>>>;

/// Poll cadence per entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    /// Air-quality entity; also refreshes the shared cache.
    pub air_quality: Duration,
    /// Sensors, numbers and switches.
    pub entity: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            air_quality: Duration::from_secs(60),
            entity: Duration::from_secs(90),
        }
    }
}

impl PollIntervals {
    #[must_use]
    pub fn for_platform(&self, platform: Platform) -> Duration {
        match platform {
            Platform::AirQuality => self.air_quality,
            Platform::Sensor | Platform::Number | Platform::Switch => self.entity,
        }
    }
}

/// Refresh `entity` and push its snapshot into `ctx`.
pub async fn refresh<C, X>(entity: &SharedEntity<C>, ctx: &X)
where
    C: DeviceClient,
    X: IntegrationContext,
{
    let snapshot = {
        let mut entity = entity.lock().await;
        entity.update().await;
        entity.snapshot()
    };
    match snapshot {
        Ok(snapshot) => {
            if let Err(err) = ctx.upsert_entity(snapshot).await {
                tracing::warn!(error = %err, "failed to record entity snapshot");
            }
        }
        Err(err) => tracing::warn!(error = %err, "failed to build entity snapshot"),
    }
}

/// Spawn the poll loop of one entity.
///
/// The first update happens one `period` after spawning; setup already
/// refreshed every entity once.
pub fn spawn_poller<C, X>(entity: SharedEntity<C>, period: Duration, ctx: X) -> JoinHandle<()>
where
    C: DeviceClient + 'static,
    X: IntegrationContext + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            refresh(&entity, &ctx).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use airmon_domain::entity::{AttributeValue, EntityState};
    use airmon_domain::model::Model;

    use super::*;
    use crate::availability::tests::{ErrorCounter, timeout_error};
    use crate::entities::tests::{ScriptedClient, context, lite_status};
    use crate::event_bus::InProcessEventBus;
    use crate::platform::setup_entities;
    use crate::services::registry::EntityRegistry;

    #[test]
    fn should_default_to_sixty_and_ninety_seconds() {
        let intervals = PollIntervals::default();
        assert_eq!(intervals.for_platform(Platform::AirQuality), Duration::from_secs(60));
        assert_eq!(intervals.for_platform(Platform::Switch), Duration::from_secs(90));
    }

    #[tokio::test]
    async fn should_share_snapshot_between_siblings_within_tick() {
        let ctx = context(ScriptedClient::with_statuses([
            Ok(lite_status(640)),
            Ok(lite_status(999)),
        ]));
        let client = Arc::clone(&ctx.client);
        let mut entities = setup_entities(Model::AirMonitorLite, &ctx);

        for entity in &mut entities {
            entity.update().await;
        }

        // one poll by the air-quality entity, siblings read the cache
        assert_eq!(client.status_calls(), 1);
        let snapshots: Vec<_> = entities.iter().map(|e| e.snapshot().unwrap()).collect();
        let from_air_quality = snapshots
            .iter()
            .find(|e| e.platform == Platform::AirQuality)
            .and_then(|e| e.get_attribute("carbon_dioxide"));
        let from_sensor = snapshots
            .iter()
            .find(|e| e.entity_id == "sensor.office_co2")
            .and_then(|e| e.get_attribute("value"));
        assert_eq!(from_air_quality, Some(&AttributeValue::Int(640)));
        assert_eq!(from_sensor, from_air_quality);
    }

    #[tokio::test(start_paused = true)]
    async fn should_poll_on_interval_and_record_snapshot() {
        let ctx = context(ScriptedClient::with_statuses([
            Ok(lite_status(600)),
            Ok(lite_status(650)),
        ]));
        let client = Arc::clone(&ctx.client);
        let registry = EntityRegistry::new(InProcessEventBus::default());
        let entity = setup_entities(Model::AirMonitorLite, &ctx).remove(0);
        let id = entity.id();
        let shared: SharedEntity<_> = Arc::new(Mutex::new(entity));

        let handle = spawn_poller(Arc::clone(&shared), Duration::from_secs(60), registry.clone());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(client.status_calls(), 0);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(client.status_calls(), 1);
        assert_eq!(
            registry.get_entity(id).unwrap().get_attribute("carbon_dioxide"),
            Some(&AttributeValue::Int(600))
        );

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(client.status_calls(), 2);
        assert_eq!(
            registry.get_entity(id).unwrap().get_attribute("carbon_dioxide"),
            Some(&AttributeValue::Int(650))
        );

        handle.abort();
    }

    #[tokio::test]
    async fn should_log_once_and_recover_after_consecutive_failures() {
        use tracing_subscriber::layer::SubscriberExt;

        let counter = ErrorCounter::default();
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::registry().with(counter.clone()),
        );

        let ctx = context(ScriptedClient::with_statuses([
            Err(timeout_error()),
            Err(timeout_error()),
            Err(timeout_error()),
            Err(timeout_error()),
            Ok(lite_status(600)),
        ]));
        let registry = EntityRegistry::new(InProcessEventBus::default());
        let entity = setup_entities(Model::AirMonitorLite, &ctx).remove(0);
        let id = entity.id();
        let shared: SharedEntity<_> = Arc::new(Mutex::new(entity));

        for _ in 0..4 {
            refresh(&shared, &registry).await;
        }
        assert!(!shared.lock().await.is_available());
        assert_eq!(registry.get_entity(id).unwrap().state, EntityState::Unavailable);
        assert_eq!(counter.count(), 1);

        refresh(&shared, &registry).await;
        assert!(shared.lock().await.is_available());
        assert_eq!(registry.get_entity(id).unwrap().state, EntityState::On);
        assert_eq!(counter.count(), 1);
    }
}
