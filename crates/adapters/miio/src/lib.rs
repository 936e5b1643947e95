//! # airmon-adapter-miio
//!
//! Integration for Xiaomi / QingPing air-quality monitors.
//!
//! ## Dialects
//!
//! | Model | Dialect | Client |
//! |-------|---------|--------|
//! | `cgllc.airmonitor.s1` | `get_prop` by property name | [`MiioClient`] |
//! | `cgllc.airm.cgdn1` | MIoT `get_properties` by `siid/piid` | [`MiotClient`] |
//! | `cgllc.airm.cgd1st` | MIoT, plus nine writable settings | [`MiotClient`] |
//!
//! Both clients sit behind [`MonitorClient`], which implements the
//! application's `DeviceClient` port. The encrypted exchange itself is
//! abstracted by [`Transport`].
//!
//! The S1 firmware commands without an entity of their own
//! ([`MonitorCommand`]) are services of its air-quality entity.
//!
//! ## Dependency rule
//!
//! Depends on `airmon-app` (port traits, entities) and `airmon-domain` only.

mod client;
mod commands;
pub mod config;
mod error;
mod miio;
mod miot;
mod transport;

use std::sync::{Arc, Mutex, PoisonError};

use airmon_app::entities::{EntityContext, MonitorEntity, command_succeeded};
use airmon_app::platform::setup_entities;
use airmon_app::poller::{PollIntervals, SharedEntity, spawn_poller};
use airmon_app::ports::{DeviceInfo, DiscoveredDevice, Integration, IntegrationContext};
use airmon_app::status_cache::StatusCache;
use airmon_domain::device::Device;
use airmon_domain::entity::{Entity, Platform};
use airmon_domain::error::{AirmonError, DeviceError, NotFoundError};
use airmon_domain::id::EntityId;
use airmon_domain::model::Model;
use tokio::task::JoinHandle;

pub use client::{MonitorClient, connect, fetch_info};
pub use commands::MonitorCommand;
pub use config::MiioConfig;
pub use error::MiioError;
pub use miio::MiioClient;
pub use miot::{MiotAction, MiotClient, MiotMapping, MiotProperty, mapping_for};
pub use transport::Transport;

const INTEGRATION_NAME: &str = "miio";

/// An entity registered by [`MonitorIntegration::setup`].
struct Registered<T> {
    id: EntityId,
    platform: Platform,
    entity: SharedEntity<MonitorClient<T>>,
}

impl<T> Clone for Registered<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            platform: self.platform,
            entity: Arc::clone(&self.entity),
        }
    }
}

/// The air-quality monitor integration.
///
/// `setup` resolves the model, registers the device and its entities and
/// primes the shared status cache. `start_background` spawns one poll loop
/// per entity.
pub struct MonitorIntegration<T> {
    config: MiioConfig,
    transport: T,
    intervals: PollIntervals,
    cache: StatusCache,
    client: Mutex<Option<Arc<MonitorClient<T>>>>,
    entities: Mutex<Vec<Registered<T>>>,
    pollers: Mutex<Vec<JoinHandle<()>>>,
}

impl<T> MonitorIntegration<T>
where
    T: Transport + Clone + 'static,
{
    pub fn new(config: MiioConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            intervals: PollIntervals::default(),
            cache: StatusCache::new(),
            client: Mutex::new(None),
            entities: Mutex::new(Vec::new()),
            pollers: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_intervals(mut self, intervals: PollIntervals) -> Self {
        self.intervals = intervals;
        self
    }

    fn find(&self, entity_id: EntityId) -> Option<Registered<T>> {
        self.entities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|registered| registered.id == entity_id)
            .cloned()
    }

    fn client(&self) -> Option<Arc<MonitorClient<T>>> {
        self.client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Configured model, or the one reported by `miIO.info`.
    ///
    /// Returns the model, the device unique id and the identity block when
    /// one was read.
    async fn resolve_model(&self) -> Result<(Model, String, Option<DeviceInfo>), AirmonError> {
        if let Some(model) = self.config.validate()? {
            let network_id = self.config.mac.as_deref().unwrap_or(&self.config.host);
            return Ok((model, format!("{model}-{network_id}"), None));
        }

        let info = fetch_info(&self.transport).await.map_err(|err| {
            tracing::warn!(host = %self.config.host, error = %err, "device not ready, model detection failed");
            err.into_domain()
        })?;
        let reported = info.model.clone().ok_or(DeviceError::UnexpectedResponse {
            method: "miIO.info",
            reason: "no model reported".to_string(),
        })?;
        tracing::info!(
            model = %reported,
            firmware = ?info.firmware_version,
            hardware = ?info.hardware_version,
            "detected"
        );
        let model = reported.parse::<Model>().inspect_err(|_| {
            tracing::error!(model = %reported, "unsupported device found");
        })?;
        let network_id = info.mac_address.as_deref().unwrap_or(&self.config.host);
        let unique_id = format!("{model}-{network_id}");
        Ok((model, unique_id, Some(info)))
    }
}

impl<T> Integration for MonitorIntegration<T>
where
    T: Transport + Clone + 'static,
{
    fn name(&self) -> &'static str {
        INTEGRATION_NAME
    }

    #[tracing::instrument(skip(self, ctx), fields(host = %self.config.host))]
    async fn setup(&self, ctx: &impl IntegrationContext) -> Result<(), AirmonError> {
        let (model, unique_id, detected) = self.resolve_model().await?;
        let client = Arc::new(connect(model, self.transport.clone())?);

        let info = match detected {
            Some(info) => info,
            None => fetch_info(&self.transport).await.unwrap_or_else(|err| {
                tracing::warn!(host = %self.config.host, error = %err, "could not read device identity");
                DeviceInfo::default()
            }),
        };

        let device = Device::builder()
            .name(self.config.name.clone())
            .manufacturer(model.manufacturer())
            .model(model.identifier())
            .integration(INTEGRATION_NAME)
            .unique_id(unique_id.clone())
            .sw_version(info.firmware_version)
            .hw_version(info.hardware_version)
            .mac(self.config.mac.clone().or(info.mac_address))
            .build()?;

        let entity_ctx = EntityContext {
            device_id: device.id,
            device_name: self.config.name.clone(),
            device_unique_id: unique_id,
            host: self.config.host.clone(),
            client: Arc::clone(&client),
            cache: self.cache.clone(),
        };

        let mut entities = setup_entities(model, &entity_ctx);
        let mut snapshots = Vec::with_capacity(entities.len());
        for entity in &mut entities {
            match &mut *entity {
                MonitorEntity::AirQuality(air_quality) => air_quality.added().await,
                other => other.update().await,
            }
            snapshots.push(entity.snapshot()?);
        }

        let registered: Vec<_> = entities
            .into_iter()
            .map(|entity| Registered {
                id: entity.id(),
                platform: entity.platform(),
                entity: Arc::new(tokio::sync::Mutex::new(entity)),
            })
            .collect();
        tracing::info!(
            host = %self.config.host,
            %model,
            entities = registered.len(),
            "monitor set up"
        );
        *self.entities.lock().unwrap_or_else(PoisonError::into_inner) = registered;
        *self.client.lock().unwrap_or_else(PoisonError::into_inner) = Some(client);

        ctx.persist_discovered(DiscoveredDevice {
            device,
            entities: snapshots,
        })
        .await
    }

    #[tracing::instrument(skip(self, ctx), fields(host = %self.config.host))]
    async fn start_background(
        &self,
        ctx: impl IntegrationContext + Clone + 'static,
    ) -> Result<(), AirmonError> {
        let entities = self
            .entities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let handles: Vec<_> = entities
            .into_iter()
            .map(|registered| {
                let period = self.intervals.for_platform(registered.platform);
                spawn_poller(registered.entity, period, ctx.clone())
            })
            .collect();
        tracing::debug!(pollers = handles.len(), "poll loops started");
        self.pollers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(handles);
        Ok(())
    }

    #[tracing::instrument(skip(self, data), fields(host = %self.config.host))]
    async fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> Result<Entity, AirmonError> {
        let registered = self.find(entity_id).ok_or_else(|| NotFoundError {
            entity: "Entity",
            id: entity_id.to_string(),
        })?;
        let mut entity = registered.entity.lock().await;

        let monitor = self.client();
        if registered.platform == Platform::AirQuality
            && let Some(MonitorClient::Miio(client)) = monitor.as_deref()
            && let Some(command) = MonitorCommand::parse(service, &data)?
        {
            let response = command.run(client).await?;
            if !command_succeeded(&response) {
                tracing::warn!(?command, ?response, "device did not acknowledge the command");
            }
            entity.update().await;
            return entity.snapshot();
        }

        let acknowledged = entity.call_service(service, &data).await?;
        if !acknowledged {
            tracing::warn!(entity = %entity.unique_id(), service, "device did not acknowledge the command");
        }
        entity.snapshot()
    }

    #[tracing::instrument(skip(self), fields(host = %self.config.host))]
    async fn teardown(&self) -> Result<(), AirmonError> {
        let handles: Vec<_> = self
            .pollers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for handle in &handles {
            handle.abort();
        }
        self.cache.clear(&self.config.host);
        tracing::info!(host = %self.config.host, pollers = handles.len(), "monitor torn down");
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use airmon_app::event_bus::InProcessEventBus;
    use airmon_app::services::registry::EntityRegistry;
    use airmon_domain::entity::{AttributeValue, EntityState};
    use airmon_domain::error::ValidationError;
    use serde_json::json;

    use super::*;
    use crate::testing::FakeTransport;

    const TOKEN: &str = "0123456789abcdef0123456789abcdef";

    fn config(model: Option<&str>) -> MiioConfig {
        MiioConfig {
            host: "192.168.1.20".to_string(),
            token: TOKEN.to_string(),
            model: model.map(str::to_string),
            name: "Office".to_string(),
            mac: None,
        }
    }

    fn lite_info() -> serde_json::Value {
        json!({"model": "cgllc.airm.cgdn1", "fw_ver": "4.1.8_9999",
               "hw_ver": "esp32", "mac": "58:b6:23:01:02:03"})
    }

    fn lite_properties(co2: i64) -> serde_json::Value {
        json!([
            {"did": "relative-humidity", "code": 0, "value": 41.0},
            {"did": "pm2.5-density", "code": 0, "value": 6},
            {"did": "pm10-density", "code": 0, "value": 9},
            {"did": "temperature", "code": 0, "value": 22.4},
            {"did": "co2-density", "code": 0, "value": co2},
            {"did": "battery-level", "code": 0, "value": 88},
            {"did": "charging-state", "code": 0, "value": 1},
            {"did": "voltage", "code": 0, "value": 4100},
        ])
    }

    fn registry() -> EntityRegistry<InProcessEventBus> {
        EntityRegistry::new(InProcessEventBus::default())
    }

    #[tokio::test]
    async fn should_detect_model_and_register_device() {
        let transport = FakeTransport::default()
            .respond("miIO.info", lite_info())
            .respond("get_properties", lite_properties(640));
        let integration = MonitorIntegration::new(config(None), transport.clone());
        let registry = registry();

        integration.setup(&registry).await.unwrap();

        let device = registry.device().unwrap();
        assert_eq!(device.unique_id, "cgllc.airm.cgdn1-58:b6:23:01:02:03");
        assert_eq!(device.manufacturer.as_deref(), Some("Cgllc"));
        assert_eq!(device.sw_version.as_deref(), Some("4.1.8_9999"));
        assert_eq!(device.mac.as_deref(), Some("58:b6:23:01:02:03"));
        // one identity read, one status poll shared by every entity
        let methods: Vec<_> = transport.requests().into_iter().map(|(m, _)| m).collect();
        assert_eq!(methods, vec!["miIO.info", "get_properties"]);
    }

    #[tokio::test]
    async fn should_register_lite_entities_from_primed_cache() {
        let transport = FakeTransport::default()
            .respond("miIO.info", lite_info())
            .respond("get_properties", lite_properties(640));
        let integration = MonitorIntegration::new(config(None), transport);
        let registry = registry();

        integration.setup(&registry).await.unwrap();

        let entities = registry.list_entities();
        // air quality + 7 sensors + 2 switches
        assert_eq!(entities.len(), 10);
        let co2 = registry.find_by_entity_id("sensor.office_co2").unwrap();
        assert_eq!(co2.state, EntityState::On);
        assert_eq!(co2.get_attribute("value"), Some(&AttributeValue::Int(640)));
        let charging = registry.find_by_entity_id("sensor.office_battery_state").unwrap();
        assert_eq!(
            charging.get_attribute("value"),
            Some(&AttributeValue::String("Charging".to_string()))
        );
    }

    #[tokio::test]
    async fn should_use_configured_model_and_host_for_unique_id() {
        let transport = FakeTransport::default()
            .respond("get_prop", json!({"co2": 700, "humidity": 40.0, "pm25": 3,
                                        "temperature": 20.5, "battery_state": "charging",
                                        "tvoc": 120}));
        let integration =
            MonitorIntegration::new(config(Some("cgllc.airmonitor.s1")), transport.clone());
        let registry = registry();

        integration.setup(&registry).await.unwrap();

        let device = registry.device().unwrap();
        assert_eq!(device.unique_id, "cgllc.airmonitor.s1-192.168.1.20");
        // identity read failed; versions stay unknown
        assert_eq!(device.sw_version, None);
        assert!(registry.find_by_entity_id("sensor.office_tvoc").is_some());
        assert!(registry.find_by_entity_id("switch.office_screen").is_none());
    }

    #[tokio::test]
    async fn should_fail_not_ready_when_detection_fails() {
        let transport = FakeTransport::default();
        transport.set_offline(true);
        let integration = MonitorIntegration::new(config(None), transport);
        let registry = registry();

        let err = integration.setup(&registry).await.unwrap_err();

        assert!(matches!(err, AirmonError::Device(DeviceError::Communication(_))));
        assert!(registry.device().is_none());
    }

    #[tokio::test]
    async fn should_reject_unsupported_detected_model() {
        let transport = FakeTransport::default()
            .respond("miIO.info", json!({"model": "zhimi.airpurifier.v7", "mac": "aa"}));
        let integration = MonitorIntegration::new(config(None), transport);

        let err = integration.setup(&registry()).await.unwrap_err();

        assert!(matches!(
            err,
            AirmonError::Validation(ValidationError::UnsupportedModel(model)) if model == "zhimi.airpurifier.v7"
        ));
    }

    #[tokio::test]
    async fn should_turn_screen_off_through_service_call() {
        let transport = FakeTransport::default()
            .respond("miIO.info", lite_info())
            .respond("get_properties", lite_properties(640))
            .respond("action", json!({"code": 0}));
        let integration = MonitorIntegration::new(config(None), transport.clone());
        let registry = registry();
        integration.setup(&registry).await.unwrap();
        let screen = registry.find_by_entity_id("switch.office_screen").unwrap();

        let entity = integration
            .handle_service_call(screen.id, "turn_off", json!({}))
            .await
            .unwrap();

        assert_eq!(entity.state, EntityState::Off);
        let (method, params) = transport.requests().pop().unwrap();
        assert_eq!(method, "action");
        assert_eq!(params, json!({"did": "screen", "siid": 9, "aiid": 5, "in": [1]}));
    }

    fn s1_properties() -> serde_json::Value {
        json!({"co2": 700, "humidity": 40.0, "pm25": 3, "temperature": 20.5,
               "battery_state": "charging", "tvoc": 120})
    }

    #[tokio::test]
    async fn should_send_firmware_command_through_air_quality_entity() {
        let transport = FakeTransport::default()
            .respond("get_prop", s1_properties())
            .respond("set_time_state", json!(["ok"]))
            .respond("get_prop", s1_properties());
        let integration =
            MonitorIntegration::new(config(Some("cgllc.airmonitor.s1")), transport.clone());
        let registry = registry();
        integration.setup(&registry).await.unwrap();
        let air_quality = registry
            .list_entities()
            .into_iter()
            .find(|e| e.platform == Platform::AirQuality)
            .unwrap();

        let entity = integration
            .handle_service_call(air_quality.id, "set_display_clock", json!({"on": true}))
            .await
            .unwrap();

        assert_eq!(entity.id, air_quality.id);
        assert!(
            transport
                .requests()
                .contains(&("set_time_state".to_string(), json!(["on"])))
        );
    }

    #[tokio::test]
    async fn should_reject_firmware_command_with_invalid_body() {
        let transport = FakeTransport::default().respond("get_prop", s1_properties());
        let integration =
            MonitorIntegration::new(config(Some("cgllc.airmonitor.s1")), transport.clone());
        let registry = registry();
        integration.setup(&registry).await.unwrap();
        let air_quality = registry
            .list_entities()
            .into_iter()
            .find(|e| e.platform == Platform::AirQuality)
            .unwrap();
        let sent_during_setup = transport.requests().len();

        let err = integration
            .handle_service_call(air_quality.id, "set_night_time", json!({"begin": "22:00"}))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AirmonError::Validation(ValidationError::InvalidField("end"))
        ));
        assert_eq!(transport.requests().len(), sent_during_setup);
    }

    #[tokio::test]
    async fn should_not_offer_firmware_commands_on_miot_models() {
        let transport = FakeTransport::default()
            .respond("miIO.info", lite_info())
            .respond("get_properties", lite_properties(640));
        let integration = MonitorIntegration::new(config(None), transport);
        let registry = registry();
        integration.setup(&registry).await.unwrap();
        let air_quality = registry
            .list_entities()
            .into_iter()
            .find(|e| e.platform == Platform::AirQuality)
            .unwrap();

        let err = integration
            .handle_service_call(air_quality.id, "set_power", json!({"on": false}))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AirmonError::Validation(ValidationError::UnsupportedService { .. })
        ));
    }

    #[tokio::test]
    async fn should_return_not_found_for_foreign_entity() {
        let integration = MonitorIntegration::new(config(None), FakeTransport::default());

        let err = integration
            .handle_service_call(EntityId::new(), "update", json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, AirmonError::NotFound(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn should_stop_polling_and_clear_cache_on_teardown() {
        let transport = FakeTransport::default()
            .respond("miIO.info", lite_info())
            .respond("get_properties", lite_properties(640))
            .respond("get_properties", lite_properties(655));
        let integration = MonitorIntegration::new(config(None), transport.clone())
            .with_intervals(PollIntervals {
                air_quality: Duration::from_secs(60),
                entity: Duration::from_secs(90),
            });
        let registry = registry();
        integration.setup(&registry).await.unwrap();
        integration.start_background(registry.clone()).await.unwrap();

        tokio::time::sleep(Duration::from_secs(61)).await;
        let air_quality = registry
            .list_entities()
            .into_iter()
            .find(|e| e.platform == Platform::AirQuality)
            .unwrap();
        assert_eq!(
            air_quality.get_attribute("carbon_dioxide"),
            Some(&AttributeValue::Int(655))
        );

        integration.teardown().await.unwrap();
        assert!(integration.cache.get("192.168.1.20").is_none());
        let polls_before = transport.requests().len();
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(transport.requests().len(), polls_before);
    }
}
