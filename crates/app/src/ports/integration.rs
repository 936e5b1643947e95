//! Integration port: lifecycle and service-call handling for device integrations.
//!
//! An integration bridges a monitor into the host. It registers the device
//! and its entities on startup, keeps them fresh from background poll loops
//! and handles service calls directed at entities it owns.

use std::future::Future;

use airmon_domain::device::Device;
use airmon_domain::entity::Entity;
use airmon_domain::error::AirmonError;
use airmon_domain::event::Event;
use airmon_domain::id::EntityId;

/// Context provided to integrations for registering what they expose.
///
/// This is a **port**; adapters call it to record devices and entity
/// snapshots. The application provides a concrete implementation backed by
/// the in-memory [`EntityRegistry`](crate::services::registry::EntityRegistry).
pub trait IntegrationContext: Send + Sync {
    /// Record a device (create or replace by `integration`+`unique_id`).
    fn upsert_device(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Device, AirmonError>> + Send;

    /// Record an entity snapshot (create or replace by id).
    ///
    /// Implementations publish `EntityCreated`, `StateChanged` and
    /// `AvailabilityChanged` events as appropriate.
    fn upsert_entity(
        &self,
        entity: Entity,
    ) -> impl Future<Output = Result<Entity, AirmonError>> + Send;

    /// Publish a domain event to the event bus.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), AirmonError>> + Send;

    /// Convenience: record a full [`DiscoveredDevice`] (device + all entities).
    fn persist_discovered(
        &self,
        dd: DiscoveredDevice,
    ) -> impl Future<Output = Result<(), AirmonError>> + Send {
        async move {
            self.upsert_device(dd.device).await?;
            for entity in dd.entities {
                self.upsert_entity(entity).await?;
            }
            Ok(())
        }
    }
}

/// A pluggable monitor integration.
///
/// The binary crate calls the lifecycle methods in order:
///
/// 1. [`setup`](Self::setup): resolve the model, register device and entities
/// 2. [`start_background`](Self::start_background): spawn the poll loops
/// 3. (the server runs, forwarding service calls via [`handle_service_call`](Self::handle_service_call))
/// 4. [`teardown`](Self::teardown): stop the poll loops
///
/// Every method takes `&self` so the integration can be shared behind an
/// `Arc` between the lifecycle owner and the HTTP layer.
pub trait Integration: Send + Sync {
    /// Unique name identifying this integration (e.g. `"miio"`).
    fn name(&self) -> &'static str;

    /// Initialise and register the device and its entities via `ctx`.
    fn setup(
        &self,
        ctx: &impl IntegrationContext,
    ) -> impl Future<Output = Result<(), AirmonError>> + Send;

    /// Start long-running background work.
    ///
    /// The default implementation is a no-op.
    fn start_background(
        &self,
        _ctx: impl IntegrationContext + Clone + 'static,
    ) -> impl Future<Output = Result<(), AirmonError>> + Send {
        async { Ok(()) }
    }

    /// Handle a service call (`turn_on`, `turn_off`, `set_value`, `update`)
    /// for an entity owned by this integration.
    ///
    /// Returns the [`Entity`] snapshot after handling the call.
    fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> impl Future<Output = Result<Entity, AirmonError>> + Send;

    /// Called on graceful shutdown. Stop background tasks and drop cached state.
    fn teardown(&self) -> impl Future<Output = Result<(), AirmonError>> + Send;
}

/// A device and its associated entities discovered during integration setup.
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    pub device: Device,
    pub entities: Vec<Entity>,
}
