//! Shared application state for axum handlers.

use std::sync::Arc;

use airmon_app::event_bus::InProcessEventBus;
use airmon_app::ports::Integration;
use airmon_app::services::registry::EntityRegistry;

/// State shared by every handler.
///
/// Generic over the integration to avoid dynamic dispatch. `Clone` is
/// implemented manually so `I` does not need to be `Clone`.
pub struct AppState<I> {
    /// Snapshots of the device and its entities.
    pub registry: EntityRegistry<InProcessEventBus>,
    /// Receives service calls.
    pub integration: Arc<I>,
    /// Source of the SSE stream.
    pub event_bus: InProcessEventBus,
}

impl<I> Clone for AppState<I> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            integration: Arc::clone(&self.integration),
            event_bus: self.event_bus.clone(),
        }
    }
}

impl<I: Integration + 'static> AppState<I> {
    pub fn new(
        registry: EntityRegistry<InProcessEventBus>,
        integration: Arc<I>,
        event_bus: InProcessEventBus,
    ) -> Self {
        Self {
            registry,
            integration,
            event_bus,
        }
    }
}
