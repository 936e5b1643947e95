//! In-memory registry of the monitor's device and entity snapshots.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use airmon_domain::device::Device;
use airmon_domain::entity::Entity;
use airmon_domain::error::{AirmonError, NotFoundError};
use airmon_domain::event::{Event, EventType};
use airmon_domain::id::EntityId;

use crate::ports::{EventPublisher, IntegrationContext};

#[derive(Debug, Default)]
struct RegistryState {
    device: Option<Device>,
    entities: HashMap<EntityId, Entity>,
}

/// [`IntegrationContext`] that keeps the latest snapshot of everything the
/// integration registered and publishes a domain event for every visible
/// change.
///
/// Cheaply cloneable; clones share the same state.
pub struct EntityRegistry<EP> {
    state: Arc<RwLock<RegistryState>>,
    event_publisher: EP,
}

impl<EP: Clone> Clone for EntityRegistry<EP> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            event_publisher: self.event_publisher.clone(),
        }
    }
}

impl<EP> EntityRegistry<EP> {
    /// Create an empty registry publishing through `event_publisher`.
    pub fn new(event_publisher: EP) -> Self {
        Self {
            state: Arc::default(),
            event_publisher,
        }
    }

    /// The registered device, if setup got that far.
    #[must_use]
    pub fn device(&self) -> Option<Device> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .device
            .clone()
    }

    /// All entities, ordered by textual entity id.
    #[must_use]
    pub fn list_entities(&self) -> Vec<Entity> {
        let mut entities: Vec<Entity> = self
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entities
            .values()
            .cloned()
            .collect();
        entities.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        entities
    }

    /// Look up an entity by id.
    ///
    /// # Errors
    ///
    /// Returns [`AirmonError::NotFound`] when no entity with `id` exists.
    pub fn get_entity(&self, id: EntityId) -> Result<Entity, AirmonError> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entities
            .get(&id)
            .cloned()
            .ok_or_else(|| {
                NotFoundError {
                    entity: "Entity",
                    id: id.to_string(),
                }
                .into()
            })
    }

    /// Look up an entity by its textual id (`sensor.office_co2`).
    #[must_use]
    pub fn find_by_entity_id(&self, entity_id: &str) -> Option<Entity> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entities
            .values()
            .find(|e| e.entity_id == entity_id)
            .cloned()
    }

    /// Store `entity`, returning the events its arrival produces.
    fn record(&self, entity: &mut Entity) -> Vec<Event> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let events = match state.entities.get(&entity.id) {
            None => vec![Event::new(
                EventType::EntityCreated,
                Some(entity.id),
                serde_json::json!({
                    "entity_id": entity.entity_id,
                    "state": entity.state,
                }),
            )],
            Some(previous) => {
                if previous.state == entity.state {
                    entity.last_changed = previous.last_changed;
                }
                let mut events = Vec::new();
                if previous.state.is_available() != entity.state.is_available() {
                    events.push(Event::new(
                        EventType::AvailabilityChanged,
                        Some(entity.id),
                        serde_json::json!({
                            "entity_id": entity.entity_id,
                            "available": entity.state.is_available(),
                        }),
                    ));
                }
                if previous.differs_from(entity) {
                    events.push(Event::new(
                        EventType::StateChanged,
                        Some(entity.id),
                        serde_json::json!({
                            "entity_id": entity.entity_id,
                            "from": previous.state,
                            "to": entity.state,
                            "attributes": entity.attributes,
                        }),
                    ));
                }
                events
            }
        };
        state.entities.insert(entity.id, entity.clone());
        events
    }
}

impl<EP> IntegrationContext for EntityRegistry<EP>
where
    EP: EventPublisher + Send + Sync + 'static,
{
    async fn upsert_device(&self, device: Device) -> Result<Device, AirmonError> {
        device.validate()?;
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .device = Some(device.clone());
        tracing::info!(device = %device.name, model = ?device.model, "device registered");
        Ok(device)
    }

    async fn upsert_entity(&self, mut entity: Entity) -> Result<Entity, AirmonError> {
        entity.validate()?;
        let events = self.record(&mut entity);
        for event in events {
            self.event_publisher.publish(event).await?;
        }
        Ok(entity)
    }

    async fn publish(&self, event: Event) -> Result<(), AirmonError> {
        self.event_publisher.publish(event).await
    }
}
