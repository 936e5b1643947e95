//! Event: an immutable record of something that happened.
//!
//! Events are produced when entities are registered, when their state or
//! availability changes, and when a service is called on them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::{EntityId, EventId};
use crate::time::{Timestamp, now};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    EntityCreated,
    StateChanged,
    AvailabilityChanged,
    ServiceCalled,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::EntityCreated => "entity_created",
            Self::StateChanged => "state_changed",
            Self::AvailabilityChanged => "availability_changed",
            Self::ServiceCalled => "service_called",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    /// Entity the event is about, if any.
    pub entity_id: Option<EntityId>,
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl Event {
    /// Create an event stamped with a fresh id and the current time.
    #[must_use]
    pub fn new(
        event_type: EventType,
        entity_id: Option<EntityId>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            entity_id,
            data,
            timestamp: now(),
        }
    }
}
