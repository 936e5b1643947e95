//! In-process event bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use airmon_domain::error::AirmonError;
use airmon_domain::event::Event;

use crate::ports::EventPublisher;

/// Channel capacity used by [`InProcessEventBus::default`].
pub const DEFAULT_CAPACITY: usize = 256;

/// In-process event bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when nobody is listening; the event is dropped.
/// Clones share the same channel.
#[derive(Clone)]
pub struct InProcessEventBus {
    sender: broadcast::Sender<Event>,
}

impl Default for InProcessEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl InProcessEventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), AirmonError>> + Send {
        if self.sender.send(event).is_err() {
            tracing::trace!("event dropped, no subscriber");
        }
        async { Ok(()) }
    }
}
