//! Event bus port: publish/subscribe for domain events.

use std::future::Future;

use airmon_domain::error::AirmonError;
use airmon_domain::event::Event;

/// Publishes domain events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), AirmonError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), AirmonError>> + Send {
        (**self).publish(event)
    }
}
