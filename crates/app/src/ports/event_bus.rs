//! Event bus port: publish/subscribe for control-loop events.

use std::future::Future;

use localhome_domain::error::HomeError;
use localhome_domain::event::Event;

/// Publishes control-loop events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), HomeError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), HomeError>> + Send {
        (**self).publish(event)
    }
}
