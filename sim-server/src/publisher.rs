//! Adapts [`sim_eventbus::EventBus`] to the [`EventPublisher`] port the
//! scene service depends on.

use async_trait::async_trait;
use sim_core::interfaces::EventPublisher;
use sim_eventbus::{DomainEvent, EventBus, PublishError};
use tokio_util::sync::CancellationToken;

/// Publishes through a shared [`EventBus`], never cancelling — the scene
/// service drains events after mutations have already committed, so there
/// is nothing left to roll back.
pub struct BusEventPublisher {
    bus: std::sync::Arc<EventBus>,
}

impl BusEventPublisher {
    /// Wraps `bus` as an [`EventPublisher`].
    #[must_use]
    pub const fn new(bus: std::sync::Arc<EventBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl EventPublisher for BusEventPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), PublishError> {
        self.bus.publish(&CancellationToken::new(), event.clone()).await
    }
}
