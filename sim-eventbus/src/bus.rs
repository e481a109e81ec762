//! The in-process fan-out bus.
//!
//! Local dispatch is synchronous in the publisher's own call: handlers that
//! want isolation submit themselves through the async task pool rather than
//! the bus doing it for them. The optional [`RemoteBridge`] is awaited after
//! every local handler has run.

use std::sync::Arc;

use async_trait::async_trait;
use sim_utils::locks::SyncRwLock;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::event::DomainEvent;

/// A local subscriber. Implementors must not block for long: the bus calls
/// this synchronously in the publisher's thread.
pub trait Handler: Send + Sync {
    /// Handles one event. Errors are logged and do not stop the remaining
    /// handlers for this publish.
    fn handle(&self, event: &DomainEvent) -> Result<(), HandlerError>;
}

/// Error returned by a local [`Handler`].
#[derive(Debug, Error)]
#[error("handler failed: {0}")]
pub struct HandlerError(pub String);

/// Error surfaced by [`EventBus::publish`] when the remote bridge rejects a
/// publish. Local handler failures never reach this type — they are logged
/// and swallowed.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The caller's context/cancellation token was cancelled before the
    /// bridge publish completed.
    #[error("publish cancelled")]
    Cancelled,
    /// The configured remote bridge rejected or failed to deliver the event.
    #[error("remote bridge publish failed: {0}")]
    Bridge(String),
}

/// An optional remote message-broker bridge. `sim-eventbus`'s `amqp` module
/// provides a `lapin`-backed implementation behind the `remote-bridge`
/// feature; tests use an in-memory fake.
#[async_trait]
pub trait RemoteBridge: Send + Sync {
    /// Serializes and publishes `event` to the bridge.
    async fn publish(&self, event: &DomainEvent) -> Result<(), PublishError>;

    /// Disconnects the bridge. Idempotent.
    async fn close(&self);
}

/// Process-local fan-out plus an optional remote bridge.
pub struct EventBus {
    subscribers: SyncRwLock<rustc_hash_map::TopicMap>,
    bridge: Option<Arc<dyn RemoteBridge>>,
}

/// A tiny internal module so the topic map's type doesn't leak a dependency
/// on a particular hash-map crate into the public API.
mod rustc_hash_map {
    use std::collections::HashMap;

    use super::Handler;
    use std::sync::Arc;

    pub type TopicMap = HashMap<String, Vec<Arc<dyn Handler>>>;
}

impl EventBus {
    /// Creates a bus with no subscribers and no remote bridge.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: SyncRwLock::new(std::collections::HashMap::new()),
            bridge: None,
        }
    }

    /// Creates a bus backed by the given remote bridge.
    #[must_use]
    pub fn with_bridge(bridge: Arc<dyn RemoteBridge>) -> Self {
        Self {
            subscribers: SyncRwLock::new(std::collections::HashMap::new()),
            bridge: Some(bridge),
        }
    }

    /// Subscribes `handler` to `topic`.
    pub fn subscribe(&self, topic: impl Into<String>, handler: Arc<dyn Handler>) {
        self.subscribers
            .write()
            .entry(topic.into())
            .or_default()
            .push(handler);
    }

    /// Removes a previously subscribed handler from `topic`, comparing by
    /// `Arc` pointer identity.
    pub fn unsubscribe(&self, topic: &str, handler: &Arc<dyn Handler>) {
        if let Some(handlers) = self.subscribers.write().get_mut(topic) {
            handlers.retain(|h| !Arc::ptr_eq(h, handler));
        }
    }

    /// Invokes every handler subscribed to `event`'s topic, then forwards to
    /// the remote bridge if one is configured.
    ///
    /// Handler errors are logged and do not abort remaining handlers or the
    /// bridge forward. Only a bridge failure (or cancellation) surfaces to
    /// the caller.
    pub async fn publish(
        &self,
        cancel: &CancellationToken,
        event: DomainEvent,
    ) -> Result<(), PublishError> {
        if cancel.is_cancelled() {
            return Err(PublishError::Cancelled);
        }

        let handlers = {
            let guard = self.subscribers.read();
            guard.get(event.topic()).cloned().unwrap_or_default()
        };

        for handler in &handlers {
            if let Err(err) = handler.handle(&event) {
                warn!(topic = event.topic(), error = %err, "event handler failed");
            }
        }

        if let Some(bridge) = &self.bridge {
            tokio::select! {
                () = cancel.cancelled() => return Err(PublishError::Cancelled),
                result = bridge.publish(&event) => {
                    if let Err(err) = &result {
                        error!(topic = event.topic(), error = %err, "remote bridge publish failed");
                    }
                    return result;
                }
            }
        }

        Ok(())
    }

    /// Disconnects the remote bridge, if any.
    pub async fn close(&self) {
        if let Some(bridge) = &self.bridge {
            bridge.close().await;
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{EventBus, Handler, HandlerError};
    use crate::event::{DomainEvent, EventMeta, topics};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_util::sync::CancellationToken;

    struct CountingHandler(Arc<AtomicUsize>);

    impl Handler for CountingHandler {
        fn handle(&self, _event: &DomainEvent) -> Result<(), HandlerError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingHandler;

    impl Handler for FailingHandler {
        fn handle(&self, _event: &DomainEvent) -> Result<(), HandlerError> {
            Err(HandlerError("boom".into()))
        }
    }

    fn sample_event() -> DomainEvent {
        DomainEvent::PlayerEntered {
            meta: EventMeta::new("scene-1", topics::PLAYER_ENTERED, 0, 1),
            scene_id: "scene-1".into(),
            player_id: "p1".into(),
            position: [0.0, 0.0, 0.0],
        }
    }

    #[tokio::test]
    async fn publish_invokes_all_subscribers_despite_failure() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        bus.subscribe(topics::PLAYER_ENTERED, Arc::new(FailingHandler));
        bus.subscribe(topics::PLAYER_ENTERED, Arc::new(CountingHandler(count.clone())));

        let cancel = CancellationToken::new();
        bus.publish(&cancel, sample_event()).await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unsubscribe_removes_only_that_handler() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let handler: Arc<dyn Handler> = Arc::new(CountingHandler(count.clone()));
        bus.subscribe(topics::PLAYER_ENTERED, handler.clone());
        bus.unsubscribe(topics::PLAYER_ENTERED, &handler);

        let cancel = CancellationToken::new();
        bus.publish(&cancel, sample_event()).await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits_publish() {
        let bus = EventBus::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = bus.publish(&cancel, sample_event()).await;
        assert!(matches!(result, Err(super::PublishError::Cancelled)));
    }
}
