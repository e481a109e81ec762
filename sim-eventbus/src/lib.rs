//! Process-local event fan-out plus an optional remote broker bridge.
//!
//! `sim-core` and `sim-ranking` both depend on this crate purely for the
//! [`DomainEvent`] envelope and the [`EventBus`]/[`Handler`] contract — it has
//! no knowledge of scenes or rankings itself.

/// Remote bridge gated behind the `remote-bridge` feature (requires a real
/// AMQP broker to connect to).
#[cfg(feature = "remote-bridge")]
pub mod bridge;
/// In-process fan-out bus.
pub mod bus;
/// The domain event envelope and topic constants.
pub mod event;
/// Retry strategy, consistency mode, and header/queue-naming constants.
pub mod retry;

pub use bus::{EventBus, Handler, HandlerError, PublishError, RemoteBridge};
pub use event::{DomainEvent, EventMeta, LeftRankingReason, topics};
pub use retry::{ConsistencyMode, RetryStrategy};
