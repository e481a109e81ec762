//! A reference [`Broadcaster`] that logs instead of reaching a transport.
//!
//! The real broadcaster belongs to the network layer this core excludes
//!; this implementation exists so `SimApp` has something non-blocking
//! to inject into every loaded scene.

use sim_core::interfaces::Broadcaster;
use sim_utils::EntityId;
use tracing::trace;

/// Logs every broadcast at `trace` level instead of delivering it.
#[derive(Default)]
pub struct LoggingBroadcaster;

impl Broadcaster for LoggingBroadcaster {
    fn broadcast(&self, recipients: &[EntityId], topic: &str, payload: &[u8]) {
        trace!(recipient_count = recipients.len(), topic, payload_len = payload.len(), "broadcast");
    }
}
