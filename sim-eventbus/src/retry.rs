//! Retry strategy and consistency mode for the optional remote bridge.

use std::time::Duration;

/// Header carrying the number of retry attempts a message has made.
pub const HEADER_RETRY_ATTEMPTS: &str = "x-retry-attempts";
/// Header recording the exchange a message should be republished to on its
/// first retry.
pub const HEADER_FIRST_RETRY_EXCHANGE: &str = "x-first-retry-exchange";
/// Header recording the routing key for the first retry.
pub const HEADER_FIRST_RETRY_ROUTING_KEY: &str = "x-first-retry-routing-key";
/// Header naming the dead-letter exchange a message is routed to once
/// retries are exhausted.
pub const HEADER_DEAD_LETTER_EXCHANGE: &str = "x-dead-letter-exchange";
/// Header naming the dead-letter routing key.
pub const HEADER_DEAD_LETTER_ROUTING_KEY: &str = "x-dead-letter-routing-key";

/// Suffix appended to a queue's name to form its dead-letter queue name.
pub const DEAD_LETTER_SUFFIX: &str = ".deadLetter";
/// Suffix appended to a queue's name to form its retry queue name.
pub const RETRY_SUFFIX: &str = ".retry";

/// Computes `<queue>.retry`.
#[must_use]
pub fn retry_queue_name(queue: &str) -> String {
    format!("{queue}{RETRY_SUFFIX}")
}

/// Computes `<queue>.deadLetter`.
#[must_use]
pub fn dead_letter_queue_name(queue: &str) -> String {
    format!("{queue}{DEAD_LETTER_SUFFIX}")
}

/// How a message's TTL grows across retry attempts.
#[derive(Debug, Clone, Copy)]
pub enum RetryStrategy {
    /// Every retry waits the same fixed interval.
    Constant {
        /// The fixed delay-queue TTL.
        interval: Duration,
        /// Attempts allowed before the message is dead-lettered.
        max_attempts: u32,
    },
    /// Each retry's TTL grows by `multiplier`, capped at `cap`.
    Exponential {
        /// TTL of the first retry.
        initial: Duration,
        /// Growth factor applied per attempt.
        multiplier: f64,
        /// Ceiling the computed TTL is clamped to.
        cap: Duration,
        /// Attempts allowed before the message is dead-lettered.
        max_attempts: u32,
    },
}

impl RetryStrategy {
    /// Maximum retry attempts before dead-lettering.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        match self {
            Self::Constant { max_attempts, .. } | Self::Exponential { max_attempts, .. } => {
                *max_attempts
            }
        }
    }

    /// TTL the retry queue should use for the given (0-based) attempt number.
    #[must_use]
    pub fn ttl_for_attempt(&self, attempt: u32) -> Duration {
        match *self {
            Self::Constant { interval, .. } => interval,
            Self::Exponential {
                initial,
                multiplier,
                cap,
                ..
            } => {
                let scaled = initial.as_secs_f64() * multiplier.powi(attempt as i32);
                Duration::from_secs_f64(scaled.min(cap.as_secs_f64()))
            }
        }
    }

    /// True once `attempt` has exhausted this strategy's retry budget.
    #[must_use]
    pub const fn exhausted(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts()
    }
}

/// Whether republishing to the retry queue and acking the original message
/// are wrapped in a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsistencyMode {
    /// Republish and ack happen inside a transaction. Slower, but a crash
    /// between the two steps can never duplicate or drop the message.
    Consistent,
    /// Republish first, then ack. Faster, at-least-once; the default.
    #[default]
    EventuallyConsistent,
}

#[cfg(test)]
mod tests {
    use super::{RetryStrategy, dead_letter_queue_name, retry_queue_name};
    use std::time::Duration;

    #[test]
    fn exponential_growth_caps() {
        let s = RetryStrategy::Exponential {
            initial: Duration::from_secs(1),
            multiplier: 2.0,
            cap: Duration::from_secs(10),
            max_attempts: 5,
        };
        assert_eq!(s.ttl_for_attempt(0), Duration::from_secs(1));
        assert_eq!(s.ttl_for_attempt(1), Duration::from_secs(2));
        assert_eq!(s.ttl_for_attempt(10), Duration::from_secs(10));
        assert!(!s.exhausted(4));
        assert!(s.exhausted(5));
    }

    #[test]
    fn queue_name_suffixes_match_contract() {
        assert_eq!(retry_queue_name("loot"), "loot.retry");
        assert_eq!(dead_letter_queue_name("loot"), "loot.deadLetter");
    }
}
