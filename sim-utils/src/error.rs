//! Error severity classification and the static retry table.
//!
//! Every `thiserror` error enum in this workspace implements [`Classify`] so
//! the service layer can decide retry/backoff behavior generically instead
//! of matching on each crate's concrete error type.

use std::time::Duration;

/// Severity tier an error falls into for retry/backoff purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller fault; never retried, surfaced verbatim.
    Validation,
    /// Target aggregate cannot accept the operation right now.
    State,
    /// Referenced aggregate/entity does not exist.
    NotFound,
    /// Optimistic concurrency conflict; retryable with the `concurrency` policy.
    Concurrency,
    /// Repository/cache/remote-bridge failure; retryable per its policy.
    System,
    /// Internal invariant violation; caught at the tick/worker boundary and
    /// never surfaced to the original caller.
    Fatal,
}

/// Implemented by every error enum so generic retry logic can classify an
/// error without downcasting.
pub trait Classify {
    /// Severity tier of this error value.
    fn severity(&self) -> Severity;

    /// Shorthand for `severity() != Validation && severity() != NotFound && severity() != Fatal`.
    fn is_retryable(&self) -> bool {
        matches!(
            self.severity(),
            Severity::Concurrency | Severity::System
        )
    }
}

/// One row of the static retry/backoff table.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts.
    pub max_retries: u32,
    /// Multiplier applied to the delay after each attempt.
    pub backoff_multiplier: f64,
    /// Initial delay before the first retry.
    pub initial_delay: Duration,
    /// Ceiling the computed delay is clamped to.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Delay before the `attempt`-th retry (0-based), clamped to `max_delay`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let scaled = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_secs_f64(scaled.min(self.max_delay.as_secs_f64()))
    }
}

/// `system`/`database` errors: 5 retries, 2x backoff, capped at 30s.
pub const SYSTEM_RETRY: RetryPolicy = RetryPolicy {
    max_retries: 5,
    backoff_multiplier: 2.0,
    initial_delay: Duration::from_millis(500),
    max_delay: Duration::from_secs(30),
};

/// `cache` errors: 3 retries, 1.5x backoff, capped at 5s.
pub const CACHE_RETRY: RetryPolicy = RetryPolicy {
    max_retries: 3,
    backoff_multiplier: 1.5,
    initial_delay: Duration::from_millis(200),
    max_delay: Duration::from_secs(5),
};

/// `concurrency` errors: 10 retries, 1.2x backoff, capped at 2s.
pub const CONCURRENCY_RETRY: RetryPolicy = RetryPolicy {
    max_retries: 10,
    backoff_multiplier: 1.2,
    initial_delay: Duration::from_millis(50),
    max_delay: Duration::from_secs(2),
};

/// `rate-limit` errors: a single retry after a minute.
pub const RATE_LIMIT_RETRY: RetryPolicy = RetryPolicy {
    max_retries: 1,
    backoff_multiplier: 1.0,
    initial_delay: Duration::from_secs(60),
    max_delay: Duration::from_secs(60),
};

#[cfg(test)]
mod tests {
    use super::{SYSTEM_RETRY, RATE_LIMIT_RETRY};

    #[test]
    fn system_backoff_doubles_then_caps() {
        assert_eq!(SYSTEM_RETRY.delay_for(0).as_millis(), 500);
        assert_eq!(SYSTEM_RETRY.delay_for(1).as_millis(), 1000);
        assert_eq!(SYSTEM_RETRY.delay_for(10).as_secs(), 30);
    }

    #[test]
    fn rate_limit_is_a_single_long_wait() {
        assert_eq!(RATE_LIMIT_RETRY.max_retries, 1);
        assert_eq!(RATE_LIMIT_RETRY.delay_for(0).as_secs(), 60);
    }
}
