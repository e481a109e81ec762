//! Wall-clock access behind a trait so ranking/blacklist expiry and
//! spawn-point intervals can be tested without real sleeps.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// A source of "now", in whole seconds since the Unix epoch.
pub trait Clock: Send + Sync {
    /// Current time, in seconds since the Unix epoch.
    fn now(&self) -> i64;
}

/// The real wall clock, backed by [`SystemTime::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

/// A clock tests can advance explicitly, used to exercise blacklist expiry
/// and ranking time windows without sleeping in real time.
#[derive(Debug)]
pub struct TestClock(AtomicI64);

impl TestClock {
    /// Creates a clock starting at the given unix-seconds value.
    #[must_use]
    pub const fn new(start: i64) -> Self {
        Self(AtomicI64::new(start))
    }

    /// Advances the clock by `secs` seconds and returns the new value.
    pub fn advance(&self, secs: i64) -> i64 {
        self.0.fetch_add(secs, Ordering::SeqCst) + secs
    }

    /// Sets the clock to an explicit value.
    pub fn set(&self, value: i64) {
        self.0.store(value, Ordering::SeqCst);
    }
}

impl Clock for TestClock {
    fn now(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}
