//! The clock / tick driver: invokes every registered [`Updatable`] at
//! a fixed interval, isolating one updater's panic from the rest.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sim_utils::time::{Clock, SystemClock};
use sim_utils::SyncMutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

/// Something the tick driver can advance once per tick.
///
/// `update` must not block: long-running work belongs in the async task
/// pool, enqueued from inside this call.
pub trait Updatable: Send + Sync {
    /// Advances this updatable's state by `dt` wall-clock seconds. `now` is
    /// the Unix-seconds timestamp of this tick.
    fn update(&self, dt: f64, now: i64);
}

/// Default tick interval: 50ms, ~20 ticks per second.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

struct Registration {
    id: String,
    updatable: Arc<dyn Updatable>,
}

/// Fixed-rate scheduler driving every registered [`Updatable`].
///
/// `Register`/`Unregister` are last-write-wins for a given id. The
/// registration table sits behind a plain mutex, snapshotted at the start
/// of each tick so user code never runs while the lock is held.
pub struct TickDriver {
    interval: Duration,
    clock: Arc<dyn Clock>,
    registrations: SyncMutex<Vec<Registration>>,
    cancel: CancellationToken,
    handle: SyncMutex<Option<JoinHandle<()>>>,
}

impl TickDriver {
    /// Creates a driver at the given tick interval, backed by the real
    /// wall clock, not yet started.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self::with_clock(interval, Arc::new(SystemClock))
    }

    /// Creates a driver backed by an explicit clock, for deterministic
    /// tests.
    #[must_use]
    pub fn with_clock(interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            interval,
            clock,
            registrations: SyncMutex::new(Vec::new()),
            cancel: CancellationToken::new(),
            handle: SyncMutex::new(None),
        }
    }

    /// Registers `updatable` under `id`, replacing any prior registration
    /// with the same id.
    pub fn register(&self, id: impl Into<String>, updatable: Arc<dyn Updatable>) {
        let id = id.into();
        let mut table = self.registrations.lock();
        table.retain(|r| r.id != id);
        table.push(Registration { id, updatable });
    }

    /// Removes a registration by id. No-op if absent.
    pub fn unregister(&self, id: &str) {
        self.registrations.lock().retain(|r| r.id != id);
    }

    /// Starts the scheduling loop. Idempotent: a second call while already
    /// running is a no-op.
    pub fn start(self: &Arc<Self>) {
        if self.handle.lock().is_some() {
            return;
        }
        let driver = Arc::clone(self);
        let handle = tokio::spawn(async move { driver.run().await });
        *self.handle.lock() = Some(handle);
    }

    async fn run(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Burst);
        let mut last = Instant::now();

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let now_instant = Instant::now();
            let dt = now_instant.duration_since(last).as_secs_f64();
            last = now_instant;
            let now = self.clock.now();

            let snapshot: Vec<Arc<dyn Updatable>> = {
                let table = self.registrations.lock();
                table.iter().map(|r| Arc::clone(&r.updatable)).collect()
            };

            for updatable in snapshot {
                let result = std::panic::catch_unwind(AssertUnwindSafe(|| updatable.update(dt, now)));
                if let Err(panic) = result {
                    let message = panic_message(&panic);
                    error!(error = %message, "updatable panicked during tick; isolated");
                } else {
                    continue;
                }
            }
        }
        warn!("tick driver loop exited");
    }

    /// Cancels the scheduler and blocks until the loop has exited.
    pub async fn stop(&self) {
        self.cancel.cancel();
        let handle = self.handle.lock().take();
        if let Some(handle) = handle
            && let Err(err) = handle.await
        {
            error!(error = %err, "tick driver task join failed");
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::{TickDriver, Updatable};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingUpdatable(Arc<AtomicUsize>);

    impl Updatable for CountingUpdatable {
        fn update(&self, _dt: f64, _now: i64) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct PanickingUpdatable;

    impl Updatable for PanickingUpdatable {
        fn update(&self, _dt: f64, _now: i64) {
            panic!("boom");
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn panicking_updatable_does_not_stop_other_registrations() {
        let driver = Arc::new(TickDriver::new(Duration::from_millis(10)));
        let counter = Arc::new(AtomicUsize::new(0));
        driver.register("counting", Arc::new(CountingUpdatable(counter.clone())));
        driver.register("panicking", Arc::new(PanickingUpdatable));

        driver.start();
        tokio::time::sleep(Duration::from_millis(150)).await;
        driver.stop().await;

        assert!(counter.load(Ordering::SeqCst) >= 10);
    }

    #[tokio::test]
    async fn unregister_stops_further_invocations() {
        let driver = Arc::new(TickDriver::new(Duration::from_millis(10)));
        let counter = Arc::new(AtomicUsize::new(0));
        driver.register("counting", Arc::new(CountingUpdatable(counter.clone())));
        driver.unregister("counting");

        driver.start();
        tokio::time::sleep(Duration::from_millis(60)).await;
        driver.stop().await;

        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
