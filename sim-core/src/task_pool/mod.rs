//! The async task pool / `SpawnManager`: absorbs fire-and-forget
//! work (respawn, reward distribution, delayed broadcasts) that must not
//! block the tick loop.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

/// Default worker count.
pub const DEFAULT_WORKER_COUNT: usize = 2;
/// Default bounded queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;
/// Grace period `stop` waits for in-flight tasks before returning.
pub const STOP_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// A deferred unit of work. Must tolerate running with no ordering
/// guarantee relative to any other task.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Bounded worker pool draining a single MPSC queue.
///
/// `enqueue` never blocks: a full queue drops the task with a warning
/// rather than stalling the caller, trading completeness for tick latency.
pub struct TaskPool {
    sender: mpsc::Sender<Task>,
    cancel: CancellationToken,
    workers: parking_lot::Mutex<Vec<JoinHandle<()>>>,
}

impl TaskPool {
    /// Spawns `worker_count` worker tasks draining a queue of
    /// `queue_capacity` slots.
    #[must_use]
    pub fn start(worker_count: usize, queue_capacity: usize) -> Arc<Self> {
        let (sender, receiver) = mpsc::channel(queue_capacity);
        let cancel = CancellationToken::new();
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));

        let mut workers = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let receiver = Arc::clone(&receiver);
            let cancel = cancel.clone();
            workers.push(tokio::spawn(async move {
                worker_loop(worker_id, receiver, cancel).await;
            }));
        }

        Arc::new(Self {
            sender,
            cancel,
            workers: parking_lot::Mutex::new(workers),
        })
    }

    /// Creates a pool with the default worker count and queue capacity.
    #[must_use]
    pub fn start_default() -> Arc<Self> {
        Self::start(DEFAULT_WORKER_COUNT, DEFAULT_QUEUE_CAPACITY)
    }

    /// Enqueues `task`. Non-blocking; drops the task with a logged warning
    /// if the queue is full.
    pub fn enqueue(&self, task: Task) {
        if let Err(err) = self.sender.try_send(task) {
            match err {
                mpsc::error::TrySendError::Full(_) => {
                    warn!("task pool queue full, dropping task");
                }
                mpsc::error::TrySendError::Closed(_) => {
                    warn!("task pool is stopped, dropping task");
                }
            }
        }
    }

    /// Cancels the worker loops, stops accepting new work, and waits up to
    /// [`STOP_GRACE_PERIOD`] for in-flight tasks before returning.
    pub async fn stop(&self) {
        self.cancel.cancel();
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut self.workers.lock());
        let joined = futures::future::join_all(handles);
        if tokio::time::timeout(STOP_GRACE_PERIOD, joined).await.is_err() {
            warn!("task pool workers did not exit within the grace period");
        }
    }
}

async fn worker_loop(worker_id: usize, receiver: Arc<tokio::sync::Mutex<mpsc::Receiver<Task>>>, cancel: CancellationToken) {
    loop {
        let task = {
            let mut guard = receiver.lock().await;
            tokio::select! {
                () = cancel.cancelled() => None,
                task = guard.recv() => task,
            }
        };

        let Some(task) = task else {
            break;
        };

        if let Err(panic) = std::panic::catch_unwind(AssertUnwindSafe(task)) {
            let message = panic_message(&panic);
            error!(worker_id, error = %message, "task pool worker panicked; isolated");
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
    use super::TaskPool;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn enqueued_tasks_run() {
        let pool = TaskPool::start(2, 16);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..10 {
            let counter = counter.clone();
            pool.enqueue(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        pool.stop().await;
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn panicking_task_does_not_stop_the_worker() {
        let pool = TaskPool::start(1, 16);
        let counter = Arc::new(AtomicUsize::new(0));
        pool.enqueue(Box::new(|| panic!("boom")));
        let counter2 = counter.clone();
        pool.enqueue(Box::new(move || {
            counter2.fetch_add(1, Ordering::SeqCst);
        }));
        tokio::time::sleep(Duration::from_millis(50)).await;
        pool.stop().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn full_queue_drops_instead_of_blocking() {
        let pool = TaskPool::start(0, 1);
        pool.enqueue(Box::new(|| {}));
        pool.enqueue(Box::new(|| {}));
        pool.stop().await;
    }
}
