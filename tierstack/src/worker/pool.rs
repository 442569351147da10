use crate::core::error::{CacheError, Result};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Notify, mpsc};
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

/// Unit of background work
pub type Task = BoxFuture<'static, Result<()>>;

/// Default number of workers
pub const DEFAULT_WORKERS: usize = 4;

/// Counters shared between the pool handle and its workers
#[derive(Debug, Default)]
struct PoolState {
    /// Tasks queued or executing
    pending: AtomicUsize,
    /// Signalled when `pending` drops to zero
    idle: Notify,
}

impl PoolState {
    fn finish(&self) {
        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// Bounded worker pool with an explicit running/stopped lifecycle
///
/// A fixed number of workers pull tasks from one FIFO queue. After
/// `shutdown` no task is accepted; tasks already queued still drain.
pub struct WorkerPool {
    sender: Mutex<Option<mpsc::UnboundedSender<Task>>>,
    state: Arc<PoolState>,
    width: usize,
}

impl WorkerPool {
    /// Start `width` workers on the current tokio runtime
    pub fn new(width: usize) -> Result<Self> {
        if width == 0 {
            return Err(CacheError::InvalidConfig(
                "worker pool needs at least one worker".to_string(),
            ));
        }

        let runtime = Handle::try_current().map_err(|e| CacheError::Runtime(e.to_string()))?;

        let (sender, receiver) = mpsc::unbounded_channel::<Task>();
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));
        let state = Arc::new(PoolState::default());

        for id in 0..width {
            runtime.spawn(Self::worker_loop(
                id,
                Arc::clone(&receiver),
                Arc::clone(&state),
            ));
        }

        info!("Worker pool started with {} workers", width);

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            state,
            width,
        })
    }

    /// Queue a task for background execution
    pub fn submit(&self, task: Task) -> Result<()> {
        let guard = self.sender.lock();
        let Some(sender) = guard.as_ref() else {
            warn!("Task rejected: worker pool stopped");
            return Err(CacheError::PoolStopped);
        };

        self.state.pending.fetch_add(1, Ordering::AcqRel);
        if sender.send(task).is_err() {
            self.state.finish();
            return Err(CacheError::PoolStopped);
        }
        Ok(())
    }

    /// Stop accepting tasks; idempotent
    pub fn shutdown(&self) {
        if self.sender.lock().take().is_some() {
            info!(
                "Worker pool shut down ({} task(s) still pending)",
                self.pending()
            );
        }
    }

    pub fn is_running(&self) -> bool {
        self.sender.lock().is_some()
    }

    /// Tasks queued or executing
    pub fn pending(&self) -> usize {
        self.state.pending.load(Ordering::Acquire)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Wait until no task is queued or executing
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.state.idle.notified();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }

    async fn worker_loop(
        id: usize,
        receiver: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Task>>>,
        state: Arc<PoolState>,
    ) {
        loop {
            let task = {
                let mut rx = receiver.lock().await;
                rx.recv().await
            };
            let Some(task) = task else {
                break;
            };

            match AssertUnwindSafe(task).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(e)) if e.is_transient() => {
                    warn!(worker = id, error = %e, "Background task abandoned");
                }
                Ok(Err(e)) => {
                    error!(worker = id, error = %e, "Background task failed");
                }
                Err(panic) => {
                    let err = CacheError::TaskPanicked(panic_message(panic.as_ref()));
                    warn!(worker = id, error = %err, "Background task failed");
                }
            }
            state.finish();
        }

        debug!("Worker {} exiting", id);
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
