//! Rate-limited, strictly sequential request queue.
//!
//! Every upstream call in the process shares one API key, so calls are
//! funnelled through a single drainer task that dispatches one job at a
//! time and waits until at least `min_interval` has passed since the
//! previous dispatch. The throttle is global, not per key.
//!
//! Each caller awaits only its own task. A task that fails, panics or
//! exceeds `task_timeout` resolves its own caller with an error and the
//! drainer moves on to the next task.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::error::QueueError;
use crate::metrics;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, timeout, Instant};
use tracing::{debug, error, warn};

struct QueuedTask {
    job: BoxFuture<'static, ()>,
    enqueued_at: Instant,
}

/// Handle to the queue. Cloning shares the same drainer.
#[derive(Clone)]
pub struct RequestQueue {
    sender: mpsc::UnboundedSender<QueuedTask>,
    depth: Arc<AtomicUsize>,
    task_timeout: Duration,
}

impl RequestQueue {
    /// Create the queue and spawn its drainer on the current Tokio runtime.
    pub fn new(min_interval: Duration, task_timeout: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let depth = Arc::new(AtomicUsize::new(0));

        tokio::spawn(drain(receiver, depth.clone(), min_interval));
        debug!(
            "Request queue started (min interval {:?}, task timeout {:?})",
            min_interval, task_timeout
        );

        Self {
            sender,
            depth,
            task_timeout,
        }
    }

    /// Append `task` and wait for its own result.
    ///
    /// The task does not start until the drainer dispatches it.
    pub async fn enqueue<F, T>(&self, task: F) -> Result<T, QueueError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let limit = self.task_timeout;

        let job = async move {
            let outcome = match timeout(limit, AssertUnwindSafe(task).catch_unwind()).await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(_)) => {
                    error!("Queued task panicked; continuing with the next one");
                    Err(QueueError::Aborted)
                }
                Err(_) => {
                    warn!("Queued task exceeded {:?}; continuing with the next one", limit);
                    Err(QueueError::TimedOut(limit))
                }
            };
            // The caller may have gone away; the result is simply dropped then.
            let _ = tx.send(outcome);
        }
        .boxed();

        let depth = self.depth.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::update_queue_depth(depth);

        if self
            .sender
            .send(QueuedTask {
                job,
                enqueued_at: Instant::now(),
            })
            .is_err()
        {
            let depth = self.depth.fetch_sub(1, Ordering::SeqCst) - 1;
            metrics::update_queue_depth(depth);
            return Err(QueueError::Closed);
        }

        rx.await.unwrap_or(Err(QueueError::Aborted))
    }

    /// Number of tasks waiting to be dispatched.
    pub fn pending(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }
}

async fn drain(
    mut receiver: mpsc::UnboundedReceiver<QueuedTask>,
    depth: Arc<AtomicUsize>,
    min_interval: Duration,
) {
    let mut last_dispatch: Option<Instant> = None;

    while let Some(task) = receiver.recv().await {
        if let Some(last) = last_dispatch {
            let ready_at = last + min_interval;
            if ready_at > Instant::now() {
                sleep_until(ready_at).await;
            }
        }

        let remaining = depth.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::update_queue_depth(remaining);
        metrics::record_queue_wait(task.enqueued_at.elapsed().as_secs_f64());

        last_dispatch = Some(Instant::now());
        task.job.await;
    }

    debug!("Request queue closed; drainer stopped");
}
