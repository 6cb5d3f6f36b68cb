use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::error::{PropagationError, QueueError};
use super::types::{PropagationJob, RetryPolicy};

/// Accepts propagation jobs for asynchronous, at-least-once execution.
///
/// `submit` must not wait for the job to run.
pub trait JobQueue: Send + Sync {
    fn submit(&self, job: PropagationJob) -> Result<(), QueueError>;
}

/// Executes one job attempt.
#[async_trait]
pub trait JobHandler: Send + Sync + 'static {
    async fn handle(&self, job: &PropagationJob) -> Result<(), PropagationError>;
}

type SharedReceiver = Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<PropagationJob>>>;

/// In-process queue: an unbounded channel drained by a fixed worker pool.
///
/// Retryable failures are retried by the same worker after
/// [`RetryPolicy::backoff_for`], up to `max_attempts`.
pub struct TokioJobQueue {
    sender: Mutex<Option<mpsc::UnboundedSender<PropagationJob>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl TokioJobQueue {
    /// Spawns `workers` tasks on the current runtime.
    pub fn spawn(handler: Arc<dyn JobHandler>, workers: usize, policy: RetryPolicy) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let rx: SharedReceiver = Arc::new(tokio::sync::Mutex::new(rx));

        let handles = (0..workers.max(1))
            .map(|worker_id| {
                let rx = Arc::clone(&rx);
                let handler = Arc::clone(&handler);
                let policy = policy.clone();
                tokio::spawn(async move {
                    worker_loop(worker_id, rx, handler, policy).await;
                })
            })
            .collect::<Vec<_>>();

        info!(workers = handles.len(), "Propagation workers started");

        Self {
            sender: Mutex::new(Some(tx)),
            workers: Mutex::new(handles),
        }
    }

    /// Stops accepting jobs and waits for queued ones (retries included) to finish.
    pub async fn shutdown(&self) {
        drop(self.sender.lock().take());
        let handles = std::mem::take(&mut *self.workers.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Propagation worker panicked");
            }
        }
        info!("Propagation workers stopped");
    }
}

impl JobQueue for TokioJobQueue {
    fn submit(&self, job: PropagationJob) -> Result<(), QueueError> {
        let guard = self.sender.lock();
        let sender = guard.as_ref().ok_or(QueueError::Closed)?;
        debug!(job_id = %job.id, company = %job.company_id, "Propagation job queued");
        sender.send(job).map_err(|_| QueueError::Closed)
    }
}

async fn worker_loop(
    worker_id: usize,
    rx: SharedReceiver,
    handler: Arc<dyn JobHandler>,
    policy: RetryPolicy,
) {
    loop {
        let next = rx.lock().await.recv().await;
        let Some(job) = next else {
            debug!(worker_id, "Propagation queue closed");
            break;
        };
        run_with_retry(worker_id, job, handler.as_ref(), &policy).await;
    }
}

async fn run_with_retry(
    worker_id: usize,
    mut job: PropagationJob,
    handler: &dyn JobHandler,
    policy: &RetryPolicy,
) {
    loop {
        job.attempt += 1;
        match handler.handle(&job).await {
            Ok(()) => {
                debug!(worker_id, job_id = %job.id, attempt = job.attempt, "Propagation job done");
                return;
            }
            Err(e) if e.is_retryable() && job.attempt < policy.max_attempts => {
                let delay = policy.backoff_for(job.attempt);
                warn!(
                    worker_id,
                    job_id = %job.id,
                    company = %job.company_id,
                    attempt = job.attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Propagation attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                error!(
                    worker_id,
                    job_id = %job.id,
                    company = %job.company_id,
                    attempt = job.attempt,
                    error = %e,
                    "Propagation job abandoned"
                );
                return;
            }
        }
    }
}
