//! Queue double that records submissions without running them.

use parking_lot::Mutex;

use super::error::QueueError;
use super::queue::JobQueue;
use super::types::PropagationJob;

#[derive(Default)]
pub struct RecordingJobQueue {
    jobs: Mutex<Vec<PropagationJob>>,
    closed: Mutex<bool>,
}

impl RecordingJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later submissions fail with [`QueueError::Closed`].
    pub fn close(&self) {
        *self.closed.lock() = true;
    }

    pub fn jobs(&self) -> Vec<PropagationJob> {
        self.jobs.lock().clone()
    }

    pub fn company_ids(&self) -> Vec<String> {
        self.jobs
            .lock()
            .iter()
            .map(|job| job.company_id.clone())
            .collect()
    }
}

impl JobQueue for RecordingJobQueue {
    fn submit(&self, job: PropagationJob) -> Result<(), QueueError> {
        if *self.closed.lock() {
            return Err(QueueError::Closed);
        }
        self.jobs.lock().push(job);
        Ok(())
    }
}
