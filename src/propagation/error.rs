use thiserror::Error;

use crate::ranking::RankingError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum PropagationError {
    /// The company that triggered the job is no longer stored.
    #[error("record not found: {identifier}")]
    RecordNotFound { identifier: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("ranking error: {0}")]
    Ranking(#[from] RankingError),

    /// Some records could not be refreshed; the rest were.
    #[error("propagation for {company_id} left {} of {total} records stale", failed.len())]
    Incomplete {
        company_id: String,
        failed: Vec<String>,
        total: usize,
    },
}

impl PropagationError {
    /// Transient failures worth retrying.
    ///
    /// A partial run is always retryable: refreshing a record twice is harmless.
    pub fn is_retryable(&self) -> bool {
        match self {
            PropagationError::RecordNotFound { .. } => false,
            PropagationError::Store(e) => e.is_retryable(),
            PropagationError::Ranking(e) => e.is_retryable(),
            PropagationError::Incomplete { .. } => true,
        }
    }
}

/// Returned by [`JobQueue::submit`](super::JobQueue::submit).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("job queue is closed")]
    Closed,
}
