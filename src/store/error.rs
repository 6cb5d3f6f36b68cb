use std::path::PathBuf;

use thiserror::Error;

/// Errors from record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not serve the request right now.
    #[error("record store unavailable: {reason}")]
    Unavailable { reason: String },

    /// Reading or writing the on-disk snapshot failed.
    #[error("snapshot error at {path}: {reason}")]
    Snapshot { path: PathBuf, reason: String },

    /// Snapshot contents are not a valid record list.
    #[error("invalid snapshot contents: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Transient failures worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }
}
