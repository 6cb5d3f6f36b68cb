use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::ranking::RankingError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// A required input is absent or blank.
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("ranking error: {0}")]
    Ranking(#[from] RankingError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// `true` for caller mistakes, as opposed to backend failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::MissingField { .. })
    }

    /// Transient backend failures worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::MissingField { .. } => false,
            ServiceError::Embedding(e) => e.is_retryable(),
            ServiceError::Ranking(e) => e.is_retryable(),
            ServiceError::Store(e) => e.is_retryable(),
        }
    }
}
