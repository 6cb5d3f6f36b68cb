use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::scoring::ScoringError;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("scoring error: {0}")]
    Scoring(#[from] ScoringError),
}

impl RankingError {
    /// Transient failures worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            RankingError::Embedding(e) => e.is_retryable(),
            RankingError::Scoring(_) => false,
        }
    }
}
