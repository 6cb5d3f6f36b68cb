//! Cross-cutting, shared constants.
//!
//! The blend weights are fixed properties of the scoring model, not runtime
//! configuration. Changing them changes every persisted recommendation list.

/// Weight applied to cosine similarity of the profile embeddings.
pub const SIMILARITY_WEIGHT: f32 = 0.4;
/// Weight applied to the business keyword overlap ratio.
pub const KEYWORD_WEIGHT: f32 = 0.3;
/// Added when both sides carry `gives` data.
pub const GIVES_BONUS: f32 = 0.1;
/// Added when both sides carry `top10Customers` data.
pub const TOP10_BONUS: f32 = 0.1;

/// Highest score [`crate::scoring::hybrid_score`] can produce.
pub const MAX_SCORE: f32 = SIMILARITY_WEIGHT + KEYWORD_WEIGHT + GIVES_BONUS + TOP10_BONUS;

/// Truncation size shared by the query path and propagation.
pub const DEFAULT_TOP_K: usize = 5;

/// Output dimension of all-MiniLM-L6-v2.
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

pub const DEFAULT_MAX_SEQ_LEN: usize = 256;

/// Memoised embeddings for records stored without a vector.
pub const DEFAULT_EMBEDDING_CACHE_CAPACITY: u64 = 10_000;

/// Candidates whose embeddings are resolved concurrently inside one `rank` call.
pub const DEFAULT_EMBED_CONCURRENCY: usize = 8;

pub const DEFAULT_PROPAGATION_WORKERS: usize = 2;
pub const DEFAULT_PROPAGATION_MAX_ATTEMPTS: u32 = 3;
/// Records re-ranked concurrently inside one propagation run.
pub const DEFAULT_PROPAGATION_CONCURRENCY: usize = 4;
pub const PROPAGATION_BASE_BACKOFF_MS: u64 = 500;
pub const PROPAGATION_MAX_BACKOFF_MS: u64 = 30_000;

/// Snapshot filename written under the storage directory.
pub const DEFAULT_SNAPSHOT_FILENAME: &str = "companies.json";

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// Use this at module boundaries to catch mismatches before they reach the scorer.
pub fn validate_embedding_dim(expected: usize, actual: usize) -> Result<(), DimValidationError> {
    if expected == 0 {
        return Err(DimValidationError::ZeroDimension);
    }
    if expected != actual {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

/// Error returned when dimension validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimValidationError {
    /// Embedding dimension cannot be zero.
    ZeroDimension,
    /// Runtime dimension does not match expected dimension.
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for DimValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "embedding dimension cannot be zero"),
            Self::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DimValidationError {}
