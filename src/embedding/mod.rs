//! Text embedding.
//!
//! - [`TextEmbedder`] is the capability the ranking layer depends on.
//! - [`local`] runs a sentence-transformers model in process (candle).
//! - [`remote`] calls an OpenAI-compatible `/embeddings` endpoint.
//! - [`EmbeddingAccessor`] resolves a record's vector, memoising computed ones.

pub mod accessor;
/// BERT sentence encoder used by the local embedder.
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
pub mod local;
pub mod remote;
/// Tokenizer loading helpers.
pub mod utils;

#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use accessor::{EmbeddingAccessor, ResolvedEmbedding};
pub use error::EmbeddingError;
pub use local::{LocalEmbedder, LocalEmbedderConfig, deterministic_embedding};
pub use remote::{HttpEmbedder, HttpEmbedderConfig};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbedder;

use async_trait::async_trait;

/// Maps profile text to a fixed-dimension vector.
///
/// Implementations must be deterministic for a given model: equal texts yield
/// equal vectors, and every vector has length [`TextEmbedder::dimension`].
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    fn dimension(&self) -> usize;

    /// Short label for logs and the readiness probe.
    fn backend_name(&self) -> &'static str;
}
