use std::ops::Deref;
use std::sync::Arc;

use moka::sync::Cache;
use tracing::debug;

use super::TextEmbedder;
use super::error::EmbeddingError;
use crate::constants::{DEFAULT_EMBEDDING_CACHE_CAPACITY, validate_embedding_dim};
use crate::hashing::hash_text;
use crate::store::CompanyRecord;

/// A record's vector: borrowed when stored, shared when computed.
#[derive(Debug, Clone)]
pub enum ResolvedEmbedding<'a> {
    Stored(&'a [f32]),
    Computed(Arc<Vec<f32>>),
}

impl Deref for ResolvedEmbedding<'_> {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        match self {
            ResolvedEmbedding::Stored(v) => v,
            ResolvedEmbedding::Computed(v) => v.as_slice(),
        }
    }
}

/// Resolves embeddings for records, computing and memoising missing ones.
///
/// Computed vectors are keyed by the BLAKE3 digest of the text, so records
/// sharing a description share one embedder call.
pub struct EmbeddingAccessor {
    embedder: Arc<dyn TextEmbedder>,
    memo: Cache<[u8; 32], Arc<Vec<f32>>>,
}

impl std::fmt::Debug for EmbeddingAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingAccessor")
            .field("backend", &self.embedder.backend_name())
            .field("dimension", &self.embedder.dimension())
            .field("memoised", &self.memo.entry_count())
            .finish()
    }
}

impl EmbeddingAccessor {
    pub fn new(embedder: Arc<dyn TextEmbedder>) -> Self {
        Self::with_capacity(embedder, DEFAULT_EMBEDDING_CACHE_CAPACITY)
    }

    pub fn with_capacity(embedder: Arc<dyn TextEmbedder>, capacity: u64) -> Self {
        Self {
            embedder,
            memo: Cache::new(capacity),
        }
    }

    pub fn dimension(&self) -> usize {
        self.embedder.dimension()
    }

    pub fn backend_name(&self) -> &'static str {
        self.embedder.backend_name()
    }

    /// Embeds `text`, consulting the memo first.
    pub async fn embed_text(&self, text: &str) -> Result<Arc<Vec<f32>>, EmbeddingError> {
        let key = hash_text(text);
        if let Some(hit) = self.memo.get(&key) {
            return Ok(hit);
        }

        let vector = self.embedder.embed(text).await?;
        let expected = self.embedder.dimension();
        validate_embedding_dim(expected, vector.len()).map_err(|_| {
            EmbeddingError::UnexpectedDimension {
                expected,
                actual: vector.len(),
            }
        })?;

        debug!(
            text_len = text.len(),
            backend = self.embedder.backend_name(),
            "Embedding computed"
        );

        let vector = Arc::new(vector);
        self.memo.insert(key, Arc::clone(&vector));
        Ok(vector)
    }

    /// The stored vector of `record`, or the embedding of its profile text.
    ///
    /// An empty stored vector counts as absent. A record with neither embeds
    /// as the empty string.
    pub async fn resolve<'a>(
        &self,
        record: &'a CompanyRecord,
    ) -> Result<ResolvedEmbedding<'a>, EmbeddingError> {
        match record.embedding.as_deref().filter(|v| !v.is_empty()) {
            Some(stored) => Ok(ResolvedEmbedding::Stored(stored)),
            None => self
                .embed_text(record.profile_text_or_empty())
                .await
                .map(ResolvedEmbedding::Computed),
        }
    }

    pub fn memoised_count(&self) -> u64 {
        self.memo.run_pending_tasks();
        self.memo.entry_count()
    }
}
