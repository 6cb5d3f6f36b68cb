//! Scriptable embedder for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::TextEmbedder;
use super::error::EmbeddingError;
use super::local::deterministic_embedding;

/// Embedder with per-text overrides, call counting and injected outages.
///
/// Texts without an override get [`deterministic_embedding`] vectors.
pub struct MockEmbedder {
    dimension: usize,
    overrides: RwLock<HashMap<String, Vec<f32>>>,
    calls: AtomicUsize,
    failures_remaining: AtomicU32,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            overrides: RwLock::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            failures_remaining: AtomicU32::new(0),
        }
    }

    /// Returns `vector` for `text` (its length is not checked here).
    pub fn with_vector(self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.set_vector(text, vector);
        self
    }

    pub fn set_vector(&self, text: impl Into<String>, vector: Vec<f32>) {
        self.overrides.write().insert(text.into(), vector);
    }

    /// The next `times` calls fail with [`EmbeddingError::Unavailable`].
    pub fn fail_next(&self, times: u32) {
        self.failures_remaining.store(times, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextEmbedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let should_fail = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(EmbeddingError::Unavailable {
                reason: "injected outage".to_string(),
            });
        }

        if let Some(vector) = self.overrides.read().get(text) {
            return Ok(vector.clone());
        }
        Ok(deterministic_embedding(self.dimension, text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}
