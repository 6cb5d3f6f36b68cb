//! In-process sentence embedder (candle BERT + tokenizer).
//!
//! Use [`LocalEmbedderConfig::stub`] for tests and demos without model files.

pub mod config;


pub use config::{LocalEmbedderConfig, REQUIRED_MODEL_FILES};

use std::sync::Arc;

use async_trait::async_trait;
use candle_core::{Device, Tensor};
use tracing::{debug, info, warn};

use crate::embedding::bert::BertSentenceEncoder;
use crate::embedding::device::{device_label, select_device};
use crate::embedding::error::EmbeddingError;
use crate::embedding::utils::load_tokenizer_with_truncation;
use crate::embedding::TextEmbedder;
use crate::hashing::embedding_seed;

enum EmbedderBackend {
    Model {
        encoder: BertSentenceEncoder,
        tokenizer: Arc<tokenizers::Tokenizer>,
        device: Device,
    },
    Stub,
}

/// Embedding generator backed by a local model (supports stub mode).
pub struct LocalEmbedder {
    backend: EmbedderBackend,
    config: LocalEmbedderConfig,
}

impl std::fmt::Debug for LocalEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalEmbedder")
            .field(
                "backend",
                &match &self.backend {
                    EmbedderBackend::Model { device, .. } => {
                        format!("Model({})", device_label(device))
                    }
                    EmbedderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("embedding_dim", &self.config.embedding_dim)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl LocalEmbedder {
    /// Loads the embedder from a config (stub mode is supported).
    pub fn load(config: LocalEmbedderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!("Local embedder running in STUB mode (testing only)");
            return Ok(Self {
                backend: EmbedderBackend::Stub,
                config,
            });
        }

        if let Some(path) = config.missing_file() {
            return Err(EmbeddingError::ModelNotFound { path });
        }

        let device = select_device();
        let tokenizer = load_tokenizer_with_truncation(&config.model_dir, config.max_seq_len)
            .map_err(|e| EmbeddingError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {e}"),
            })?;
        let encoder = BertSentenceEncoder::load(&config.model_dir, &device).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load BERT encoder: {e}"),
            }
        })?;

        if encoder.hidden_size() != config.embedding_dim {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!(
                    "embedding_dim ({}) does not match model hidden_size ({})",
                    config.embedding_dim,
                    encoder.hidden_size()
                ),
            });
        }

        info!(
            model_dir = %config.model_dir.display(),
            embedding_dim = config.embedding_dim,
            max_seq_len = config.max_seq_len,
            device = device_label(&device),
            "Local embedding model loaded"
        );

        Ok(Self {
            backend: EmbedderBackend::Model {
                encoder,
                tokenizer: Arc::new(tokenizer),
                device,
            },
            config,
        })
    }

    /// Stub embedder of the given dimension.
    pub fn stub(embedding_dim: usize) -> Result<Self, EmbeddingError> {
        Self::load(LocalEmbedderConfig::stub().with_embedding_dim(embedding_dim))
    }

    /// Generates an L2-normalised embedding for one text on the calling thread.
    pub fn embed_sync(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match &self.backend {
            EmbedderBackend::Model {
                encoder,
                tokenizer,
                device,
            } => encode_text(encoder, tokenizer, device, text, self.config.embedding_dim),
            EmbedderBackend::Stub => Ok(deterministic_embedding(self.config.embedding_dim, text)),
        }
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EmbedderBackend::Stub)
    }

    pub fn config(&self) -> &LocalEmbedderConfig {
        &self.config
    }
}

#[async_trait]
impl TextEmbedder for LocalEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let EmbedderBackend::Model {
            encoder,
            tokenizer,
            device,
        } = &self.backend
        else {
            return self.embed_sync(text);
        };

        let encoder = encoder.clone();
        let tokenizer = Arc::clone(tokenizer);
        let device = device.clone();
        let text = text.to_owned();
        let dim = self.config.embedding_dim;

        tokio::task::spawn_blocking(move || encode_text(&encoder, &tokenizer, &device, &text, dim))
            .await
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("encoder task failed: {e}"),
            })?
    }

    fn dimension(&self) -> usize {
        self.config.embedding_dim
    }

    fn backend_name(&self) -> &'static str {
        if self.is_stub() { "stub" } else { "local" }
    }
}

fn encode_text(
    encoder: &BertSentenceEncoder,
    tokenizer: &tokenizers::Tokenizer,
    device: &Device,
    text: &str,
    embedding_dim: usize,
) -> Result<Vec<f32>, EmbeddingError> {
    let encoding = tokenizer
        .encode(text, true)
        .map_err(|e| EmbeddingError::TokenizationFailed {
            reason: e.to_string(),
        })?;

    let ids = encoding.get_ids();
    if ids.is_empty() {
        return Ok(vec![0.0; embedding_dim]);
    }

    debug!(
        text_len = text.len(),
        token_count = ids.len(),
        "Generating embedding"
    );

    let input_ids = Tensor::new(ids, device)?.unsqueeze(0)?;
    let type_ids = Tensor::new(encoding.get_type_ids(), device)?.unsqueeze(0)?;
    let attention_mask = Tensor::new(encoding.get_attention_mask(), device)?.unsqueeze(0)?;

    let pooled = encoder
        .encode(&input_ids, &type_ids, &attention_mask)
        .map_err(|e| EmbeddingError::InferenceFailed {
            reason: format!("Encoder forward pass failed: {e}"),
        })?;
    let embedding = pooled.squeeze(0)?.to_vec1::<f32>()?;

    Ok(l2_normalize(embedding))
}

/// Deterministic unit vector derived from `text` (stub backend).
///
/// Equal texts map to equal vectors at a given dimension; the empty string is
/// a valid input like any other.
pub fn deterministic_embedding(dimension: usize, text: &str) -> Vec<f32> {
    let mut state = embedding_seed(dimension, text);
    let embedding = (0..dimension)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0
        })
        .collect();
    l2_normalize(embedding)
}

fn l2_normalize(mut embedding: Vec<f32>) -> Vec<f32> {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut embedding {
            *x /= norm;
        }
    }
    embedding
}
