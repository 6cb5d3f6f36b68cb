//! OpenAI-compatible embeddings client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::TextEmbedder;
use super::error::EmbeddingError;
use crate::constants::DEFAULT_EMBEDDING_DIM;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct HttpEmbedderConfig {
    /// API base, e.g. `http://localhost:8081/v1`; `/embeddings` is appended.
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Expected vector length.
    pub dimension: usize,
    pub timeout: Duration,
}

impl HttpEmbedderConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key: None,
            dimension: DEFAULT_EMBEDDING_DIM,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }
}

/// Embeds text through a remote `/embeddings` endpoint.
///
/// Connection failures, timeouts, `429` and `5xx` map to
/// [`EmbeddingError::Unavailable`]; retrying is left to the caller.
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimension: usize,
}

impl HttpEmbedder {
    pub fn new(config: HttpEmbedderConfig) -> Result<Self, EmbeddingError> {
        if config.model.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding model name is empty".to_string(),
            });
        }

        let mut headers = HeaderMap::new();
        if let Some(key) = config.api_key.as_deref() {
            let auth = HeaderValue::from_str(&format!("Bearer {}", key.trim())).map_err(|e| {
                EmbeddingError::InvalidConfig {
                    reason: format!("invalid API key: {e}"),
                }
            })?;
            headers.insert(AUTHORIZATION, auth);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| EmbeddingError::InvalidConfig {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
            model: config.model,
            dimension: config.dimension,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextEmbedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: [text],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbeddingError::Unavailable {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(classify_status(status, body));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| EmbeddingError::Unavailable {
                reason: e.to_string(),
            })?;
        let embedding = parse_embedding_response(&body)?;

        debug!(
            endpoint = %self.endpoint,
            dimension = embedding.len(),
            "Remote embedding received"
        );
        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

pub(crate) fn classify_status(status: StatusCode, body: String) -> EmbeddingError {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        EmbeddingError::Unavailable {
            reason: format!("{status}: {body}"),
        }
    } else {
        EmbeddingError::RequestFailed {
            status: status.as_u16(),
            reason: body,
        }
    }
}

/// Extracts the first embedding (by `index`) from a response body.
pub(crate) fn parse_embedding_response(body: &[u8]) -> Result<Vec<f32>, EmbeddingError> {
    let mut parsed: EmbeddingResponse =
        serde_json::from_slice(body).map_err(|e| EmbeddingError::InvalidResponse {
            reason: e.to_string(),
        })?;
    parsed.data.sort_by_key(|entry| entry.index);

    parsed
        .data
        .into_iter()
        .next()
        .map(|entry| entry.embedding)
        .ok_or_else(|| EmbeddingError::InvalidResponse {
            reason: "response contained no embeddings".to_string(),
        })
}
