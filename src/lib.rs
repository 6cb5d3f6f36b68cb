//! Bizmatch library crate (used by the server and integration tests).
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`Config`], [`ConfigError`] - Server configuration
//! - [`CompanyRecord`], [`Recommendation`], [`CompanyView`] - Stored and returned shapes
//! - [`RecommendationService`] - `register_company` / `query_recommendations`
//!
//! ## Embedding & Scoring
//! - [`TextEmbedder`] with [`LocalEmbedder`] (candle BERT or stub) and [`HttpEmbedder`]
//! - [`EmbeddingAccessor`] - stored-vector preference with a memo for computed ones
//! - [`cosine_similarity`], [`keyword_overlap`], [`hybrid_score`] - the scoring blend
//! - [`RankingEngine`] - top-K selection and projection
//!
//! ## Background Work
//! - [`PropagationCoordinator`], [`TokioJobQueue`] - refresh cached lists after a registration
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod embedding;
pub mod gateway;
pub mod hashing;
pub mod propagation;
pub mod ranking;
pub mod scoring;
pub mod service;
pub mod store;

pub use config::{Config, ConfigError};
pub use constants::{
    DEFAULT_TOP_K, DimValidationError, GIVES_BONUS, KEYWORD_WEIGHT, MAX_SCORE, SIMILARITY_WEIGHT,
    TOP10_BONUS, validate_embedding_dim,
};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbedder;
pub use embedding::{
    EmbeddingAccessor, EmbeddingError, HttpEmbedder, HttpEmbedderConfig, LocalEmbedder,
    LocalEmbedderConfig, TextEmbedder,
};
pub use hashing::{embedding_seed, hash_text};
#[cfg(any(test, feature = "mock"))]
pub use propagation::RecordingJobQueue;
pub use propagation::{
    JobHandler, JobQueue, PropagationCoordinator, PropagationError, PropagationJob,
    PropagationReport, QueueError, RetryPolicy, TokioJobQueue,
};
pub use ranking::{RankingEngine, RankingError};
pub use scoring::{
    ScoreBreakdown, ScoringError, ScoringProfile, cosine_similarity, hybrid_score,
    keyword_overlap,
};
pub use service::{CompanyProfile, RecommendationService, Registration, ServiceError};
#[cfg(any(test, feature = "mock"))]
pub use store::InstrumentedRecordStore;
pub use store::{
    CompanyRecord, CompanyView, MemoryRecordStore, Recommendation, RecordStore, StoreError,
};
