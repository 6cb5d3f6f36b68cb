//! Candidate ranking.
//!
//! [`RankingEngine::rank`] resolves embeddings for the query and pool, scores
//! each candidate with [`crate::scoring::score_pair`], and returns the top
//! [`crate::constants::DEFAULT_TOP_K`] as caller-safe [`Recommendation`]s.
//!
//! [`Recommendation`]: crate::store::Recommendation

pub mod engine;
pub mod error;
pub mod projection;

#[cfg(test)]
mod tests;

pub use engine::{RankingEngine, ScoredCompany};
pub use error::RankingError;
pub use projection::canonical_string;
