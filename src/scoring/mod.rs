//! Pairwise company scoring.
//!
//! A candidate's score against a query is a fixed linear blend:
//!
//! ```text
//! total = 0.4 * cosine(query.vector, candidate.vector)
//!       + 0.3 * |Kq ∩ Kc| / max(|Kq|, |Kc|, 1)
//!       + 0.1 if both give
//!       + 0.1 if both have top-10 customers
//! ```
//!
//! Similarity is the only fallible part: vectors of unequal length are a
//! [`ScoringError::DimensionMismatch`], never a silent zero.

pub mod error;
pub mod overlap;
pub mod scorer;
pub mod similarity;
pub mod types;


pub use error::ScoringError;
pub use overlap::{flag_bonus, keyword_overlap};
pub use scorer::{hybrid_score, score_pair};
pub use similarity::cosine_similarity;
pub use types::{ScoreBreakdown, ScoringProfile};
