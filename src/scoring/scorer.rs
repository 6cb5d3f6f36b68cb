use crate::constants::{GIVES_BONUS, KEYWORD_WEIGHT, SIMILARITY_WEIGHT, TOP10_BONUS};

use super::error::ScoringError;
use super::overlap::{flag_bonus, keyword_overlap};
use super::similarity::cosine_similarity;
use super::types::{ScoreBreakdown, ScoringProfile};

/// Weighted blend of the score components. Bonuses are added unweighted.
#[inline]
pub fn hybrid_score(similarity: f32, keyword_overlap: f32, gives_bonus: f32, top10_bonus: f32) -> f32 {
    SIMILARITY_WEIGHT * similarity + KEYWORD_WEIGHT * keyword_overlap + gives_bonus + top10_bonus
}

/// Scores `candidate` against `query`.
pub fn score_pair(
    query: &ScoringProfile<'_>,
    candidate: &ScoringProfile<'_>,
) -> Result<ScoreBreakdown, ScoringError> {
    let similarity = cosine_similarity(query.embedding, candidate.embedding)?;
    let overlap = keyword_overlap(query.keywords, candidate.keywords);
    let gives_bonus = flag_bonus(query.gives, candidate.gives, GIVES_BONUS);
    let top10_bonus = flag_bonus(query.top10_customers, candidate.top10_customers, TOP10_BONUS);

    Ok(ScoreBreakdown {
        similarity,
        keyword_overlap: overlap,
        gives_bonus,
        top10_bonus,
        total: hybrid_score(similarity, overlap, gives_bonus, top10_bonus),
    })
}
