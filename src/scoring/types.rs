use std::collections::BTreeSet;

use crate::store::CompanyRecord;

/// The parts of a company that take part in scoring.
#[derive(Debug, Clone, Copy)]
pub struct ScoringProfile<'a> {
    pub embedding: &'a [f32],
    pub keywords: &'a BTreeSet<String>,
    pub gives: bool,
    pub top10_customers: bool,
}

impl<'a> ScoringProfile<'a> {
    /// Scoring view of `record` using an already resolved embedding.
    pub fn of(record: &'a CompanyRecord, embedding: &'a [f32]) -> Self {
        Self {
            embedding,
            keywords: &record.business_keywords,
            gives: record.gives,
            top10_customers: record.top10_customers,
        }
    }
}

/// Per-component contributions of one query/candidate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    /// Raw cosine similarity (before weighting).
    pub similarity: f32,
    /// Raw keyword overlap ratio (before weighting).
    pub keyword_overlap: f32,
    pub gives_bonus: f32,
    pub top10_bonus: f32,
    /// Weighted total.
    pub total: f32,
}

impl std::fmt::Display for ScoreBreakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.4} (similarity: {:.4}, overlap: {:.4}, gives: {:.1}, top10: {:.1})",
            self.total, self.similarity, self.keyword_overlap, self.gives_bonus, self.top10_bonus
        )
    }
}
