use std::sync::Arc;

use futures_util::{StreamExt, TryStreamExt, stream};
use tracing::debug;

use crate::constants::{DEFAULT_EMBED_CONCURRENCY, DEFAULT_TOP_K};
use crate::embedding::{EmbeddingAccessor, ResolvedEmbedding};
use crate::scoring::{ScoreBreakdown, ScoringProfile, score_pair};
use crate::store::{CompanyRecord, CompanyView, Recommendation};

use super::error::RankingError;

/// A pool member with its score against the query.
#[derive(Debug, Clone)]
pub struct ScoredCompany<'a> {
    pub record: &'a CompanyRecord,
    pub breakdown: ScoreBreakdown,
}

impl ScoredCompany<'_> {
    pub fn into_recommendation(self) -> Recommendation {
        Recommendation {
            score: self.breakdown.total,
            company: CompanyView::project(self.record),
        }
    }
}

/// Ranks a candidate pool against a query company.
pub struct RankingEngine {
    accessor: Arc<EmbeddingAccessor>,
    top_k: usize,
    embed_concurrency: usize,
}

impl std::fmt::Debug for RankingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingEngine")
            .field("accessor", &self.accessor)
            .field("top_k", &self.top_k)
            .field("embed_concurrency", &self.embed_concurrency)
            .finish()
    }
}

impl RankingEngine {
    pub fn new(accessor: Arc<EmbeddingAccessor>) -> Self {
        Self {
            accessor,
            top_k: DEFAULT_TOP_K,
            embed_concurrency: DEFAULT_EMBED_CONCURRENCY,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Max embedder calls in flight while resolving one pool.
    pub fn with_embed_concurrency(mut self, embed_concurrency: usize) -> Self {
        self.embed_concurrency = embed_concurrency.max(1);
        self
    }

    pub fn accessor(&self) -> &Arc<EmbeddingAccessor> {
        &self.accessor
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Scores every pool member except the query itself, in pool order.
    ///
    /// An empty query identifier excludes nothing. Any embedding or scoring
    /// failure fails the whole call.
    pub async fn score_candidates<'p>(
        &self,
        query: &CompanyRecord,
        pool: &'p [CompanyRecord],
    ) -> Result<Vec<ScoredCompany<'p>>, RankingError> {
        let query_embedding = self.accessor.resolve(query).await?;
        let query_profile = ScoringProfile::of(query, &query_embedding);

        let candidates: Vec<&'p CompanyRecord> = pool
            .iter()
            .filter(|candidate| !is_same_company(query, candidate))
            .collect();

        let lookups: Vec<_> = candidates
            .iter()
            .copied()
            .map(|candidate| self.accessor.resolve(candidate))
            .collect();
        let embeddings: Vec<ResolvedEmbedding<'p>> = stream::iter(lookups)
            .buffered(self.embed_concurrency)
            .try_collect()
            .await?;

        candidates
            .into_iter()
            .zip(embeddings.iter())
            .map(|(record, embedding)| {
                let breakdown = score_pair(&query_profile, &ScoringProfile::of(record, embedding))?;
                Ok(ScoredCompany { record, breakdown })
            })
            .collect()
    }

    /// Top-K recommendations for `query`, best first.
    ///
    /// Equal scores keep pool order.
    pub async fn rank(
        &self,
        query: &CompanyRecord,
        pool: &[CompanyRecord],
    ) -> Result<Vec<Recommendation>, RankingError> {
        let mut scored = self.score_candidates(query, pool).await?;

        // sort_by is stable
        scored.sort_by(|a, b| b.breakdown.total.total_cmp(&a.breakdown.total));
        scored.truncate(self.top_k);

        if let Some(top) = scored.first() {
            debug!(
                query = %query.identifier,
                pool = pool.len(),
                returned = scored.len(),
                top = %top.record.identifier,
                top_score = %top.breakdown,
                "Ranked candidates"
            );
        }

        Ok(scored
            .into_iter()
            .map(ScoredCompany::into_recommendation)
            .collect())
    }
}

fn is_same_company(query: &CompanyRecord, candidate: &CompanyRecord) -> bool {
    !query.identifier.is_empty() && query.identifier == candidate.identifier
}
