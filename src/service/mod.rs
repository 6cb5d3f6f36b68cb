//! Registration and query operations.
//!
//! [`RecommendationService`] ties the store, the ranking engine and the
//! propagation queue together behind the two public operations.

pub mod error;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ServiceError;
pub use types::{CompanyProfile, Registration};

use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::propagation::{JobQueue, PropagationJob};
use crate::ranking::RankingEngine;
use crate::store::{CompanyView, Recommendation, RecordStore};

pub struct RecommendationService {
    store: Arc<dyn RecordStore>,
    engine: Arc<RankingEngine>,
    queue: Arc<dyn JobQueue>,
}

impl RecommendationService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        engine: Arc<RankingEngine>,
        queue: Arc<dyn JobQueue>,
    ) -> Self {
        Self {
            store,
            engine,
            queue,
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn engine(&self) -> &Arc<RankingEngine> {
        &self.engine
    }

    /// Stores a company and returns its initial recommendations.
    ///
    /// The profile text is embedded up front and stored with the record. A
    /// propagation job is then submitted so every other record's cached list
    /// picks up the newcomer; a failed submission is logged and does not fail
    /// the registration. The initial list is returned, not cached.
    #[instrument(skip_all, fields(company = ?profile.company_name))]
    pub async fn register_company(
        &self,
        profile: CompanyProfile,
    ) -> Result<Registration, ServiceError> {
        profile.require_name()?;
        let embedding = self
            .engine
            .accessor()
            .embed_text(profile.require_profile()?)
            .await?;

        let record = profile.into_record(Some(embedding.to_vec()));
        let identifier = record.identifier.clone();
        self.store.upsert(record.clone()).await?;

        if let Err(e) = self.queue.submit(PropagationJob::new(identifier.as_str())) {
            error!(company = %identifier, error = %e, "Failed to enqueue propagation job");
        }

        let pool = self.store.list_except(Some(&identifier)).await?;
        let recommendations = self.engine.rank(&record, &pool).await?;

        info!(
            company = %identifier,
            pool = pool.len(),
            recommendations = recommendations.len(),
            "Company registered"
        );

        Ok(Registration {
            company: CompanyView::project(&record),
            recommendations,
        })
    }

    /// Top-K companies for an ad-hoc profile. Read-only.
    ///
    /// A stored company with the same name is excluded from the pool.
    #[instrument(skip_all, fields(company = ?profile.company_name))]
    pub async fn query_recommendations(
        &self,
        profile: CompanyProfile,
    ) -> Result<Vec<Recommendation>, ServiceError> {
        profile.require_profile()?;

        let query = profile.into_record(None);
        let excluded = Some(query.identifier.as_str()).filter(|name| !name.is_empty());
        let pool = self.store.list_except(excluded).await?;

        Ok(self.engine.rank(&query, &pool).await?)
    }
}
