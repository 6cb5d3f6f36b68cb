use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use tracing::{info, instrument, warn};

use crate::constants::DEFAULT_PROPAGATION_CONCURRENCY;
use crate::ranking::RankingEngine;
use crate::store::{CompanyRecord, RecordStore};

use super::error::PropagationError;
use super::queue::JobHandler;
use super::types::{PropagationJob, PropagationReport};

/// Refreshes every other record's cached recommendations after a registration.
///
/// Each record is re-ranked against the full stored pool and its cache
/// overwritten. Per-record failures do not stop the pass; they surface as
/// [`PropagationError::Incomplete`] so the job is retried. Cost is one full
/// ranking per stored record.
pub struct PropagationCoordinator {
    store: Arc<dyn RecordStore>,
    engine: Arc<RankingEngine>,
    concurrency: usize,
}

enum RefreshOutcome {
    Updated,
    Vanished,
}

impl PropagationCoordinator {
    pub fn new(store: Arc<dyn RecordStore>, engine: Arc<RankingEngine>) -> Self {
        Self {
            store,
            engine,
            concurrency: DEFAULT_PROPAGATION_CONCURRENCY,
        }
    }

    /// Records refreshed in parallel within one pass.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    #[instrument(skip_all, fields(company = %new_company_id))]
    pub async fn propagate(
        &self,
        new_company_id: &str,
    ) -> Result<PropagationReport, PropagationError> {
        if self.store.get(new_company_id).await?.is_none() {
            return Err(PropagationError::RecordNotFound {
                identifier: new_company_id.to_string(),
            });
        }

        let pool = self.store.list_except(None).await?;
        let pool = pool.as_slice();
        let targets: Vec<&CompanyRecord> = pool
            .iter()
            .filter(|record| record.identifier != new_company_id)
            .collect();

        let mut report = PropagationReport {
            company_id: new_company_id.to_string(),
            total: targets.len(),
            ..Default::default()
        };
        let mut retryable = false;

        let refreshes: Vec<_> = targets
            .into_iter()
            .map(|record| async move {
                (record.identifier.as_str(), self.refresh(record, pool).await)
            })
            .collect();
        let outcomes: Vec<(&str, Result<RefreshOutcome, PropagationError>)> =
            stream::iter(refreshes)
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        for (identifier, outcome) in outcomes {
            match outcome {
                Ok(RefreshOutcome::Updated) => report.updated += 1,
                Ok(RefreshOutcome::Vanished) => report.vanished += 1,
                Err(e) => {
                    warn!(record = identifier, error = %e, "Failed to refresh recommendations");
                    retryable |= e.is_retryable();
                    report.failed.push(identifier.to_string());
                }
            }
        }

        info!(
            total = report.total,
            updated = report.updated,
            vanished = report.vanished,
            failed = report.failed.len(),
            "Propagation pass finished"
        );

        if retryable {
            return Err(PropagationError::Incomplete {
                company_id: report.company_id,
                failed: report.failed,
                total: report.total,
            });
        }
        Ok(report)
    }

    async fn refresh(
        &self,
        record: &CompanyRecord,
        pool: &[CompanyRecord],
    ) -> Result<RefreshOutcome, PropagationError> {
        let recommendations = self.engine.rank(record, pool).await?;
        let written = self
            .store
            .set_cached_recommendations(&record.identifier, recommendations)
            .await?;
        Ok(if written {
            RefreshOutcome::Updated
        } else {
            RefreshOutcome::Vanished
        })
    }
}

#[async_trait]
impl JobHandler for PropagationCoordinator {
    async fn handle(&self, job: &PropagationJob) -> Result<(), PropagationError> {
        match self.propagate(&job.company_id).await {
            Ok(_) => Ok(()),
            Err(PropagationError::RecordNotFound { identifier }) => {
                info!(company = %identifier, job_id = %job.id, "Company gone, nothing to propagate");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
