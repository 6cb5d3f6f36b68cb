//! Instrumented store wrapper for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::StoreError;
use super::model::{CompanyRecord, Recommendation};
use super::RecordStore;

/// Wraps a store, counting successful cache writes per identifier and failing
/// scheduled writes with [`StoreError::Unavailable`].
pub struct InstrumentedRecordStore<S> {
    inner: S,
    cache_writes: Mutex<HashMap<String, usize>>,
    pending_failures: Mutex<HashMap<String, u32>>,
}

impl<S: RecordStore> InstrumentedRecordStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache_writes: Mutex::new(HashMap::new()),
            pending_failures: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// The next `times` cache writes for `identifier` fail as unavailable.
    pub fn fail_cache_writes(&self, identifier: &str, times: u32) {
        self.pending_failures
            .lock()
            .insert(identifier.to_string(), times);
    }

    pub fn cache_writes(&self, identifier: &str) -> usize {
        self.cache_writes
            .lock()
            .get(identifier)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_cache_writes(&self) -> usize {
        self.cache_writes.lock().values().sum()
    }

    pub fn reset_counts(&self) {
        self.cache_writes.lock().clear();
    }
}

#[async_trait]
impl<S: RecordStore> RecordStore for InstrumentedRecordStore<S> {
    async fn upsert(&self, record: CompanyRecord) -> Result<(), StoreError> {
        self.inner.upsert(record).await
    }

    async fn get(&self, identifier: &str) -> Result<Option<CompanyRecord>, StoreError> {
        self.inner.get(identifier).await
    }

    async fn list_except(&self, excluded: Option<&str>) -> Result<Vec<CompanyRecord>, StoreError> {
        self.inner.list_except(excluded).await
    }

    async fn set_cached_recommendations(
        &self,
        identifier: &str,
        recommendations: Vec<Recommendation>,
    ) -> Result<bool, StoreError> {
        {
            let mut failures = self.pending_failures.lock();
            if let Some(remaining) = failures.get_mut(identifier)
                && *remaining > 0
            {
                *remaining -= 1;
                return Err(StoreError::Unavailable {
                    reason: format!("injected write failure for {identifier}"),
                });
            }
        }

        let written = self
            .inner
            .set_cached_recommendations(identifier, recommendations)
            .await?;
        if written {
            *self
                .cache_writes
                .lock()
                .entry(identifier.to_string())
                .or_insert(0) += 1;
        }
        Ok(written)
    }

    async fn remove(&self, identifier: &str) -> Result<bool, StoreError> {
        self.inner.remove(identifier).await
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.inner.count().await
    }
}
