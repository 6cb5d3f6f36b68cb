//! Company record storage.
//!
//! [`RecordStore`] is the persistence capability the ranking and propagation
//! layers depend on. [`MemoryRecordStore`] keeps records in insertion order and
//! survives restarts through a JSON snapshot.

pub mod error;
pub mod memory;
pub mod model;

#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use error::StoreError;
pub use memory::{HydrationResult, MemoryRecordStore, PersistResult};
pub use model::{CompanyRecord, CompanyView, Recommendation, REFERENCE_FIELDS, RESERVED_FIELDS};

#[cfg(any(test, feature = "mock"))]
pub use mock::InstrumentedRecordStore;

use async_trait::async_trait;

/// Persistence capability over company records keyed by identifier.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts a record, replacing any existing record with the same identifier.
    async fn upsert(&self, record: CompanyRecord) -> Result<(), StoreError>;

    async fn get(&self, identifier: &str) -> Result<Option<CompanyRecord>, StoreError>;

    /// All records in insertion order, minus `excluded` when given.
    async fn list_except(&self, excluded: Option<&str>) -> Result<Vec<CompanyRecord>, StoreError>;

    /// Overwrites the cached recommendation list of one record.
    ///
    /// Returns `false` when the record no longer exists.
    async fn set_cached_recommendations(
        &self,
        identifier: &str,
        recommendations: Vec<Recommendation>,
    ) -> Result<bool, StoreError>;

    /// Deletes a record. Returns `false` when it was not present.
    async fn remove(&self, identifier: &str) -> Result<bool, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}
