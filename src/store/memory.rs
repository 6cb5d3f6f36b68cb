use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::error::StoreError;
use super::model::{CompanyRecord, Recommendation};
use super::RecordStore;

/// Result of loading a snapshot at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrationResult {
    Loaded { records: usize, bytes: u64 },
    NotFound,
}

/// Result of writing a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistResult {
    pub records: usize,
    pub bytes: u64,
}

#[derive(Default)]
struct Records {
    ordered: Vec<CompanyRecord>,
    positions: HashMap<String, usize>,
}

impl Records {
    fn upsert(&mut self, record: CompanyRecord) {
        match self.positions.get(&record.identifier) {
            Some(&idx) => self.ordered[idx] = record,
            None => {
                self.positions
                    .insert(record.identifier.clone(), self.ordered.len());
                self.ordered.push(record);
            }
        }
    }

    fn remove(&mut self, identifier: &str) -> bool {
        let Some(idx) = self.positions.remove(identifier) else {
            return false;
        };
        self.ordered.remove(idx);
        for position in self.positions.values_mut() {
            if *position > idx {
                *position -= 1;
            }
        }
        true
    }
}

/// In-process record store, insertion ordered.
///
/// Re-registering an identifier replaces the record in place, so ranking ties
/// keep resolving in first-registration order.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<Records>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from records, later duplicates replacing earlier ones.
    pub fn with_records(records: impl IntoIterator<Item = CompanyRecord>) -> Self {
        let store = Self::new();
        {
            let mut guard = store.records.write();
            for record in records {
                guard.upsert(record);
            }
        }
        store
    }

    /// Loads a JSON snapshot, replacing the current contents.
    pub async fn hydrate(&self, path: &Path) -> Result<HydrationResult, StoreError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No snapshot found, starting empty");
                return Ok(HydrationResult::NotFound);
            }
            Err(e) => return Err(snapshot_error(path, e)),
        };

        let loaded: Vec<CompanyRecord> = serde_json::from_slice(&bytes)?;
        let mut fresh = Records::default();
        for record in loaded {
            fresh.upsert(record);
        }
        let records = fresh.ordered.len();
        *self.records.write() = fresh;

        info!(path = %path.display(), records, "Snapshot loaded");
        Ok(HydrationResult::Loaded {
            records,
            bytes: bytes.len() as u64,
        })
    }

    /// Identifiers of records whose stored vector is not `expected` long.
    ///
    /// Empty vectors are skipped since they are re-embedded on use. Each
    /// mismatch is logged at warn level.
    pub fn mismatched_dimensions(&self, expected: usize) -> Vec<String> {
        let guard = self.records.read();
        guard
            .ordered
            .iter()
            .filter_map(|record| {
                let actual = record.embedding.as_ref().map_or(0, Vec::len);
                if actual == 0 || actual == expected {
                    return None;
                }
                warn!(
                    company = %record.identifier,
                    expected,
                    actual,
                    "Stored embedding dimension does not match embedder"
                );
                Some(record.identifier.clone())
            })
            .collect()
    }

    /// Writes the current contents as a JSON snapshot.
    ///
    /// The file is written next to `path` and renamed into place, so a crash
    /// mid-write leaves the previous snapshot intact.
    pub async fn persist(&self, path: &Path) -> Result<PersistResult, StoreError> {
        let (payload, records) = {
            let guard = self.records.read();
            (serde_json::to_vec(&guard.ordered)?, guard.ordered.len())
        };
        let bytes = payload.len() as u64;
        let target = path.to_path_buf();

        tokio::task::spawn_blocking(move || write_atomically(&target, &payload))
            .await
            .map_err(|e| StoreError::Snapshot {
                path: path.to_path_buf(),
                reason: format!("snapshot writer panicked: {e}"),
            })??;

        debug!(path = %path.display(), records, bytes, "Snapshot written");
        Ok(PersistResult { records, bytes })
    }
}

fn write_atomically(path: &Path, payload: &[u8]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| snapshot_error(path, e))?;

    let mut temp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| snapshot_error(path, e))?;
    temp.write_all(payload).map_err(|e| snapshot_error(path, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| snapshot_error(path, e))?;
    temp.persist(path)
        .map_err(|e| snapshot_error(path, e.error))?;
    Ok(())
}

fn snapshot_error(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Snapshot {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn upsert(&self, record: CompanyRecord) -> Result<(), StoreError> {
        self.records.write().upsert(record);
        Ok(())
    }

    async fn get(&self, identifier: &str) -> Result<Option<CompanyRecord>, StoreError> {
        let guard = self.records.read();
        Ok(guard
            .positions
            .get(identifier)
            .map(|&idx| guard.ordered[idx].clone()))
    }

    async fn list_except(&self, excluded: Option<&str>) -> Result<Vec<CompanyRecord>, StoreError> {
        let guard = self.records.read();
        Ok(guard
            .ordered
            .iter()
            .filter(|r| excluded != Some(r.identifier.as_str()))
            .cloned()
            .collect())
    }

    async fn set_cached_recommendations(
        &self,
        identifier: &str,
        recommendations: Vec<Recommendation>,
    ) -> Result<bool, StoreError> {
        let mut guard = self.records.write();
        let Some(&idx) = guard.positions.get(identifier) else {
            return Ok(false);
        };
        guard.ordered[idx].cached_recommendations = Some(recommendations);
        Ok(true)
    }

    async fn remove(&self, identifier: &str) -> Result<bool, StoreError> {
        Ok(self.records.write().remove(identifier))
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().ordered.len())
    }
}
