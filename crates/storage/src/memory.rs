//! Sharded in-memory record store
//!
//! DashMap keyed by scope, one shard per checkout session. Appends to
//! different sessions never contend; appends to the same session serialize
//! on the shard entry, so no concurrent write is lost.
//!
//! # Design
//!
//! - DashMap: sharded map, lock-free reads of disjoint scopes
//! - Per-scope shard: insertion-ordered `Vec` of records
//! - DashSet of seen record ids, shared across scopes, for O(1) duplicate
//!   detection with the same store-wide reach as the sled id index
//!
//! Listing clones the shard's records. Insertion order happens to be
//! preserved but is not part of the contract; consumers re-sort.

use dashmap::{DashMap, DashSet};
use stepseal_core::{RecordStore, ScopedRecord, StorageError};

/// In-memory record store sharded by scope.
///
/// The default backend: fast, dependency-free at runtime, and gone when
/// dropped. Suits dashboards that rebuild state from upstream sources and
/// every test.
///
/// # Thread Safety
///
/// All operations take `&self`. Different scopes never contend; writes to
/// one scope lock only that scope's shard.
#[derive(Debug)]
pub struct MemoryStore<T> {
    shards: DashMap<String, Vec<T>>,
    seen_ids: DashSet<String>,
}

impl<T: ScopedRecord> MemoryStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            shards: DashMap::new(),
            seen_ids: DashSet::new(),
        }
    }

    /// Number of scopes holding at least one record.
    pub fn scope_count(&self) -> usize {
        self.shards.len()
    }

    /// Total records across all scopes.
    pub fn total_records(&self) -> usize {
        self.shards.iter().map(|entry| entry.value().len()).sum()
    }

    /// Check if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }
}

impl<T: ScopedRecord> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ScopedRecord> RecordStore<T> for MemoryStore<T> {
    fn store(&self, record: &T) -> Result<bool, StorageError> {
        // DashSet::insert is atomic: of two racing writers with the same
        // id, exactly one sees true and appends.
        if !self.seen_ids.insert(record.record_id().to_string()) {
            return Ok(false);
        }
        self.shards
            .entry(record.scope_key().to_string())
            .or_default()
            .push(record.clone());
        Ok(true)
    }

    fn list_by_scope(&self, scope: &str) -> Result<Vec<T>, StorageError> {
        Ok(self
            .shards
            .get(scope)
            .map(|shard| shard.value().clone())
            .unwrap_or_default())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.shards.clear();
        self.seen_ids.clear();
        Ok(())
    }
}
