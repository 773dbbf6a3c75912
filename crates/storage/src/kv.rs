//! Sled-backed record store
//!
//! Durable variant of the storage contract. One sled database holds one
//! tree per record kind; records are stored as JSON under keys namespaced
//! by scope and pipeline type:
//!
//! ```text
//! <scope> \x1f <partition> \x1f <record_id>
//! ```
//!
//! The `\x1f` (unit separator) cannot appear in session ids or record ids,
//! so prefix scans over `<scope>\x1f` are exact. Duplicate detection is a
//! `contains_key` probe on the record id index, mirroring the append
//! contract of the in-memory store.

use crate::retry::RetryPolicy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::{IVec, Tree};
use std::marker::PhantomData;
use std::path::Path;
use stepseal_core::{RecordStore, ScopedRecord, StorageError};
use tracing::debug;

fn backend(error: sled::Error) -> StorageError {
    StorageError::Backend(format!("sled: {}", error))
}

fn serde_error(error: serde_json::Error) -> StorageError {
    StorageError::Serialization(error.to_string())
}

/// Open (or create) a sled database for use with [`KvStore::with_db`].
///
/// Callers that want one file shared by several record kinds open the
/// database once and hand it to each store.
pub fn open_database(path: impl AsRef<Path>) -> Result<sled::Db, StorageError> {
    sled::open(path).map_err(backend)
}

/// Durable record store on sled.
///
/// Generic over the record kind: `KvStore<PipelineEvent>` and
/// `KvStore<ChecksumRegistryEntry>` opened from the same [`sled::Db`] share
/// the file while writing to separate trees.
///
/// Every sled call runs through the configured [`RetryPolicy`]; the
/// default policy does not retry.
#[derive(Debug, Clone)]
pub struct KvStore<T> {
    db: sled::Db,
    tree: Tree,
    ids: Tree,
    retry: RetryPolicy,
    _record: PhantomData<fn() -> T>,
}

impl<T> KvStore<T>
where
    T: ScopedRecord + Serialize + DeserializeOwned,
{
    /// Open a store in its own sled database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = sled::open(path).map_err(backend)?;
        Self::with_db(&db, RetryPolicy::default())
    }

    /// Open a store over an existing sled database.
    ///
    /// This is how the event store and the checksum registry share one
    /// database file.
    pub fn with_db(db: &sled::Db, retry: RetryPolicy) -> Result<Self, StorageError> {
        let tree = db.open_tree(T::KIND).map_err(backend)?;
        let ids = db
            .open_tree(format!("{}_ids", T::KIND))
            .map_err(backend)?;
        Ok(Self {
            db: db.clone(),
            tree,
            ids,
            retry,
            _record: PhantomData,
        })
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn record_key(record: &T) -> Vec<u8> {
        format!(
            "{}\x1f{}\x1f{}",
            record.scope_key(),
            record.partition(),
            record.record_id()
        )
        .into_bytes()
    }

    fn scope_prefix(scope: &str) -> Vec<u8> {
        format!("{}\x1f", scope).into_bytes()
    }
}

impl<T> RecordStore<T> for KvStore<T>
where
    T: ScopedRecord + Serialize + DeserializeOwned,
{
    fn store(&self, record: &T) -> Result<bool, StorageError> {
        let key = Self::record_key(record);
        let id = record.record_id().as_bytes().to_vec();

        self.retry.run(|| {
            if self.ids.contains_key(&id).map_err(backend)? {
                debug!(
                    kind = T::KIND,
                    record_id = record.record_id(),
                    "duplicate record id, append ignored"
                );
                return Ok(false);
            }
            let bytes = serde_json::to_vec(record).map_err(serde_error)?;
            self.tree.insert(key.as_slice(), bytes).map_err(backend)?;
            self.ids
                .insert(id.as_slice(), IVec::from(&[][..]))
                .map_err(backend)?;
            self.db.flush().map_err(backend)?;
            Ok(true)
        })
    }

    fn list_by_scope(&self, scope: &str) -> Result<Vec<T>, StorageError> {
        let prefix = Self::scope_prefix(scope);

        self.retry.run(|| {
            let mut records = Vec::new();
            for item in self.tree.scan_prefix(&prefix) {
                let (_key, raw) = item.map_err(backend)?;
                records.push(serde_json::from_slice(&raw).map_err(serde_error)?);
            }
            Ok(records)
        })
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.retry.run(|| {
            self.tree.clear().map_err(backend)?;
            self.ids.clear().map_err(backend)?;
            self.db.flush().map_err(backend)?;
            Ok(())
        })
    }
}
