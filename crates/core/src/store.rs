//! Storage contract
//!
//! The contract backends implement lives here with the record types, so
//! backend crates depend on the vocabulary and not the other way around.
//!
//! A [`RecordStore`] is deliberately narrow: append, list one scope, wipe
//! everything. There is no update and no single-record delete because
//! events and snapshots are immutable history.

use crate::error::StorageError;

/// A record that can live in a [`RecordStore`].
///
/// `KIND` names the record family (the tree in a key-value backend),
/// `scope_key` is the grouping key listings run over (the session id), and
/// `partition` sub-namespaces storage keys by pipeline type.
pub trait ScopedRecord: Clone + Send + Sync {
    /// Record family name, used as the storage namespace.
    const KIND: &'static str;

    /// Globally unique id of this record.
    fn record_id(&self) -> &str;

    /// Scope this record is listed under.
    fn scope_key(&self) -> &str;

    /// Secondary namespace segment for storage keys.
    fn partition(&self) -> &str;
}

/// Append-only record storage scoped by session.
///
/// # Contract
///
/// - `store` is idempotent by record id: a duplicate id is ignored and
///   reported as `Ok(false)`, it is never an error and never overwrites.
/// - `list_by_scope` returns every record of a scope; an unknown scope is
///   an empty list. Callers must not rely on the returned order: the chain
///   engine re-sorts by timestamp.
/// - `clear` wipes every scope. There is no per-record removal.
///
/// Implementations must be safe to share across threads; different scopes
/// must not contend with each other.
pub trait RecordStore<T: ScopedRecord>: Send + Sync {
    /// Persist a record. Returns `false` if its id was already stored.
    fn store(&self, record: &T) -> Result<bool, StorageError>;

    /// List every record of one scope.
    fn list_by_scope(&self, scope: &str) -> Result<Vec<T>, StorageError>;

    /// Remove all records of all scopes.
    fn clear(&self) -> Result<(), StorageError>;
}
