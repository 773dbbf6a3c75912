//! Storage backends for stepseal
//!
//! Two implementations of the `RecordStore` contract from `stepseal-core`:
//! - [`MemoryStore`]: per-scope sharded in-memory store, the default
//! - [`KvStore`]: sled-backed embedded key-value store for durable history
//!
//! Plus [`RetryPolicy`], the bounded backoff wrapper the sled backend runs
//! its calls through.
//!
//! Both backends serve both record kinds (events and checksum snapshots);
//! the record kind picks the namespace, so one sled database holds both
//! trees.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod kv;
pub mod memory;
pub mod retry;

pub use kv::{open_database, KvStore};
pub use memory::MemoryStore;
pub use retry::RetryPolicy;

// Re-export the contract so backend users need a single import.
pub use stepseal_core::{RecordStore, ScopedRecord, StorageError};
