//! Main tracker entry point.
//!
//! This module provides the `Tracker` struct, the single point where
//! pipeline events enter the system. It composes an event store, a
//! checksum registry store, the pipeline registry, and the session
//! registry behind one `Send + Sync` facade.

use crate::error::Result;
use crate::health::{aggregate_handler_health, HandlerHealth};
use crate::session::SessionRegistry;
use std::path::Path;
use std::sync::Arc;
use stepseal_core::{
    ChecksumRegistryEntry, PipelineChecksum, PipelineDefinition, PipelineEvent, PipelineRegistry,
    RecordStore, TamperCheck, ValidationError,
};
use stepseal_engine::{chain_order, compute_checksum, compute_receipt, PipelineReceipt};
use stepseal_storage::{open_database, KvStore, MemoryStore, RetryPolicy};
use tracing::{debug, info, warn};

/// What happened to one tracked event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackOutcome {
    /// Whether the event was appended (`false` means its id was already
    /// stored and the call was a no-op)
    pub stored: bool,
    /// Id of the auto-snapshot taken after the append, when enabled
    pub snapshot_id: Option<String>,
}

/// The pipeline event tracker.
///
/// Collaborators construct a [`PipelineEvent`] after completing a checkout
/// step and hand it to [`Tracker::track_event`]; everything else (chain
/// hashes, receipts, tamper checks, handler health) is derived reads over
/// the stored history. Create a tracker with [`Tracker::in_memory`],
/// [`Tracker::open`], or [`Tracker::builder`].
///
/// All methods take `&self`; wrap the tracker in an [`Arc`] to share it
/// across threads. Calls for different sessions never block one another.
///
/// # Example
///
/// ```
/// use stepseal::prelude::*;
///
/// let tracker = Tracker::in_memory();
/// let definition = tracker.definition_for("physical_checkout").cloned().unwrap();
///
/// let event = EventDraft::new(
///     "sess-42",
///     "physical_checkout",
///     PipelineStep::BuyerValidated,
///     StepStatus::Success,
/// )
/// .build()?;
///
/// let outcome = tracker.track_event(&event, &definition)?;
/// assert!(outcome.stored);
///
/// let checksum = tracker.current_checksum("sess-42", &definition)?;
/// assert_eq!(checksum.steps_completed, 1);
/// # Ok::<(), stepseal::Error>(())
/// ```
pub struct Tracker {
    /// Event history, keyed by session
    events: Arc<dyn RecordStore<PipelineEvent>>,

    /// Checksum registry, keyed by session
    snapshots: Arc<dyn RecordStore<ChecksumRegistryEntry>>,

    /// Known pipeline schemas
    registry: Arc<PipelineRegistry>,

    /// Sessions seen by this tracker instance
    sessions: SessionRegistry,

    /// Snapshot the checksum registry after every stored event
    auto_snapshot: bool,
}

impl Tracker {
    /// Create a tracker over in-memory stores and the builtin registry.
    ///
    /// No files, no configuration. History is gone when the tracker is
    /// dropped. This is the right constructor for tests and for callers
    /// that persist elsewhere.
    pub fn in_memory() -> Self {
        Self {
            events: Arc::new(MemoryStore::new()),
            snapshots: Arc::new(MemoryStore::new()),
            registry: Arc::new(PipelineRegistry::builtin()),
            sessions: SessionRegistry::new(),
            auto_snapshot: false,
        }
    }

    /// Open a durable tracker at the given path.
    ///
    /// Events and snapshots share one sled database under `path`, storage
    /// calls run under [`RetryPolicy::production`], and auto-snapshot is
    /// enabled so every stored event leaves a registry entry behind.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let tracker = Tracker::open("./checkout-history")?;
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder()
            .path(path)
            .retry(RetryPolicy::production())
            .auto_snapshot(true)
            .build()
    }

    /// Create a builder for tracker configuration.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let tracker = Tracker::builder()
    ///     .path("./checkout-history")
    ///     .auto_snapshot(true)
    ///     .build()?;
    /// ```
    pub fn builder() -> TrackerBuilder {
        TrackerBuilder::new()
    }

    /// Validate and append one event, then auto-snapshot if enabled.
    ///
    /// The event must pass [`PipelineEvent::validate`] and carry the same
    /// `pipeline_type` as `definition`. A duplicate event id is not an
    /// error: the append is skipped and the outcome reports
    /// `stored: false` (and no snapshot is taken, since the history did
    /// not change).
    pub fn track_event(
        &self,
        event: &PipelineEvent,
        definition: &PipelineDefinition,
    ) -> Result<TrackOutcome> {
        event.validate()?;
        if event.pipeline_type != definition.pipeline_type() {
            return Err(ValidationError::DefinitionMismatch {
                event: event.pipeline_type.clone(),
                definition: definition.pipeline_type().to_string(),
            }
            .into());
        }

        self.sessions.observe(&event.session_id);
        let stored = self.events.store(event)?;
        debug!(
            session_id = %event.session_id,
            step = %event.step,
            status = %event.status,
            stored,
            "tracked pipeline event"
        );

        let snapshot_id = if self.auto_snapshot && stored {
            let entry = self.snapshot(
                &event.session_id,
                definition,
                Some(format!("auto-snapshot after event: {}", event.step)),
            )?;
            Some(entry.id)
        } else {
            None
        };

        Ok(TrackOutcome {
            stored,
            snapshot_id,
        })
    }

    /// All stored events for a session, as the backend returns them.
    ///
    /// No filtering and no ordering guarantee; the checksum engine orders
    /// for itself. An unknown session yields an empty list.
    pub fn events(&self, session_id: &str) -> Result<Vec<PipelineEvent>> {
        Ok(self.events.list_by_scope(session_id)?)
    }

    /// Recompute the live checksum for a session.
    ///
    /// Always derived from current history, never read back from the
    /// checksum registry.
    pub fn current_checksum(
        &self,
        session_id: &str,
        definition: &PipelineDefinition,
    ) -> Result<PipelineChecksum> {
        let events = self.events.list_by_scope(session_id)?;
        Ok(compute_checksum(
            session_id,
            definition.pipeline_type(),
            &events,
            Some(definition),
        ))
    }

    /// The most recent checksum snapshot for a session, if any.
    ///
    /// Newest by `created_at`, ties broken by snapshot id.
    pub fn latest_snapshot(&self, session_id: &str) -> Result<Option<ChecksumRegistryEntry>> {
        let mut entries = self.snapshots.list_by_scope(session_id)?;
        entries.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(entries.pop())
    }

    /// Take an explicit checksum snapshot right now.
    ///
    /// Computes the live checksum and appends it to the checksum registry
    /// with the given notes. Works for empty sessions too; the snapshot
    /// then pins the empty-chain hash.
    pub fn snapshot_now(
        &self,
        session_id: &str,
        definition: &PipelineDefinition,
        notes: Option<String>,
    ) -> Result<ChecksumRegistryEntry> {
        self.snapshot(session_id, definition, notes)
    }

    /// Build the per-step audit receipt for a session.
    pub fn receipt(
        &self,
        session_id: &str,
        definition: &PipelineDefinition,
    ) -> Result<PipelineReceipt> {
        let events = self.events.list_by_scope(session_id)?;
        Ok(compute_receipt(
            session_id,
            definition.pipeline_type(),
            &events,
            Some(definition),
        ))
    }

    /// Compare the live chain hash against the latest snapshot.
    ///
    /// `diverged: true` means stored history no longer reproduces the
    /// hash that was snapshotted: events were altered, dropped, or
    /// injected since the last known-good point. With no snapshot on
    /// record there is nothing to compare and `diverged` is `false`.
    pub fn tamper_check(
        &self,
        session_id: &str,
        definition: &PipelineDefinition,
    ) -> Result<TamperCheck> {
        let live = self.current_checksum(session_id, definition)?;
        let snapshot = self.latest_snapshot(session_id)?;
        let diverged = snapshot
            .as_ref()
            .map(|entry| entry.chain_hash != live.chain_hash)
            .unwrap_or(false);

        if diverged {
            warn!(
                session_id = %session_id,
                live_hash = %live.chain_hash,
                "chain hash diverged from latest snapshot"
            );
        }

        Ok(TamperCheck {
            session_id: session_id.to_string(),
            live_hash: live.chain_hash,
            snapshot_hash: snapshot.as_ref().map(|entry| entry.chain_hash.clone()),
            snapshot_id: snapshot.map(|entry| entry.id),
            diverged,
        })
    }

    /// Sessions this tracker has seen, sorted.
    pub fn sessions(&self) -> Vec<String> {
        self.sessions.sessions()
    }

    /// Per-handler health over a session's stored events.
    pub fn handler_health(&self, session_id: &str) -> Result<Vec<HandlerHealth>> {
        let events = self.events.list_by_scope(session_id)?;
        Ok(aggregate_handler_health(&events))
    }

    /// Look up a pipeline definition in this tracker's registry.
    pub fn definition_for(&self, pipeline_type: &str) -> Option<&PipelineDefinition> {
        self.registry.lookup(pipeline_type)
    }

    /// The pipeline registry this tracker validates against.
    pub fn registry(&self) -> &PipelineRegistry {
        &self.registry
    }
}

/// Builder for tracker configuration.
///
/// Every dependency is injectable; anything left unset falls back to a
/// sensible default (in-memory stores, builtin registry, no retries,
/// auto-snapshot off). Setting a `path` switches the unset stores to a
/// shared sled database at that path.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use stepseal::prelude::*;
///
/// let events: Arc<MemoryStore<PipelineEvent>> = Arc::new(MemoryStore::new());
/// let tracker = Tracker::builder()
///     .event_store(events.clone())
///     .auto_snapshot(true)
///     .build()?;
/// # Ok::<(), stepseal::Error>(())
/// ```
pub struct TrackerBuilder {
    events: Option<Arc<dyn RecordStore<PipelineEvent>>>,
    snapshots: Option<Arc<dyn RecordStore<ChecksumRegistryEntry>>>,
    registry: Option<PipelineRegistry>,
    path: Option<std::path::PathBuf>,
    retry: Option<RetryPolicy>,
    auto_snapshot: bool,
}

impl TrackerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            events: None,
            snapshots: None,
            registry: None,
            path: None,
            retry: None,
            auto_snapshot: false,
        }
    }

    /// Use a specific event store.
    pub fn event_store(mut self, store: Arc<dyn RecordStore<PipelineEvent>>) -> Self {
        self.events = Some(store);
        self
    }

    /// Use a specific checksum registry store.
    pub fn snapshot_store(mut self, store: Arc<dyn RecordStore<ChecksumRegistryEntry>>) -> Self {
        self.snapshots = Some(store);
        self
    }

    /// Replace the builtin pipeline registry.
    pub fn registry(mut self, registry: PipelineRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Back unset stores with a sled database at this path.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Retry policy for sled-backed stores opened via [`path`](Self::path).
    ///
    /// Has no effect on stores injected directly.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Snapshot the checksum registry after every stored event.
    pub fn auto_snapshot(mut self, enabled: bool) -> Self {
        self.auto_snapshot = enabled;
        self
    }

    /// Build the tracker.
    ///
    /// Fails only when a sled database was requested via
    /// [`path`](Self::path) and cannot be opened.
    pub fn build(self) -> Result<Tracker> {
        let mut events = self.events;
        let mut snapshots = self.snapshots;

        if let Some(path) = &self.path {
            let retry = self.retry.unwrap_or_else(RetryPolicy::production);
            let db = open_database(path)?;
            if events.is_none() {
                events = Some(Arc::new(KvStore::with_db(&db, retry)?));
            }
            if snapshots.is_none() {
                snapshots = Some(Arc::new(KvStore::with_db(&db, retry)?));
            }
        }

        Ok(Tracker {
            events: events.unwrap_or_else(|| Arc::new(MemoryStore::new())),
            snapshots: snapshots.unwrap_or_else(|| Arc::new(MemoryStore::new())),
            registry: Arc::new(self.registry.unwrap_or_else(PipelineRegistry::builtin)),
            sessions: SessionRegistry::new(),
            auto_snapshot: self.auto_snapshot,
        })
    }
}

impl Default for TrackerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracker {
    /// Compute the live checksum and append it to the checksum registry.
    fn snapshot(
        &self,
        session_id: &str,
        definition: &PipelineDefinition,
        notes: Option<String>,
    ) -> Result<ChecksumRegistryEntry> {
        let events = self.events.list_by_scope(session_id)?;
        let checksum = compute_checksum(
            session_id,
            definition.pipeline_type(),
            &events,
            Some(definition),
        );
        let event_ids = chain_order(&events)
            .into_iter()
            .map(|event| event.id.clone())
            .collect();
        let entry = ChecksumRegistryEntry::from_checksum(&checksum, event_ids, notes);
        self.snapshots.store(&entry)?;
        info!(
            session_id = %session_id,
            snapshot_id = %entry.id,
            chain_hash = %entry.chain_hash,
            "recorded checksum snapshot"
        );
        Ok(entry)
    }
}
