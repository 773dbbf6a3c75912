//! Chain-hash verdicts and persisted snapshots
//!
//! [`PipelineChecksum`] is the derived verdict over a session's history:
//! the chain hash plus completion counters. It is recomputed from events on
//! every request and never stored.
//!
//! [`ChecksumRegistryEntry`] is a point-in-time snapshot of a verdict,
//! persisted append-only. Comparing a stored snapshot against a freshly
//! computed checksum is the tamper-evidence mechanism: if history was
//! altered after the snapshot was taken, the chain hashes diverge.

use crate::store::ScopedRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Derived verdict over one session's event history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineChecksum {
    /// Session the verdict covers
    pub session_id: String,
    /// Pipeline type the verdict was computed against
    pub pipeline_type: String,
    /// Schema size: required plus optional steps (0 for unknown types)
    pub steps_expected: usize,
    /// Distinct steps with at least one success event
    pub steps_completed: usize,
    /// Distinct steps whose latest settled event is a failure
    pub steps_failed: usize,
    /// Whether every required step has at least one success event
    pub is_valid: bool,
    /// SHA-256 chain hash over the ordered history, 64 hex chars
    pub chain_hash: String,
    /// When the verdict was computed
    pub computed_at: DateTime<Utc>,
}

/// Persisted snapshot of a [`PipelineChecksum`].
///
/// Entries are append-only: once written they are never mutated, so the
/// snapshot trail itself is trustworthy history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumRegistryEntry {
    /// Snapshot record id (`snap-<uuid>`)
    pub id: String,
    /// Session the snapshot covers
    pub session_id: String,
    /// Pipeline type the verdict was computed against
    pub pipeline_type: String,
    /// Chain hash at snapshot time
    pub chain_hash: String,
    /// Schema size at snapshot time
    pub steps_expected: usize,
    /// Completed-step count at snapshot time
    pub steps_completed: usize,
    /// Failed-step count at snapshot time
    pub steps_failed: usize,
    /// Validity verdict at snapshot time
    pub is_valid: bool,
    /// When the snapshot was taken
    pub created_at: DateTime<Utc>,
    /// Why the snapshot was taken
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Ids of the events the chain covered, in chain order
    pub event_ids: Vec<String>,
}

impl ChecksumRegistryEntry {
    /// Snapshot a computed checksum.
    ///
    /// Generates the snapshot id and stamps `created_at`. `event_ids` must
    /// be the ids of the hashed events in chain order so an auditor can
    /// re-fetch exactly the covered history.
    pub fn from_checksum(
        checksum: &PipelineChecksum,
        event_ids: Vec<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: format!("snap-{}", Uuid::new_v4()),
            session_id: checksum.session_id.clone(),
            pipeline_type: checksum.pipeline_type.clone(),
            chain_hash: checksum.chain_hash.clone(),
            steps_expected: checksum.steps_expected,
            steps_completed: checksum.steps_completed,
            steps_failed: checksum.steps_failed,
            is_valid: checksum.is_valid,
            created_at: Utc::now(),
            notes,
            event_ids,
        }
    }
}

impl ScopedRecord for ChecksumRegistryEntry {
    const KIND: &'static str = "checksums";

    fn record_id(&self) -> &str {
        &self.id
    }

    fn scope_key(&self) -> &str {
        &self.session_id
    }

    fn partition(&self) -> &str {
        &self.pipeline_type
    }
}

/// Result of comparing the live chain hash against the latest snapshot.
///
/// This is the boundary consumed by fraud scoring: `diverged` means the
/// stored history no longer reproduces the hash that was snapshotted.
/// With no snapshot on record there is nothing to compare, so `diverged`
/// is `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TamperCheck {
    /// Session that was checked
    pub session_id: String,
    /// Chain hash recomputed from current history
    pub live_hash: String,
    /// Chain hash recorded by the latest snapshot, if one exists
    pub snapshot_hash: Option<String>,
    /// Id of the snapshot compared against, if one exists
    pub snapshot_id: Option<String>,
    /// Whether live and snapshot hashes disagree
    pub diverged: bool,
}
