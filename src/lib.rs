//! # Stepseal
//!
//! Tamper-evident event tracking for checkout pipelines.
//!
//! Stepseal records every step a checkout session takes (buyer validation,
//! payment, fulfillment, fraud checks) as an immutable event, and derives a
//! SHA-256 hash chain over each session's history. Any later mutation,
//! reordering, or deletion of stored events changes the chain hash, which
//! makes silent history edits detectable by comparing against a previously
//! snapshotted hash.
//!
//! ## Quick Start
//!
//! ```
//! use stepseal::prelude::*;
//!
//! // In-memory tracker with the builtin pipeline schemas
//! let tracker = Tracker::in_memory();
//! let definition = tracker.definition_for("physical_checkout").cloned().unwrap();
//!
//! // Record a step outcome
//! let event = EventDraft::new(
//!     "sess-42",
//!     "physical_checkout",
//!     PipelineStep::BuyerValidated,
//!     StepStatus::Success,
//! )
//! .with_handler("account-service")
//! .build()?;
//! tracker.track_event(&event, &definition)?;
//!
//! // Derive the tamper-evident verdict
//! let checksum = tracker.current_checksum("sess-42", &definition)?;
//! assert_eq!(checksum.steps_completed, 1);
//! assert!(!checksum.is_valid); // five required steps still missing
//! # Ok::<(), stepseal::Error>(())
//! ```
//!
//! Durable trackers persist to an embedded sled database and snapshot the
//! chain hash after every event:
//!
//! ```ignore
//! let tracker = Tracker::open("./checkout-history")?;
//! ```
//!
//! ## Layout
//!
//! - [`Tracker`] - the facade collaborators talk to
//! - [`EventDraft`] / [`PipelineEvent`] - event construction and validation
//! - [`PipelineRegistry`] - pipeline schemas (six builtin checkout flows)
//! - [`compute_checksum`] / [`compute_receipt`] - pure chain derivations
//! - [`MemoryStore`] / [`KvStore`] - storage backends behind [`RecordStore`]
//! - [`StepRun`] / [`Tracker::run_tracked`] - instrumented step execution
//! - [`aggregate_handler_health`] - per-integration health rollups

#![warn(missing_docs)]

mod error;
mod health;
mod instrument;
mod session;
mod tracker;

pub mod prelude;

// Re-export main entry points
pub use error::{Error, Result};
pub use tracker::{TrackOutcome, Tracker, TrackerBuilder};

// Re-export facade modules
pub use health::{aggregate_handler_health, HandlerHealth};
pub use instrument::{checksum_hex, StepRun, Tracked};
pub use session::SessionRegistry;

// Re-export the core model
pub use stepseal_core::{
    builtin_registry, validate_session_id, ChecksumRegistryEntry, EventDraft, PipelineChecksum,
    PipelineDefinition, PipelineEvent, PipelineRegistry, PipelineStep, RecordStore, ScopedRecord,
    StepStatus, StorageError, TamperCheck, ValidationError, CHECKSUM_HEX_LENGTH,
    MAX_SESSION_ID_LENGTH,
};

// Re-export the checksum engine
pub use stepseal_engine::{
    chain_hash, chain_order, compute_checksum, compute_receipt, PipelineReceipt, ReceiptEntry,
};

// Re-export storage backends
pub use stepseal_storage::{KvStore, MemoryStore, RetryPolicy};
