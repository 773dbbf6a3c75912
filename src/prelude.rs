//! Convenient imports for Stepseal.
//!
//! This module re-exports the most commonly used types so you can get
//! started with a single import:
//!
//! ```
//! use stepseal::prelude::*;
//!
//! let tracker = Tracker::in_memory();
//! assert_eq!(tracker.registry().len(), 6);
//! ```

// Main entry point
pub use crate::tracker::{TrackOutcome, Tracker, TrackerBuilder};

// Error handling
pub use crate::error::{Error, Result};

// Event model
pub use stepseal_core::{EventDraft, PipelineEvent, PipelineStep, StepStatus};

// Pipeline schemas
pub use stepseal_core::{builtin_registry, PipelineDefinition, PipelineRegistry};

// Checksum artifacts
pub use stepseal_core::{ChecksumRegistryEntry, PipelineChecksum, TamperCheck};
pub use stepseal_engine::{PipelineReceipt, ReceiptEntry};

// Storage contract and backends
pub use stepseal_core::{RecordStore, ScopedRecord};
pub use stepseal_storage::{KvStore, MemoryStore, RetryPolicy};

// Instrumented execution
pub use crate::instrument::{checksum_hex, StepRun, Tracked};

// Health rollups
pub use crate::health::{aggregate_handler_health, HandlerHealth};

// Session registry
pub use crate::session::SessionRegistry;

// Re-export serde_json for convenience
pub use serde_json::json;
