//! Core types and contracts for stepseal
//!
//! This crate defines the fundamental vocabulary shared by every layer:
//! - [`PipelineEvent`]: one recorded step execution in a checkout session
//! - [`PipelineStep`] / [`StepStatus`]: closed enumerations of the pipeline vocabulary
//! - [`PipelineDefinition`] / [`PipelineRegistry`]: required/optional step schemas
//! - [`PipelineChecksum`] / [`ChecksumRegistryEntry`]: chain-hash verdicts and snapshots
//! - [`RecordStore`] / [`ScopedRecord`]: the storage contract backends implement
//!
//! No I/O happens here. Hashing lives in `stepseal-engine`, backends in
//! `stepseal-storage`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checksum;
pub mod error;
pub mod event;
pub mod registry;
pub mod step;
pub mod store;

pub use checksum::{ChecksumRegistryEntry, PipelineChecksum, TamperCheck};
pub use error::{StorageError, ValidationError};
pub use event::{
    validate_session_id, EventDraft, PipelineEvent, CHECKSUM_HEX_LENGTH, MAX_SESSION_ID_LENGTH,
};
pub use registry::{builtin_registry, PipelineDefinition, PipelineRegistry};
pub use step::{PipelineStep, StepStatus};
pub use store::{RecordStore, ScopedRecord};
