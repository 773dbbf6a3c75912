//! Error types shared across the stepseal crates.
//!
//! Validation failures and storage failures are kept as separate enums so
//! callers can branch on the class of failure without string matching. The
//! facade crate wraps both into a single user-facing `Error`.

use thiserror::Error;

/// Rejection reasons for malformed events and definitions.
///
/// Every variant corresponds to one validation rule. Validation never
/// silently repairs input: a bad field is reported, not normalized away.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Step name is not part of the known pipeline vocabulary
    #[error("unknown pipeline step: {0}")]
    UnknownStep(String),

    /// Status name is not one of success/failure/pending/skipped
    #[error("unknown step status: {0}")]
    UnknownStatus(String),

    /// Session id is empty, too long, or contains characters outside
    /// `[A-Za-z0-9._:-]`
    #[error("invalid session id: {0}")]
    InvalidSessionId(String),

    /// Event id must be non-empty when supplied explicitly
    #[error("event id cannot be empty")]
    EmptyEventId,

    /// Pipeline type must be non-empty
    #[error("pipeline type cannot be empty")]
    EmptyPipelineType,

    /// Checksum is not a 64-character ASCII hex digest
    #[error("invalid {field} checksum: {reason}")]
    InvalidChecksum {
        /// Which checksum field was rejected (`input` or `output`)
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// Duration must be finite and non-negative
    #[error("invalid duration_ms: {0}")]
    InvalidDuration(f64),

    /// A step was listed as both required and optional in a definition
    #[error("step listed as both required and optional: {0}")]
    OverlappingSteps(String),

    /// A definition must require at least one step
    #[error("definition has no required steps: {0}")]
    EmptyRequiredSteps(String),

    /// Event's pipeline type does not match the definition it was tracked
    /// against
    #[error("event pipeline type '{event}' does not match definition '{definition}'")]
    DefinitionMismatch {
        /// Pipeline type carried by the event
        event: String,
        /// Pipeline type of the definition
        definition: String,
    },
}

/// Failures raised by storage backends.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    /// The backing store failed (I/O, sled, lock poisoning)
    #[error("backend error: {0}")]
    Backend(String),

    /// A record could not be serialized or deserialized
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    /// Check if this error may succeed on retry.
    ///
    /// Backend failures are considered transient; serialization failures are
    /// deterministic and retrying them wastes time.
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Backend(_))
    }
}
