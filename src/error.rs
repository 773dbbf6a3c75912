//! Unified error type for stepseal.
//!
//! This module wraps the member-crate errors into one enum so callers of
//! the facade handle a single type with a stable surface.

use stepseal_core::{StorageError, ValidationError};
use thiserror::Error;

/// All stepseal errors.
///
/// Missing or failed required steps are never errors: they are data,
/// reported through checksum verdicts and receipts. Errors are reserved
/// for rejected input and failing backends.
#[derive(Debug, Error)]
pub enum Error {
    /// An event or definition failed validation
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A storage backend failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for stepseal operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error was caused by rejected input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Check if this error came from a storage backend.
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Storage(_))
    }

    /// Check if this error may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Storage(e) if e.is_transient())
    }
}
