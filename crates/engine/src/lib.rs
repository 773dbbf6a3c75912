//! Checksum and receipt engine for stepseal
//!
//! Pure functions from event history to tamper-evident artifacts:
//! - [`compute_checksum`]: chain hash plus completion verdict
//! - [`compute_receipt`]: per-step audit trail with hash linkage
//! - [`chain_hash`]: just the hash, for comparisons
//!
//! Nothing here touches storage or clocks beyond stamping `computed_at`;
//! the same events always produce the same hashes.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chain;
pub mod receipt;

pub use chain::{chain_hash, chain_order, compute_checksum};
pub use receipt::{compute_receipt, PipelineReceipt, ReceiptEntry};
