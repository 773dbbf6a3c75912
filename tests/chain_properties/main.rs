//! Chain Derivation Test Suite
//!
//! End-to-end properties of the checksum engine over realistic checkout
//! histories: completion verdicts, chain-hash determinism, and tamper
//! sensitivity.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all chain tests
//! cargo test --test chain_properties
//!
//! # Run the verdict scenarios only
//! cargo test --test chain_properties scenarios::
//! ```

#[path = "../common/mod.rs"]
mod common;
