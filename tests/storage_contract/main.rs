//! Storage Contract Test Suite
//!
//! One behavioral contract, two backends. The assertions in this file are
//! generic over [`RecordStore`]; the `contract` module runs each of them
//! against both the in-memory store and the sled-backed store, and
//! `kv_durability` adds the persistence guarantees only sled makes.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run the whole contract suite
//! cargo test --test storage_contract
//!
//! # Run the sled persistence tests only
//! cargo test --test storage_contract kv_durability::
//! ```

use stepseal::prelude::*;

#[path = "../common/mod.rs"]
mod common;

// Test modules
mod contract;
mod kv_durability;

// =============================================================================
// SHARED CONTRACT ASSERTIONS
// =============================================================================

/// Stored records come back under their scope.
pub fn assert_store_then_list(store: &impl RecordStore<PipelineEvent>) {
    let event = common::physical_success("sess-1", PipelineStep::BuyerValidated, "evt-01", 0);

    assert!(store.store(&event).unwrap());

    let listed = store.list_by_scope("sess-1").unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0], event);
}

/// A second store of the same record id is ignored and reported.
pub fn assert_duplicate_id_ignored(store: &impl RecordStore<PipelineEvent>) {
    let event = common::physical_success("sess-1", PipelineStep::BuyerValidated, "evt-01", 0);

    assert!(store.store(&event).unwrap());
    assert!(!store.store(&event).unwrap());
    assert_eq!(store.list_by_scope("sess-1").unwrap().len(), 1);
}

/// Duplicate ids are global, not per scope: replaying an event under a
/// different session must not create a second copy.
pub fn assert_duplicate_id_is_global(store: &impl RecordStore<PipelineEvent>) {
    let original = common::physical_success("sess-1", PipelineStep::BuyerValidated, "evt-01", 0);
    let replayed = common::physical_success("sess-2", PipelineStep::BuyerValidated, "evt-01", 5);

    assert!(store.store(&original).unwrap());
    assert!(!store.store(&replayed).unwrap());
    assert!(store.list_by_scope("sess-2").unwrap().is_empty());
}

/// Scopes do not bleed into one another, including prefix-shaped ids.
pub fn assert_scope_isolation(store: &impl RecordStore<PipelineEvent>) {
    let short = common::physical_success("sess-1", PipelineStep::BuyerValidated, "evt-01", 0);
    let long = common::physical_success("sess-10", PipelineStep::BuyerValidated, "evt-02", 0);

    store.store(&short).unwrap();
    store.store(&long).unwrap();

    let listed = store.list_by_scope("sess-1").unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, "evt-01");
    assert_eq!(store.list_by_scope("sess-10").unwrap().len(), 1);
}

/// Unknown scopes read as empty, never as an error.
pub fn assert_unknown_scope_empty(store: &impl RecordStore<PipelineEvent>) {
    assert!(store.list_by_scope("sess-missing").unwrap().is_empty());
}

/// `clear` wipes records and the duplicate-id index.
pub fn assert_clear_resets(store: &impl RecordStore<PipelineEvent>) {
    let event = common::physical_success("sess-1", PipelineStep::BuyerValidated, "evt-01", 0);

    assert!(store.store(&event).unwrap());
    store.clear().unwrap();

    assert!(store.list_by_scope("sess-1").unwrap().is_empty());
    // The id is forgotten too, so the same event can be stored again.
    assert!(store.store(&event).unwrap());
}

/// Many records across several scopes all come back.
pub fn assert_multi_scope_fanout(store: &impl RecordStore<PipelineEvent>) {
    for session in 0..5 {
        for index in 0..4 {
            let event = common::physical_success(
                &format!("sess-{}", session),
                PipelineStep::ALL[index],
                &format!("evt-{}-{}", session, index),
                index as i64,
            );
            assert!(store.store(&event).unwrap());
        }
    }

    for session in 0..5 {
        let listed = store.list_by_scope(&format!("sess-{}", session)).unwrap();
        assert_eq!(listed.len(), 4);
        assert!(listed
            .iter()
            .all(|event| event.session_id == format!("sess-{}", session)));
    }
}
