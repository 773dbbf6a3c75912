//! Persistence guarantees of the sled backend across process restarts,
//! simulated by dropping and reopening the store.

use crate::*;
use std::sync::Arc;
use stepseal::prelude::*;
use stepseal_storage::open_database;

#[test]
fn test_records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records");
    let event = common::physical_success("sess-1", PipelineStep::BuyerValidated, "evt-01", 0);

    {
        let store: KvStore<PipelineEvent> = KvStore::open(&path).unwrap();
        assert!(store.store(&event).unwrap());
    }

    let reopened: KvStore<PipelineEvent> = KvStore::open(&path).unwrap();
    let listed = reopened.list_by_scope("sess-1").unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0], event);
}

#[test]
fn test_duplicate_detection_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records");
    let event = common::physical_success("sess-1", PipelineStep::BuyerValidated, "evt-01", 0);

    {
        let store: KvStore<PipelineEvent> = KvStore::open(&path).unwrap();
        assert!(store.store(&event).unwrap());
    }

    let reopened: KvStore<PipelineEvent> = KvStore::open(&path).unwrap();
    assert!(!reopened.store(&event).unwrap());
    assert_eq!(reopened.list_by_scope("sess-1").unwrap().len(), 1);
}

#[test]
fn test_clear_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records");
    let event = common::physical_success("sess-1", PipelineStep::BuyerValidated, "evt-01", 0);

    {
        let store: KvStore<PipelineEvent> = KvStore::open(&path).unwrap();
        store.store(&event).unwrap();
        store.clear().unwrap();
    }

    let reopened: KvStore<PipelineEvent> = KvStore::open(&path).unwrap();
    assert!(reopened.list_by_scope("sess-1").unwrap().is_empty());
    assert!(reopened.store(&event).unwrap());
}

#[test]
fn test_event_and_snapshot_kinds_share_one_database() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_database(dir.path().join("shared")).unwrap();

    let events: KvStore<PipelineEvent> = KvStore::with_db(&db, RetryPolicy::default()).unwrap();
    let snapshots: KvStore<ChecksumRegistryEntry> =
        KvStore::with_db(&db, RetryPolicy::default()).unwrap();

    let event = common::physical_success("sess-1", PipelineStep::BuyerValidated, "evt-01", 0);
    events.store(&event).unwrap();

    let checksum = stepseal::compute_checksum("sess-1", "physical_checkout", &[event], None);
    let entry = ChecksumRegistryEntry::from_checksum(&checksum, vec!["evt-01".to_string()], None);
    snapshots.store(&entry).unwrap();

    assert_eq!(events.list_by_scope("sess-1").unwrap().len(), 1);
    assert_eq!(snapshots.list_by_scope("sess-1").unwrap().len(), 1);

    // Clearing one kind leaves the other alone.
    events.clear().unwrap();
    assert!(events.list_by_scope("sess-1").unwrap().is_empty());
    assert_eq!(snapshots.list_by_scope("sess-1").unwrap().len(), 1);
}

#[test]
fn test_durable_tracker_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracker");
    let definition = common::physical();

    let chain_before = {
        let tracker = Tracker::open(&path).unwrap();
        let event = EventDraft::new(
            "sess-1",
            "physical_checkout",
            PipelineStep::BuyerValidated,
            StepStatus::Success,
        )
        .build()
        .unwrap();
        tracker.track_event(&event, &definition).unwrap();
        tracker
            .current_checksum("sess-1", &definition)
            .unwrap()
            .chain_hash
    };

    let tracker = Tracker::open(&path).unwrap();
    assert_eq!(tracker.events("sess-1").unwrap().len(), 1);
    assert_eq!(
        tracker
            .current_checksum("sess-1", &definition)
            .unwrap()
            .chain_hash,
        chain_before
    );

    // The auto-snapshot taken before the restart is still on record.
    let snapshot = tracker.latest_snapshot("sess-1").unwrap().unwrap();
    assert_eq!(snapshot.chain_hash, chain_before);
    let check = tracker.tamper_check("sess-1", &definition).unwrap();
    assert!(!check.diverged);
}

#[test]
fn test_concurrent_sessions_on_one_database() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<KvStore<PipelineEvent>> =
        Arc::new(KvStore::open(dir.path().join("records")).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for index in 0..10 {
                    let event = common::physical_success(
                        &format!("sess-{}", worker),
                        PipelineStep::BuyerValidated,
                        &format!("evt-{}-{}", worker, index),
                        index as i64,
                    );
                    assert!(store.store(&event).unwrap());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for worker in 0..4 {
        let listed = store.list_by_scope(&format!("sess-{}", worker)).unwrap();
        assert_eq!(listed.len(), 10);
    }
}
