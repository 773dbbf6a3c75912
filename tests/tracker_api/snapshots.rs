//! Checksum snapshots: auto-snapshot per event, explicit snapshots, and
//! divergence detection against mutated history.

use crate::*;
use stepseal::prelude::*;
use stepseal::RecordStore;

// =============================================================================
// AUTO-SNAPSHOT
// =============================================================================

#[test]
fn test_auto_snapshot_records_one_entry_per_stored_event() {
    let (tracker, _events, snapshots) = tracker_with_handles();
    let definition = physical();

    tracker
        .track_event(
            &success("sess-1", PipelineStep::BuyerValidated),
            &definition,
        )
        .unwrap();
    tracker
        .track_event(
            &success("sess-1", PipelineStep::AddressValidated),
            &definition,
        )
        .unwrap();

    let entries = snapshots.list_by_scope("sess-1").unwrap();
    assert_eq!(entries.len(), 2);
}

#[test]
fn test_auto_snapshot_carries_the_step_note() {
    let tracker = snapshotting_tracker();
    let definition = physical();

    let outcome = tracker
        .track_event(
            &success("sess-1", PipelineStep::BuyerValidated),
            &definition,
        )
        .unwrap();
    assert!(outcome.snapshot_id.is_some());

    let snapshot = tracker.latest_snapshot("sess-1").unwrap().unwrap();
    assert_eq!(Some(snapshot.id), outcome.snapshot_id);
    assert_eq!(
        snapshot.notes.as_deref(),
        Some("auto-snapshot after event: buyer_validated")
    );
}

#[test]
fn test_auto_snapshot_matches_live_checksum() {
    let tracker = snapshotting_tracker();
    let definition = physical();

    tracker
        .track_event(
            &success("sess-1", PipelineStep::BuyerValidated),
            &definition,
        )
        .unwrap();

    let snapshot = tracker.latest_snapshot("sess-1").unwrap().unwrap();
    let live = tracker.current_checksum("sess-1", &definition).unwrap();
    assert_eq!(snapshot.chain_hash, live.chain_hash);
    assert_eq!(snapshot.steps_completed, 1);
}

#[test]
fn test_duplicate_event_does_not_snapshot() {
    let (tracker, _events, snapshots) = tracker_with_handles();
    let definition = physical();
    let event = success("sess-1", PipelineStep::BuyerValidated);

    let first = tracker.track_event(&event, &definition).unwrap();
    let replay = tracker.track_event(&event, &definition).unwrap();

    assert!(first.snapshot_id.is_some());
    assert!(replay.snapshot_id.is_none());
    assert_eq!(snapshots.list_by_scope("sess-1").unwrap().len(), 1);
}

#[test]
fn test_disabled_auto_snapshot_records_nothing() {
    let tracker = tracker();
    let definition = physical();

    let outcome = tracker
        .track_event(
            &success("sess-1", PipelineStep::BuyerValidated),
            &definition,
        )
        .unwrap();

    assert!(outcome.snapshot_id.is_none());
    assert!(tracker.latest_snapshot("sess-1").unwrap().is_none());
}

// =============================================================================
// EXPLICIT SNAPSHOTS
// =============================================================================

#[test]
fn test_latest_snapshot_returns_the_newest() {
    let tracker = tracker();
    let definition = physical();

    tracker
        .track_event(
            &success("sess-1", PipelineStep::BuyerValidated),
            &definition,
        )
        .unwrap();
    tracker
        .snapshot_now("sess-1", &definition, Some("before payment".to_string()))
        .unwrap();
    tracker
        .track_event(
            &success("sess-1", PipelineStep::PaymentInitiated),
            &definition,
        )
        .unwrap();
    let second = tracker
        .snapshot_now("sess-1", &definition, Some("after payment".to_string()))
        .unwrap();

    let latest = tracker.latest_snapshot("sess-1").unwrap().unwrap();
    assert_eq!(latest.id, second.id);
    assert_eq!(latest.notes.as_deref(), Some("after payment"));
    assert_eq!(latest.steps_completed, 2);
}

#[test]
fn test_snapshot_event_ids_follow_chain_order() {
    let tracker = tracker();
    let definition = physical();

    // Track out of chronological order; the snapshot lists chain order.
    let late =
        crate::common::physical_success("sess-1", PipelineStep::AddressValidated, "evt-late", 10);
    let early =
        crate::common::physical_success("sess-1", PipelineStep::BuyerValidated, "evt-early", 1);
    tracker.track_event(&late, &definition).unwrap();
    tracker.track_event(&early, &definition).unwrap();

    let snapshot = tracker.snapshot_now("sess-1", &definition, None).unwrap();
    assert_eq!(snapshot.event_ids, vec!["evt-early", "evt-late"]);
}

#[test]
fn test_empty_session_snapshot_pins_the_empty_chain() {
    let tracker = tracker();
    let definition = physical();

    let snapshot = tracker.snapshot_now("sess-empty", &definition, None).unwrap();

    assert_eq!(snapshot.chain_hash, stepseal::chain_hash("sess-empty", &[]));
    assert!(snapshot.event_ids.is_empty());
    assert_eq!(snapshot.steps_completed, 0);
}

// =============================================================================
// TAMPER DETECTION
// =============================================================================

#[test]
fn test_untouched_history_does_not_diverge() {
    let tracker = snapshotting_tracker();
    let definition = physical();

    tracker
        .track_event(
            &success("sess-1", PipelineStep::BuyerValidated),
            &definition,
        )
        .unwrap();

    let check = tracker.tamper_check("sess-1", &definition).unwrap();
    assert!(!check.diverged);
    assert_eq!(check.snapshot_hash.as_deref(), Some(check.live_hash.as_str()));
}

#[test]
fn test_no_snapshot_means_no_divergence() {
    let tracker = tracker();
    let definition = physical();

    tracker
        .track_event(
            &success("sess-1", PipelineStep::BuyerValidated),
            &definition,
        )
        .unwrap();

    let check = tracker.tamper_check("sess-1", &definition).unwrap();
    assert!(!check.diverged);
    assert!(check.snapshot_hash.is_none());
    assert!(check.snapshot_id.is_none());
}

#[test]
fn test_mutated_history_diverges_from_snapshot() {
    let (tracker, events, _snapshots) = tracker_with_handles();
    let definition = physical();

    tracker
        .track_event(
            &success("sess-1", PipelineStep::BuyerValidated),
            &definition,
        )
        .unwrap();
    tracker
        .track_event(
            &success("sess-1", PipelineStep::PaymentInitiated),
            &definition,
        )
        .unwrap();

    // Rewrite history behind the facade: same events, one checksum edited.
    let mut history = events.list_by_scope("sess-1").unwrap();
    events.clear().unwrap();
    history[0].input_checksum = Some(format!("{:064x}", 0xbadu64));
    for event in &history {
        events.store(event).unwrap();
    }

    let check = tracker.tamper_check("sess-1", &definition).unwrap();
    assert!(check.diverged);
    assert_ne!(check.snapshot_hash.as_deref(), Some(check.live_hash.as_str()));
    assert!(check.snapshot_id.is_some());
}

#[test]
fn test_dropped_event_diverges_from_snapshot() {
    let (tracker, events, _snapshots) = tracker_with_handles();
    let definition = physical();

    tracker
        .track_event(
            &success("sess-1", PipelineStep::BuyerValidated),
            &definition,
        )
        .unwrap();
    tracker
        .track_event(
            &success("sess-1", PipelineStep::PaymentInitiated),
            &definition,
        )
        .unwrap();

    let history = events.list_by_scope("sess-1").unwrap();
    events.clear().unwrap();
    events.store(&history[0]).unwrap();

    let check = tracker.tamper_check("sess-1", &definition).unwrap();
    assert!(check.diverged);
}
