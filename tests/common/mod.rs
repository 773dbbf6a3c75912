//! Shared helpers for stepseal integration tests.
//!
//! Events built here carry pinned ids and timestamps so chain hashes are
//! reproducible across runs; helpers that go through the tracker leave id
//! and timestamp generation to [`EventDraft::build`].

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use stepseal::prelude::*;

/// Fixed base instant for deterministic histories.
pub const EPOCH: i64 = 1_700_000_000;

/// Deterministic timestamp `offset` seconds after the test epoch.
pub fn ts(offset: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(EPOCH + offset, 0).unwrap()
}

/// Event with pinned id and timestamp.
pub fn event_at(
    session: &str,
    pipeline: &str,
    step: PipelineStep,
    status: StepStatus,
    id: &str,
    offset: i64,
) -> PipelineEvent {
    EventDraft::new(session, pipeline, step, status)
        .with_id(id)
        .with_timestamp(ts(offset))
        .build()
        .unwrap()
}

/// Pinned success event for `physical_checkout`.
pub fn physical_success(session: &str, step: PipelineStep, id: &str, offset: i64) -> PipelineEvent {
    event_at(
        session,
        "physical_checkout",
        step,
        StepStatus::Success,
        id,
        offset,
    )
}

/// Pinned failure event for `physical_checkout`.
pub fn physical_failure(session: &str, step: PipelineStep, id: &str, offset: i64) -> PipelineEvent {
    event_at(
        session,
        "physical_checkout",
        step,
        StepStatus::Failure,
        id,
        offset,
    )
}

/// The builtin `physical_checkout` definition.
pub fn physical() -> PipelineDefinition {
    builtin_registry()
        .lookup("physical_checkout")
        .cloned()
        .unwrap()
}

/// The builtin `digital_checkout` definition.
pub fn digital() -> PipelineDefinition {
    builtin_registry()
        .lookup("digital_checkout")
        .cloned()
        .unwrap()
}

/// One success event per required `physical_checkout` step, in order.
pub fn complete_physical_session(session: &str) -> Vec<PipelineEvent> {
    physical()
        .required_steps()
        .iter()
        .enumerate()
        .map(|(index, step)| {
            physical_success(session, *step, &format!("evt-{:02}", index), index as i64)
        })
        .collect()
}
