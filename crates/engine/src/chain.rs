//! Hash chain and completion verdict
//!
//! ## Chain construction
//!
//! Events are ordered by timestamp, ties broken by id, then folded into a
//! SHA-256 chain. Every link hashes the previous link, so changing any
//! event's payload checksums, reordering history, or dropping an event
//! changes every later link and therefore the final hash:
//!
//! ```text
//! link_0 = sha256("GENESIS:" + step_0 + ":" + in_0 + ":" + out_0)
//! link_n = sha256(link_{n-1} + ":" + step_n + ":" + in_n + ":" + out_n)
//! chain  = sha256(session_id + ":" + link_last)
//! ```
//!
//! Missing payload checksums hash as empty strings. A session with no
//! events hashes `session_id + ":EMPTY"`, which is still session-specific
//! and never an error. Folding the session id into the final hash keeps
//! structurally identical sessions distinguishable.
//!
//! ## Verdict
//!
//! The verdict counts distinct steps, so a retried step counts once:
//! completed means at least one success event, failed means the latest
//! settled (success or failure) event is a failure. Validity is exactly
//! "every required step has at least one success event". An unknown
//! pipeline type has no schema, so its verdict carries zero expected steps
//! and is vacuously valid.

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use stepseal_core::{PipelineChecksum, PipelineDefinition, PipelineEvent, PipelineStep, StepStatus};

/// Seed for the first link of every chain.
const GENESIS_SEED: &str = "GENESIS";

/// Stands in for the last link when a session has no events.
const EMPTY_MARKER: &str = "EMPTY";

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Order events for chaining: timestamp ascending, id as tie-break.
///
/// The tie-break makes the chain deterministic even when two events share
/// a timestamp, regardless of which order the backend returned them in.
pub fn chain_order(events: &[PipelineEvent]) -> Vec<&PipelineEvent> {
    let mut ordered: Vec<&PipelineEvent> = events.iter().collect();
    ordered.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
    ordered
}

/// Hash one link given the previous link's hex digest.
pub(crate) fn link_hash(previous: Option<&str>, event: &PipelineEvent) -> String {
    let seed = previous.unwrap_or(GENESIS_SEED);
    let input = event.input_checksum.as_deref().unwrap_or("");
    let output = event.output_checksum.as_deref().unwrap_or("");
    sha256_hex(&format!("{}:{}:{}:{}", seed, event.step, input, output))
}

/// Finalize a chain by folding in the session id.
pub(crate) fn finalize(session_id: &str, last_link: Option<&str>) -> String {
    sha256_hex(&format!(
        "{}:{}",
        session_id,
        last_link.unwrap_or(EMPTY_MARKER)
    ))
}

/// Distinct steps with at least one success event.
pub(crate) fn completed_steps(events: &[PipelineEvent]) -> BTreeSet<PipelineStep> {
    events
        .iter()
        .filter(|event| event.status == StepStatus::Success)
        .map(|event| event.step)
        .collect()
}

/// Compute the chain hash over a session's events.
///
/// Same ordering and folding as [`compute_checksum`], without the verdict.
pub fn chain_hash(session_id: &str, events: &[PipelineEvent]) -> String {
    let mut last: Option<String> = None;
    for event in chain_order(events) {
        last = Some(link_hash(last.as_deref(), event));
    }
    finalize(session_id, last.as_deref())
}

/// Compute the full verdict over a session's events.
///
/// Pure except for stamping `computed_at`. The events should be one
/// session's history as returned by the store; they are hashed exactly as
/// given (after ordering), with no deduplication.
///
/// Pass `None` for `definition` when the pipeline type is not registered:
/// the hash still computes and the verdict carries no schema expectations.
///
/// # Example
///
/// ```
/// use stepseal_core::{builtin_registry, EventDraft, PipelineStep, StepStatus};
/// use stepseal_engine::compute_checksum;
///
/// let definition = builtin_registry().lookup("physical_checkout");
/// let events = vec![EventDraft::new(
///     "sess-1",
///     "physical_checkout",
///     PipelineStep::BuyerValidated,
///     StepStatus::Success,
/// )
/// .build()
/// .unwrap()];
///
/// let checksum = compute_checksum("sess-1", "physical_checkout", &events, definition);
/// assert_eq!(checksum.steps_completed, 1);
/// assert!(!checksum.is_valid);
/// assert_eq!(checksum.chain_hash.len(), 64);
/// ```
pub fn compute_checksum(
    session_id: &str,
    pipeline_type: &str,
    events: &[PipelineEvent],
    definition: Option<&PipelineDefinition>,
) -> PipelineChecksum {
    let mut last: Option<String> = None;
    let mut last_settled: BTreeMap<PipelineStep, StepStatus> = BTreeMap::new();
    let mut succeeded: BTreeSet<PipelineStep> = BTreeSet::new();

    for event in chain_order(events) {
        last = Some(link_hash(last.as_deref(), event));
        if event.status == StepStatus::Success {
            succeeded.insert(event.step);
        }
        if event.status.is_settled() {
            last_settled.insert(event.step, event.status);
        }
    }

    let steps_failed = last_settled
        .values()
        .filter(|status| **status == StepStatus::Failure)
        .count();

    let (steps_expected, is_valid) = match definition {
        Some(definition) => (
            definition.steps_expected(),
            definition
                .required_steps()
                .iter()
                .all(|step| succeeded.contains(step)),
        ),
        // No schema: nothing is required, so nothing can be missing.
        None => (0, true),
    };

    PipelineChecksum {
        session_id: session_id.to_string(),
        pipeline_type: pipeline_type.to_string(),
        steps_expected,
        steps_completed: succeeded.len(),
        steps_failed,
        is_valid,
        chain_hash: finalize(session_id, last.as_deref()),
        computed_at: Utc::now(),
    }
}
