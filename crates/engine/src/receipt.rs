//! Receipt generation
//!
//! A receipt is the auditable expansion of a checksum: the same chain walk,
//! but keeping every intermediate link so each recorded step carries its
//! own hash and its predecessor's. An auditor holding the receipt and the
//! raw events can recompute every link and locate exactly where a tampered
//! history diverges.

use crate::chain::{chain_order, completed_steps, compute_checksum, link_hash};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stepseal_core::{PipelineChecksum, PipelineDefinition, PipelineEvent, PipelineStep, StepStatus};

/// One chained entry of a receipt, in chain order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptEntry {
    /// Id of the event this entry covers
    pub event_id: String,
    /// Step that executed
    pub step: PipelineStep,
    /// Outcome of the execution
    pub status: StepStatus,
    /// Retry counter of the execution
    pub sequence: u32,
    /// Input payload checksum as recorded
    pub input_checksum: Option<String>,
    /// Output payload checksum as recorded
    pub output_checksum: Option<String>,
    /// This entry's chain link hash
    pub step_hash: String,
    /// Previous entry's link hash; `None` marks the genesis entry
    pub previous_hash: Option<String>,
    /// When the execution was recorded
    pub timestamp: DateTime<Utc>,
}

/// Tamper-evident audit trail for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReceipt {
    /// The verdict the entries add up to
    pub checksum: PipelineChecksum,
    /// Chained entries in chain order
    pub entries: Vec<ReceiptEntry>,
    /// Required steps with no success event, in definition order
    pub missing_steps: Vec<PipelineStep>,
}

/// Build the receipt for a session's events.
///
/// Ordering and hashing match [`compute_checksum`] exactly; the embedded
/// checksum is computed from the same events. With `definition = None`
/// there is no schema, so `missing_steps` is empty.
pub fn compute_receipt(
    session_id: &str,
    pipeline_type: &str,
    events: &[PipelineEvent],
    definition: Option<&PipelineDefinition>,
) -> PipelineReceipt {
    let ordered = chain_order(events);

    let mut entries = Vec::with_capacity(ordered.len());
    let mut previous: Option<String> = None;
    for event in ordered {
        let step_hash = link_hash(previous.as_deref(), event);
        entries.push(ReceiptEntry {
            event_id: event.id.clone(),
            step: event.step,
            status: event.status,
            sequence: event.sequence,
            input_checksum: event.input_checksum.clone(),
            output_checksum: event.output_checksum.clone(),
            step_hash: step_hash.clone(),
            previous_hash: previous,
            timestamp: event.timestamp,
        });
        previous = Some(step_hash);
    }

    let succeeded = completed_steps(events);
    let missing_steps = definition
        .map(|definition| {
            definition
                .required_steps()
                .iter()
                .filter(|step| !succeeded.contains(*step))
                .copied()
                .collect()
        })
        .unwrap_or_default();

    PipelineReceipt {
        checksum: compute_checksum(session_id, pipeline_type, events, definition),
        entries,
        missing_steps,
    }
}
