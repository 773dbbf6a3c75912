//! Instrumented step execution.
//!
//! Collaborators that run a step inline (form validation, a payment
//! provider call) can let the tracker do the bookkeeping: [`run_tracked`]
//! measures wall-clock duration, maps the outcome to a success or failure
//! event, and tracks it in one call. The work's own result is passed back
//! untouched; only failures of the *tracking* side surface as errors.
//!
//! [`run_tracked`]: Tracker::run_tracked

use crate::error::Result;
use crate::tracker::Tracker;
use sha2::{Digest, Sha256};
use std::fmt::Display;
use std::time::Instant;
use stepseal_core::{EventDraft, PipelineDefinition, PipelineEvent, PipelineStep, StepStatus};

/// SHA-256 of a payload as 64 lowercase hex characters.
///
/// The canonical way to derive `input_checksum` / `output_checksum` from
/// payload bytes, so every producer hashes the same way and the chain
/// stays comparable across handlers.
///
/// # Example
///
/// ```
/// use stepseal::checksum_hex;
///
/// let digest = checksum_hex(b"{\"cart\":[\"sku-1\"]}");
/// assert_eq!(digest.len(), 64);
/// ```
pub fn checksum_hex(payload: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    hex::encode(hasher.finalize())
}

/// Describes one unit of work to run under tracking.
///
/// Built fluently, consumed by [`Tracker::run_tracked`]:
///
/// ```
/// use stepseal::prelude::*;
///
/// let run = StepRun::new("sess-7", "digital_checkout", PipelineStep::PaymentInitiated)
///     .handler("stripe")
///     .input_checksum(checksum_hex(b"amount=1999"));
/// # let _ = run;
/// ```
#[derive(Debug, Clone)]
pub struct StepRun {
    session_id: String,
    pipeline_type: String,
    step: PipelineStep,
    handler: Option<String>,
    sequence: Option<u32>,
    input_checksum: Option<String>,
}

impl StepRun {
    /// Describe a step run for the given session and pipeline type.
    pub fn new(
        session_id: impl Into<String>,
        pipeline_type: impl Into<String>,
        step: PipelineStep,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            pipeline_type: pipeline_type.into(),
            step,
            handler: None,
            sequence: None,
            input_checksum: None,
        }
    }

    /// Name the integration executing the step.
    pub fn handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    /// Set the retry counter for this attempt.
    pub fn sequence(mut self, sequence: u32) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Attach the input payload checksum (see [`checksum_hex`]).
    pub fn input_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.input_checksum = Some(checksum.into());
        self
    }
}

/// A work result together with the event that recorded it.
#[derive(Debug)]
pub struct Tracked<T, E> {
    /// The work's own outcome, untouched
    pub result: std::result::Result<T, E>,
    /// The event that was stored for this run
    pub event: PipelineEvent,
    /// Auto-snapshot id, when the tracker has auto-snapshot enabled
    pub snapshot_id: Option<String>,
}

impl<T, E> Tracked<T, E> {
    /// Whether the work itself succeeded.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

impl Tracker {
    /// Run a unit of work and track its outcome as one event.
    ///
    /// Measures wall-clock duration, then records a success event for
    /// `Ok` or a failure event carrying the error's display text for
    /// `Err`. The work's result is returned inside [`Tracked`] either
    /// way; an `Err` from this method means the *event* could not be
    /// validated or stored, and is never used to swallow the work's own
    /// outcome.
    ///
    /// # Example
    ///
    /// ```
    /// use stepseal::prelude::*;
    ///
    /// let tracker = Tracker::in_memory();
    /// let definition = tracker.definition_for("digital_checkout").cloned().unwrap();
    ///
    /// let run = StepRun::new("sess-7", "digital_checkout", PipelineStep::BuyerValidated)
    ///     .handler("account-service");
    /// let tracked = tracker.run_tracked(run, &definition, || {
    ///     Ok::<_, String>("buyer-855")
    /// })?;
    ///
    /// assert!(tracked.is_success());
    /// assert_eq!(tracked.event.status, StepStatus::Success);
    /// assert!(tracked.event.duration_ms.is_some());
    /// # Ok::<(), stepseal::Error>(())
    /// ```
    pub fn run_tracked<T, E, F>(
        &self,
        run: StepRun,
        definition: &PipelineDefinition,
        work: F,
    ) -> Result<Tracked<T, E>>
    where
        E: Display,
        F: FnOnce() -> std::result::Result<T, E>,
    {
        let started = Instant::now();
        let result = work();
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        let status = if result.is_ok() {
            StepStatus::Success
        } else {
            StepStatus::Failure
        };

        let mut draft = EventDraft::new(run.session_id, run.pipeline_type, run.step, status)
            .with_duration_ms(duration_ms);
        if let Some(handler) = run.handler {
            draft = draft.with_handler(handler);
        }
        if let Some(sequence) = run.sequence {
            draft = draft.with_sequence(sequence);
        }
        if let Some(checksum) = run.input_checksum {
            draft = draft.with_input_checksum(checksum);
        }
        if let Err(error) = &result {
            draft = draft.with_error(error.to_string());
        }

        let event = draft.build()?;
        let outcome = self.track_event(&event, definition)?;

        Ok(Tracked {
            result,
            event,
            snapshot_id: outcome.snapshot_id,
        })
    }
}
