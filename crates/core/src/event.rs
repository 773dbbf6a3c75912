//! Pipeline event model and validation
//!
//! [`PipelineEvent`] is the canonical record of one step execution. Events
//! are immutable once stored: the chain hash depends on their exact field
//! values, so there is no update path anywhere in the system.
//!
//! Collaborators build events through [`EventDraft`], which accepts the
//! stringly wire shape (step and status as names) and validates everything
//! on [`EventDraft::build`]. Missing ids and timestamps are generated;
//! nothing else is repaired.

use crate::error::ValidationError;
use crate::step::{PipelineStep, StepStatus};
use crate::store::ScopedRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Maximum allowed session id length.
pub const MAX_SESSION_ID_LENGTH: usize = 128;

/// Length of a SHA-256 digest rendered as hex.
pub const CHECKSUM_HEX_LENGTH: usize = 64;

/// One recorded step execution in a checkout session.
///
/// The triple `(session_id, step, sequence)` identifies a retry lineage;
/// `id` identifies the physical record. Payload checksums are carried
/// verbatim as supplied so the chain hash reproduces over stored history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineEvent {
    /// Globally unique record id (`evt-<uuid>` when generated)
    pub id: String,
    /// Checkout session this event belongs to
    pub session_id: String,
    /// Registry key of the pipeline the session runs
    pub pipeline_type: String,
    /// Which step executed
    pub step: PipelineStep,
    /// How the execution went
    pub status: StepStatus,
    /// Integration that executed the step, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    /// SHA-256 hex digest of the step's input payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_checksum: Option<String>,
    /// SHA-256 hex digest of the step's output payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_checksum: Option<String>,
    /// Wall-clock duration of the execution in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    /// Error text for failed executions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Free-form context (order ids, provider references, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
    /// Retry counter within `(session_id, step)`, starting at 0
    #[serde(default)]
    pub sequence: u32,
    /// When the execution was recorded
    pub timestamp: DateTime<Utc>,
}

impl PipelineEvent {
    /// Validate every field constraint on this event.
    ///
    /// Used by the tracker before storing records that arrive already
    /// built, e.g. deserialized from an external producer. `EventDraft`
    /// runs the same checks, so events built through it are always valid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyEventId);
        }
        validate_session_id(&self.session_id)?;
        if self.pipeline_type.is_empty() {
            return Err(ValidationError::EmptyPipelineType);
        }
        if let Some(checksum) = &self.input_checksum {
            validate_checksum("input", checksum)?;
        }
        if let Some(checksum) = &self.output_checksum {
            validate_checksum("output", checksum)?;
        }
        if let Some(duration) = self.duration_ms {
            if !duration.is_finite() || duration < 0.0 {
                return Err(ValidationError::InvalidDuration(duration));
            }
        }
        Ok(())
    }
}

impl ScopedRecord for PipelineEvent {
    const KIND: &'static str = "events";

    fn record_id(&self) -> &str {
        &self.id
    }

    fn scope_key(&self) -> &str {
        &self.session_id
    }

    fn partition(&self) -> &str {
        &self.pipeline_type
    }
}

/// Validate a session id: non-empty, bounded, restricted charset.
///
/// The charset `[A-Za-z0-9._:-]` keeps session ids safe to embed in
/// storage keys and log lines without escaping.
pub fn validate_session_id(session_id: &str) -> Result<(), ValidationError> {
    if session_id.is_empty() {
        return Err(ValidationError::InvalidSessionId("empty".to_string()));
    }
    if session_id.len() > MAX_SESSION_ID_LENGTH {
        return Err(ValidationError::InvalidSessionId(format!(
            "length {} exceeds maximum {}",
            session_id.len(),
            MAX_SESSION_ID_LENGTH
        )));
    }
    if let Some(bad) = session_id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | ':' | '-')))
    {
        return Err(ValidationError::InvalidSessionId(format!(
            "character {:?} not allowed",
            bad
        )));
    }
    Ok(())
}

/// Validate a payload checksum: exactly 64 ASCII hex digits.
///
/// Case is accepted and preserved; the chain hash is computed over the
/// checksum exactly as stored.
fn validate_checksum(field: &'static str, checksum: &str) -> Result<(), ValidationError> {
    if checksum.len() != CHECKSUM_HEX_LENGTH {
        return Err(ValidationError::InvalidChecksum {
            field,
            reason: format!(
                "expected {} hex chars, got {}",
                CHECKSUM_HEX_LENGTH,
                checksum.len()
            ),
        });
    }
    if let Some(bad) = checksum.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidChecksum {
            field,
            reason: format!("character {:?} is not a hex digit", bad),
        });
    }
    Ok(())
}

/// Construction input for a [`PipelineEvent`].
///
/// Accepts the wire shape collaborators submit: step and status arrive as
/// strings and are parsed on [`build`](EventDraft::build). Optional fields
/// default to absent; `id` and `timestamp` are generated when not supplied.
///
/// # Example
///
/// ```
/// use stepseal_core::{EventDraft, PipelineStep, StepStatus};
///
/// let event = EventDraft::new("sess-42", "physical_checkout", PipelineStep::PaymentConfirmed, StepStatus::Success)
///     .with_handler("stripe")
///     .with_duration_ms(112.5)
///     .build()
///     .unwrap();
/// assert!(event.id.starts_with("evt-"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDraft {
    /// Explicit record id; generated when `None`
    #[serde(default)]
    pub id: Option<String>,
    /// Checkout session id
    pub session_id: String,
    /// Pipeline type key
    pub pipeline_type: String,
    /// Step name in canonical snake_case
    pub step: String,
    /// Status name in canonical snake_case
    pub status: String,
    /// Executing integration
    #[serde(default)]
    pub handler: Option<String>,
    /// Input payload checksum (64 hex chars)
    #[serde(default)]
    pub input_checksum: Option<String>,
    /// Output payload checksum (64 hex chars)
    #[serde(default)]
    pub output_checksum: Option<String>,
    /// Execution duration in milliseconds
    #[serde(default)]
    pub duration_ms: Option<f64>,
    /// Error text for failures
    #[serde(default)]
    pub error: Option<String>,
    /// Free-form context
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
    /// Retry counter; defaults to 0
    #[serde(default)]
    pub sequence: Option<u32>,
    /// Explicit timestamp; generated when `None`
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl EventDraft {
    /// Typed constructor for in-process producers.
    pub fn new(
        session_id: impl Into<String>,
        pipeline_type: impl Into<String>,
        step: PipelineStep,
        status: StepStatus,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            pipeline_type: pipeline_type.into(),
            step: step.as_str().to_string(),
            status: status.as_str().to_string(),
            ..Self::default()
        }
    }

    /// Set an explicit record id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the executing integration.
    pub fn with_handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    /// Set the input payload checksum.
    pub fn with_input_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.input_checksum = Some(checksum.into());
        self
    }

    /// Set the output payload checksum.
    pub fn with_output_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.output_checksum = Some(checksum.into());
        self
    }

    /// Set the execution duration in milliseconds.
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Set the error text.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Set free-form metadata.
    pub fn with_metadata(mut self, metadata: BTreeMap<String, serde_json::Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set the retry counter.
    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Set an explicit timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Validate the draft and produce an immutable event.
    ///
    /// Generates `id` (`evt-<uuid>`) and `timestamp` (now) when absent.
    /// Returns the first validation failure encountered.
    pub fn build(self) -> Result<PipelineEvent, ValidationError> {
        let step: PipelineStep = self.step.parse()?;
        let status: StepStatus = self.status.parse()?;

        let event = PipelineEvent {
            id: self
                .id
                .unwrap_or_else(|| format!("evt-{}", Uuid::new_v4())),
            session_id: self.session_id,
            pipeline_type: self.pipeline_type,
            step,
            status,
            handler: self.handler,
            input_checksum: self.input_checksum,
            output_checksum: self.output_checksum,
            duration_ms: self.duration_ms,
            error: self.error,
            metadata: self.metadata,
            sequence: self.sequence.unwrap_or(0),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
        };
        event.validate()?;
        Ok(event)
    }
}
