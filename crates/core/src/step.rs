//! Pipeline step and status vocabulary
//!
//! Both enums are closed: an event can only carry a step and status the
//! system knows about, so typos are caught at the validation boundary
//! instead of silently producing an unverifiable chain.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A known checkout pipeline step.
///
/// The wire form is the snake_case name (`payment_confirmed` etc.), both in
/// JSON and in chain hashing, so the canonical string is the stable identity
/// of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    /// Buyer account and eligibility checks passed
    BuyerValidated,
    /// Shipping/billing address resolved and accepted
    AddressValidated,
    /// Payment request handed to the provider
    PaymentInitiated,
    /// Provider confirmed the payment
    PaymentConfirmed,
    /// Order handed to the fulfillment integration
    FulfillmentDelegated,
    /// License key generated for a digital purchase
    LicenseIssued,
    /// Recurring payment mandate registered for a subscription
    MandateRegistered,
    /// Trial period opened for a subscription
    TrialStarted,
    /// Automated fraud screening executed
    FraudCheck,
    /// Session escalated to manual fraud review
    FraudReviewEscalated,
    /// Terminal step: checkout finished
    CheckoutCompleted,
}

impl PipelineStep {
    /// All known steps, in canonical declaration order.
    pub const ALL: [PipelineStep; 11] = [
        PipelineStep::BuyerValidated,
        PipelineStep::AddressValidated,
        PipelineStep::PaymentInitiated,
        PipelineStep::PaymentConfirmed,
        PipelineStep::FulfillmentDelegated,
        PipelineStep::LicenseIssued,
        PipelineStep::MandateRegistered,
        PipelineStep::TrialStarted,
        PipelineStep::FraudCheck,
        PipelineStep::FraudReviewEscalated,
        PipelineStep::CheckoutCompleted,
    ];

    /// Canonical snake_case name used in JSON and chain hashing.
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStep::BuyerValidated => "buyer_validated",
            PipelineStep::AddressValidated => "address_validated",
            PipelineStep::PaymentInitiated => "payment_initiated",
            PipelineStep::PaymentConfirmed => "payment_confirmed",
            PipelineStep::FulfillmentDelegated => "fulfillment_delegated",
            PipelineStep::LicenseIssued => "license_issued",
            PipelineStep::MandateRegistered => "mandate_registered",
            PipelineStep::TrialStarted => "trial_started",
            PipelineStep::FraudCheck => "fraud_check",
            PipelineStep::FraudReviewEscalated => "fraud_review_escalated",
            PipelineStep::CheckoutCompleted => "checkout_completed",
        }
    }
}

impl FromStr for PipelineStep {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PipelineStep::ALL
            .iter()
            .find(|step| step.as_str() == s)
            .copied()
            .ok_or_else(|| ValidationError::UnknownStep(s.to_string()))
    }
}

impl std::fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one step execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// The step completed successfully
    Success,
    /// The step ran and failed
    Failure,
    /// The step is still in flight
    Pending,
    /// The step was deliberately skipped
    Skipped,
}

impl StepStatus {
    /// Canonical snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Success => "success",
            StepStatus::Failure => "failure",
            StepStatus::Pending => "pending",
            StepStatus::Skipped => "skipped",
        }
    }

    /// Whether this status settles a step's outcome.
    ///
    /// Only success and failure count when deciding whether a step
    /// ultimately failed; pending and skipped leave the verdict open.
    pub fn is_settled(&self) -> bool {
        matches!(self, StepStatus::Success | StepStatus::Failure)
    }
}

impl FromStr for StepStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(StepStatus::Success),
            "failure" => Ok(StepStatus::Failure),
            "pending" => Ok(StepStatus::Pending),
            "skipped" => Ok(StepStatus::Skipped),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
