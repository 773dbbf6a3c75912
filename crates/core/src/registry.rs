//! Pipeline definitions and the built-in registry
//!
//! A [`PipelineDefinition`] is the completion schema for one pipeline type:
//! which steps a session must succeed at to be valid, and which extra steps
//! are expected but not demanded. Definitions are immutable once built.
//!
//! Six definitions ship built in: physical, digital and subscription
//! checkout, each in a plain and an antifraud variant. The antifraud
//! variants additionally require `fraud_check` and allow
//! `fraud_review_escalated`.

use crate::error::ValidationError;
use crate::step::PipelineStep;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Completion schema for one pipeline type.
///
/// Fields are private: the `required ∩ optional = ∅` invariant is enforced
/// at construction and holds for the life of the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pipeline_type: String,
    required_steps: Vec<PipelineStep>,
    optional_steps: Vec<PipelineStep>,
}

impl PipelineDefinition {
    /// Build a definition, enforcing its invariants.
    ///
    /// Rejects an empty required set and any step listed as both required
    /// and optional. Step order is preserved: `missing_steps` in receipts
    /// reports required steps in definition order.
    pub fn new(
        pipeline_type: impl Into<String>,
        required_steps: Vec<PipelineStep>,
        optional_steps: Vec<PipelineStep>,
    ) -> Result<Self, ValidationError> {
        let pipeline_type = pipeline_type.into();
        if pipeline_type.is_empty() {
            return Err(ValidationError::EmptyPipelineType);
        }
        if required_steps.is_empty() {
            return Err(ValidationError::EmptyRequiredSteps(pipeline_type));
        }
        if let Some(overlap) = required_steps
            .iter()
            .find(|step| optional_steps.contains(step))
        {
            return Err(ValidationError::OverlappingSteps(overlap.to_string()));
        }
        Ok(Self {
            pipeline_type,
            required_steps,
            optional_steps,
        })
    }

    /// The registry key of this definition.
    pub fn pipeline_type(&self) -> &str {
        &self.pipeline_type
    }

    /// Steps a session must succeed at to be valid, in definition order.
    pub fn required_steps(&self) -> &[PipelineStep] {
        &self.required_steps
    }

    /// Steps that may appear without affecting validity.
    pub fn optional_steps(&self) -> &[PipelineStep] {
        &self.optional_steps
    }

    /// Total number of schema steps (required plus optional).
    pub fn steps_expected(&self) -> usize {
        self.required_steps.len() + self.optional_steps.len()
    }

    /// Whether a step appears anywhere in this schema.
    pub fn expects(&self, step: PipelineStep) -> bool {
        self.required_steps.contains(&step) || self.optional_steps.contains(&step)
    }
}

/// Catalogue of pipeline definitions keyed by pipeline type.
///
/// Lookup of an unknown type is a normal outcome (`None`), never an error:
/// checksums over sessions of unknown type still compute, they just carry
/// no schema expectations.
#[derive(Debug, Clone, Default)]
pub struct PipelineRegistry {
    definitions: BTreeMap<String, PipelineDefinition>,
}

impl PipelineRegistry {
    /// Create a registry from explicit definitions.
    ///
    /// Later definitions replace earlier ones with the same pipeline type.
    pub fn new(definitions: impl IntoIterator<Item = PipelineDefinition>) -> Self {
        let mut registry = Self::default();
        for definition in definitions {
            registry.register(definition);
        }
        registry
    }

    /// Create a registry holding the six built-in checkout definitions.
    pub fn builtin() -> Self {
        Self::new(builtin_definitions())
    }

    /// Add a definition, returning the one it replaced, if any.
    pub fn register(&mut self, definition: PipelineDefinition) -> Option<PipelineDefinition> {
        self.definitions
            .insert(definition.pipeline_type.clone(), definition)
    }

    /// Look up a definition by pipeline type.
    pub fn lookup(&self, pipeline_type: &str) -> Option<&PipelineDefinition> {
        self.definitions.get(pipeline_type)
    }

    /// All registered pipeline types, sorted.
    pub fn pipeline_types(&self) -> Vec<&str> {
        self.definitions.keys().map(String::as_str).collect()
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if the registry holds no definitions.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Shared instance of the built-in registry.
///
/// For callers that want the standard catalogue without owning a copy.
pub fn builtin_registry() -> &'static PipelineRegistry {
    static BUILTIN: Lazy<PipelineRegistry> = Lazy::new(PipelineRegistry::builtin);
    &BUILTIN
}

// Built-ins are constructed directly: the tables below are checked against
// PipelineDefinition::new's invariants in tests.
fn builtin(
    pipeline_type: &str,
    required: &[PipelineStep],
    optional: &[PipelineStep],
) -> PipelineDefinition {
    PipelineDefinition {
        pipeline_type: pipeline_type.to_string(),
        required_steps: required.to_vec(),
        optional_steps: optional.to_vec(),
    }
}

fn builtin_definitions() -> Vec<PipelineDefinition> {
    use PipelineStep::*;

    let physical_required = [
        BuyerValidated,
        AddressValidated,
        PaymentInitiated,
        PaymentConfirmed,
        FulfillmentDelegated,
        CheckoutCompleted,
    ];
    let digital_required = [
        BuyerValidated,
        PaymentInitiated,
        PaymentConfirmed,
        LicenseIssued,
        CheckoutCompleted,
    ];
    let subscription_required = [
        BuyerValidated,
        PaymentInitiated,
        MandateRegistered,
        PaymentConfirmed,
        CheckoutCompleted,
    ];

    let with_fraud = |steps: &[PipelineStep]| {
        let mut required = steps.to_vec();
        required.push(FraudCheck);
        required
    };

    vec![
        builtin("physical_checkout", &physical_required, &[]),
        builtin("digital_checkout", &digital_required, &[AddressValidated]),
        builtin(
            "subscription_checkout",
            &subscription_required,
            &[TrialStarted],
        ),
        builtin(
            "physical_checkout_antifraud",
            &with_fraud(&physical_required),
            &[FraudReviewEscalated],
        ),
        builtin(
            "digital_checkout_antifraud",
            &with_fraud(&digital_required),
            &[AddressValidated, FraudReviewEscalated],
        ),
        builtin(
            "subscription_checkout_antifraud",
            &with_fraud(&subscription_required),
            &[TrialStarted, FraudReviewEscalated],
        ),
    ]
}
