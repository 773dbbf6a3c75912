//! Handler health aggregation
//!
//! Read-only summaries of how the integrations executing pipeline steps
//! are behaving: call volume, success and error rates, latency, and when
//! things last happened. Derived from events on demand; events without a
//! handler are not part of any summary.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::Serialize;
use stepseal_core::{PipelineEvent, StepStatus};

/// Health summary for one handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerHealth {
    /// Handler name
    pub handler: String,
    /// Total events attributed to this handler
    pub calls: u64,
    /// Events with success status
    pub successes: u64,
    /// Events with failure status
    pub failures: u64,
    /// successes / calls
    pub success_rate: f64,
    /// failures / calls
    pub error_rate: f64,
    /// Mean of reported durations; `None` when no event reported one
    pub mean_duration_ms: Option<f64>,
    /// Timestamp of the most recent event
    pub last_call_at: DateTime<Utc>,
    /// Timestamp of the most recent failure, if any
    pub last_error_at: Option<DateTime<Utc>>,
}

struct Accumulator {
    calls: u64,
    successes: u64,
    failures: u64,
    duration_sum: f64,
    duration_samples: u64,
    last_call_at: DateTime<Utc>,
    last_error_at: Option<DateTime<Utc>>,
}

impl Accumulator {
    fn new(first_seen: DateTime<Utc>) -> Self {
        Self {
            calls: 0,
            successes: 0,
            failures: 0,
            duration_sum: 0.0,
            duration_samples: 0,
            last_call_at: first_seen,
            last_error_at: None,
        }
    }

    fn record(&mut self, event: &PipelineEvent) {
        self.calls += 1;
        match event.status {
            StepStatus::Success => self.successes += 1,
            StepStatus::Failure => {
                self.failures += 1;
                if self.last_error_at.map_or(true, |at| event.timestamp > at) {
                    self.last_error_at = Some(event.timestamp);
                }
            }
            StepStatus::Pending | StepStatus::Skipped => {}
        }
        if let Some(duration) = event.duration_ms {
            self.duration_sum += duration;
            self.duration_samples += 1;
        }
        if event.timestamp > self.last_call_at {
            self.last_call_at = event.timestamp;
        }
    }
}

/// Aggregate per-handler health from a set of events.
///
/// Rates are over all of a handler's events, including pending and
/// skipped ones. The mean duration only averages events that reported a
/// duration, so one slow instrumented call is not diluted by uninstrumented
/// ones; with zero samples it is `None`, never a division by zero.
/// Output is sorted by handler name.
pub fn aggregate_handler_health(events: &[PipelineEvent]) -> Vec<HandlerHealth> {
    let mut accumulators: FxHashMap<&str, Accumulator> = FxHashMap::default();

    for event in events {
        let Some(handler) = event.handler.as_deref() else {
            continue;
        };
        accumulators
            .entry(handler)
            .or_insert_with(|| Accumulator::new(event.timestamp))
            .record(event);
    }

    let mut health: Vec<HandlerHealth> = accumulators
        .into_iter()
        .map(|(handler, acc)| {
            let calls = acc.calls as f64;
            HandlerHealth {
                handler: handler.to_string(),
                calls: acc.calls,
                successes: acc.successes,
                failures: acc.failures,
                success_rate: acc.successes as f64 / calls,
                error_rate: acc.failures as f64 / calls,
                mean_duration_ms: (acc.duration_samples > 0)
                    .then(|| acc.duration_sum / acc.duration_samples as f64),
                last_call_at: acc.last_call_at,
                last_error_at: acc.last_error_at,
            }
        })
        .collect();

    health.sort_by(|a, b| a.handler.cmp(&b.handler));
    health
}
