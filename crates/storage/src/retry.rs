//! Bounded retry with backoff for backend calls
//!
//! Durable backends sit on real disks: transient I/O failures happen and
//! usually clear on retry. [`RetryPolicy`] bounds how often and how long a
//! call is retried; deterministic failures (serialization) are never
//! retried. The default is no retry at all, so tests see every failure on
//! the first attempt.

use std::time::Duration;
use stepseal_core::StorageError;
use tracing::{error, warn};

/// Retry behavior for storage operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Fail on the first error
    None,
    /// Retry up to `attempts` total tries with a constant delay between them
    Fixed {
        /// Total attempts, including the first
        attempts: u32,
        /// Delay between attempts
        delay: Duration,
    },
    /// Retry with exponentially growing delay, capped at `max_delay`
    Exponential {
        /// Total attempts, including the first
        attempts: u32,
        /// Delay after the first failure
        base_delay: Duration,
        /// Upper bound on any single delay
        max_delay: Duration,
    },
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::None
    }
}

impl RetryPolicy {
    /// The production profile: 3 attempts, 50ms base, capped at 1s.
    pub fn production() -> Self {
        RetryPolicy::Exponential {
            attempts: 3,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(1),
        }
    }

    /// Total attempts this policy allows, including the first.
    pub fn max_attempts(&self) -> u32 {
        match self {
            RetryPolicy::None => 1,
            RetryPolicy::Fixed { attempts, .. } => (*attempts).max(1),
            RetryPolicy::Exponential { attempts, .. } => (*attempts).max(1),
        }
    }

    /// Delay to sleep after failed attempt number `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self {
            RetryPolicy::None => Duration::ZERO,
            RetryPolicy::Fixed { delay, .. } => *delay,
            RetryPolicy::Exponential {
                base_delay,
                max_delay,
                ..
            } => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                base_delay.saturating_mul(factor).min(*max_delay)
            }
        }
    }

    /// Run an operation, retrying transient failures per this policy.
    ///
    /// Non-transient errors and the final failed attempt surface
    /// unmodified.
    pub fn run<R, F>(&self, mut op: F) -> Result<R, StorageError>
    where
        F: FnMut() -> Result<R, StorageError>,
    {
        let attempts = self.max_attempts();
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(error) if error.is_transient() && attempt < attempts => {
                    let delay = self.delay_for_attempt(attempt);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "retrying storage operation"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(error) => {
                    if error.is_transient() && attempts > 1 {
                        error!(attempts, error = %error, "storage operation failed after retries");
                    }
                    return Err(error);
                }
            }
        }
    }
}
