//! Retry decisions for failed fetch attempts.
//!
//! This module provides the [`RetryPolicy`] and [`RetryDecision`] types that
//! turn a classified failure into the worker's next step.
//!
//! # Overview
//!
//! | Failure | Attempts left | Decision |
//! |---------|---------------|----------|
//! | `ThrottleSignal` | yes | [`RetryDecision::Cooldown`] for the full cooldown |
//! | `Network`, `HttpError` | yes | [`RetryDecision::Backoff`] of `attempt * backoff_unit` |
//! | `NotFound`, `ParseError`, `Cancelled` | - | [`RetryDecision::GiveUp`] |
//! | any | no | [`RetryDecision::GiveUp`] |
//!
//! Backoff is linear and deterministic: the n-th failed attempt waits
//! `n * backoff_unit` before attempt `n + 1`.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use wordcounter_core::fetch::{FailureKind, PipelineConfig, RetryDecision, RetryPolicy};
//!
//! let policy = RetryPolicy::from_config(&PipelineConfig::default());
//!
//! match policy.decide(FailureKind::HttpError, 2) {
//!     RetryDecision::Backoff { delay, attempt } => {
//!         assert_eq!(delay, Duration::from_secs(2));
//!         assert_eq!(attempt, 3);
//!     }
//!     other => panic!("unexpected decision {other:?}"),
//! }
//! ```

use std::time::Duration;

use tracing::{debug, instrument};

use super::config::PipelineConfig;
use super::error::FailureKind;

/// What a worker does after a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Pause for the throttle cooldown, then try again.
    Cooldown {
        /// How long to pause.
        delay: Duration,
        /// The attempt number that follows the pause (1-indexed).
        attempt: u32,
    },

    /// Pause for a linear backoff, then try again.
    Backoff {
        /// How long to pause.
        delay: Duration,
        /// The attempt number that follows the pause (1-indexed).
        attempt: u32,
    },

    /// Stop and report the last failure.
    GiveUp {
        /// Human-readable reason, used in logs.
        reason: String,
    },
}

impl RetryDecision {
    /// The pause before the next attempt, if any.
    #[must_use]
    pub fn delay(&self) -> Option<Duration> {
        match self {
            Self::Cooldown { delay, .. } | Self::Backoff { delay, .. } => Some(*delay),
            Self::GiveUp { .. } => None,
        }
    }
}

/// Per-URL retry budget and pause lengths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    max_attempts: u32,
    /// Pause after a throttle signal.
    cooldown: Duration,
    /// Backoff step.
    backoff_unit: Duration,
}

impl RetryPolicy {
    /// Creates a policy with explicit settings. `max_attempts` is raised to at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, cooldown: Duration, backoff_unit: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            cooldown,
            backoff_unit,
        }
    }

    /// Creates the policy described by a pipeline configuration.
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.max_attempts,
            config.throttle_cooldown,
            config.backoff_unit,
        )
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decides the next step after attempt number `attempt` (1-indexed) failed with `kind`.
    #[instrument(level = "debug", skip(self), fields(max_attempts = self.max_attempts))]
    pub fn decide(&self, kind: FailureKind, attempt: u32) -> RetryDecision {
        if !kind.is_retryable() {
            return RetryDecision::GiveUp {
                reason: format!("{kind} failure is permanent"),
            };
        }

        if attempt >= self.max_attempts {
            debug!(attempt, "max attempts reached");
            return RetryDecision::GiveUp {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let next = attempt + 1;
        let decision = if kind == FailureKind::ThrottleSignal {
            RetryDecision::Cooldown {
                delay: self.cooldown,
                attempt: next,
            }
        } else {
            RetryDecision::Backoff {
                delay: self.backoff_unit.saturating_mul(attempt),
                attempt: next,
            }
        };
        debug!(next_attempt = next, ?decision, "will retry");
        decision
    }
}
