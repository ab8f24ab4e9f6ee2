//! Shared, self-adjusting request rate limit.
//!
//! This module provides the [`RateController`], a token bucket whose refill
//! rate shrinks when the server signals backpressure and recovers gradually
//! as requests succeed.
//!
//! # Overview
//!
//! One controller is shared by every worker of a pipeline run: server-side
//! throttling is per origin, so a throttle signal seen by any request must
//! slow down all subsequent admissions.
//!
//! - [`RateController::admit`] waits for one token (burst up to `burst_size`).
//! - [`RateController::on_throttle_signal`] halves the rate, never below 1 req/s.
//! - [`RateController::on_success`] raises the rate by a fixed step every
//!   `success_threshold` successes, never above the original rate.
//!
//! # Example
//!
//! ```
//! use wordcounter_core::fetch::{PipelineConfig, RateController};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() {
//! let limiter = RateController::new(&PipelineConfig::default());
//! let cancel = CancellationToken::new();
//!
//! limiter.admit(&cancel).await.ok();
//! limiter.on_throttle_signal();
//! assert!((limiter.current_limit() - 7.5).abs() < f64::EPSILON);
//! # }
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use super::config::PipelineConfig;
use super::constants::{DEFAULT_RATE_LIMIT, DEFAULT_RECOVERY_PERCENT, MIN_RATE_LIMIT};
use super::error::Cancelled;

/// Snapshot of the controller's state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateState {
    /// Rate currently enforced, in requests per second.
    pub current_limit: f64,
    /// Rate the run started with; the ceiling for recovery.
    pub original_limit: f64,
    /// Token bucket capacity.
    pub burst_size: u32,
    /// Successful fetches recorded so far.
    pub success_count: u64,
}

/// Mutable state behind the controller's lock.
#[derive(Debug)]
struct Bucket {
    current_limit: f64,
    success_count: u64,
    /// Available tokens (fractional for smooth refill).
    tokens: f64,
    last_refill: Instant,
}

impl Bucket {
    fn refill(&mut self, burst_size: f64) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        if elapsed > 0.0 {
            self.tokens = (self.tokens + elapsed * self.current_limit).min(burst_size);
            self.last_refill = now;
        }
    }
}

/// Token bucket rate limiter with multiplicative decrease and stepwise recovery.
///
/// `RateController` is `Send + Sync`; wrap it in `Arc` to share it across
/// spawned tasks. All mutations go through one `std::sync::Mutex` that is
/// never held across an `.await`.
#[derive(Debug)]
pub struct RateController {
    original_limit: f64,
    burst_size: u32,
    success_threshold: u64,
    /// Recovery step in requests per second.
    recovery_step: f64,
    bucket: Mutex<Bucket>,
}

impl RateController {
    /// Creates a controller from the pipeline configuration. The bucket starts full.
    ///
    /// Values outside the ranges [`PipelineConfig::validate`] accepts are
    /// clamped: the rate to at least 1 req/s (a non-finite rate falls back to
    /// the default), the burst and success threshold to at least 1, and the
    /// recovery percentage to `0..=100`.
    #[must_use]
    #[instrument(skip_all, fields(rate = config.initial_rate_limit, burst = config.burst_size))]
    pub fn new(config: &PipelineConfig) -> Self {
        let rate = if config.initial_rate_limit.is_finite() {
            config.initial_rate_limit.max(MIN_RATE_LIMIT)
        } else {
            DEFAULT_RATE_LIMIT
        };
        let burst_size = config.burst_size.max(1);
        let recovery_percent = if config.recovery_percent.is_finite() {
            config.recovery_percent.clamp(0.0, 100.0)
        } else {
            DEFAULT_RECOVERY_PERCENT
        };
        debug!(rate, burst_size, "creating rate controller");
        Self {
            original_limit: rate,
            burst_size,
            success_threshold: config.success_threshold.max(1),
            recovery_step: rate * recovery_percent / 100.0,
            bucket: Mutex::new(Bucket {
                current_limit: rate,
                success_count: 0,
                tokens: f64::from(burst_size),
                last_refill: Instant::now(),
            }),
        }
    }

    fn bucket(&self) -> MutexGuard<'_, Bucket> {
        // Every critical section leaves the bucket consistent, so a poisoned
        // lock still holds usable state.
        self.bucket.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the rate currently enforced.
    #[must_use]
    pub fn current_limit(&self) -> f64 {
        self.bucket().current_limit
    }

    /// Returns the rate the run started with.
    #[must_use]
    pub fn original_limit(&self) -> f64 {
        self.original_limit
    }

    /// Returns a consistent snapshot of the controller's state.
    #[must_use]
    pub fn snapshot(&self) -> RateState {
        let bucket = self.bucket();
        RateState {
            current_limit: bucket.current_limit,
            original_limit: self.original_limit,
            burst_size: self.burst_size,
            success_count: bucket.success_count,
        }
    }

    /// Takes a token if one is available, otherwise returns how long until one is.
    fn try_take(&self) -> Result<(), Duration> {
        let mut bucket = self.bucket();
        bucket.refill(f64::from(self.burst_size));
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(())
        } else {
            let deficit = 1.0 - bucket.tokens;
            Err(Duration::from_secs_f64(deficit / bucket.current_limit))
        }
    }

    /// Waits until one request may be issued under the current rate.
    ///
    /// Returns immediately when a token is available. The lock is released
    /// while waiting, and the rate is re-read after every wait, so a limit
    /// change made by another worker applies to waiters too.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if `cancel` fires before a token is granted.
    pub async fn admit(&self, cancel: &CancellationToken) -> Result<(), Cancelled> {
        loop {
            if cancel.is_cancelled() {
                return Err(Cancelled);
            }
            let wait = match self.try_take() {
                Ok(()) => return Ok(()),
                Err(wait) => wait,
            };
            trace!(wait_ms = wait.as_millis(), "waiting for rate admission");
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Cancelled),
                () = tokio::time::sleep(wait) => {}
            }
        }
    }

    /// Reacts to a throttle signal by halving the rate.
    ///
    /// If the halved rate would drop below 1 req/s the limit is left unchanged.
    /// Returns the limit in force afterwards. The caller owns the cooldown
    /// pause that follows.
    pub fn on_throttle_signal(&self) -> f64 {
        let mut bucket = self.bucket();
        let old_limit = bucket.current_limit;
        let new_limit = old_limit / 2.0;
        if new_limit >= MIN_RATE_LIMIT {
            // Settle tokens earned at the old rate before switching.
            bucket.refill(f64::from(self.burst_size));
            bucket.current_limit = new_limit;
            warn!(old_limit, new_limit, "throttle signal received, halving rate limit");
        } else {
            info!(
                limit = old_limit,
                "throttle signal received, rate limit already at floor"
            );
        }
        bucket.current_limit
    }

    /// Records a successful fetch and applies stepwise recovery.
    ///
    /// Every time the success count reaches a multiple of the threshold and
    /// the rate is below its original value, the rate grows by the recovery
    /// step, clamped to the original value. Returns the limit in force afterwards.
    pub fn on_success(&self) -> f64 {
        let mut bucket = self.bucket();
        bucket.success_count += 1;
        if bucket.success_count % self.success_threshold == 0
            && bucket.current_limit < self.original_limit
        {
            bucket.refill(f64::from(self.burst_size));
            let old_limit = bucket.current_limit;
            let new_limit = (old_limit + self.recovery_step).min(self.original_limit);
            bucket.current_limit = new_limit;
            info!(
                old_limit,
                new_limit,
                successes = bucket.success_count,
                "recovering rate limit"
            );
        }
        bucket.current_limit
    }
}
