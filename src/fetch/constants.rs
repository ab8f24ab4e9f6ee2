//! Constants for the fetch module (default policy, timeouts).

use std::time::Duration;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (1 minute; articles are small).
pub const READ_TIMEOUT_SECS: u64 = 60;

/// Default starting request rate, in requests per second.
pub const DEFAULT_RATE_LIMIT: f64 = 15.0;

/// Default token bucket burst capacity.
pub const DEFAULT_BURST_SIZE: u32 = 5;

/// Default number of attempts per URL (including the first).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Pause imposed on a worker after a throttle signal (999/429/503).
pub const DEFAULT_THROTTLE_COOLDOWN: Duration = Duration::from_secs(300);

/// Unit of the linear backoff for generic transient errors.
pub const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_secs(1);

/// Number of successes between two recovery steps of the rate limit.
pub const DEFAULT_SUCCESS_THRESHOLD: u64 = 100;

/// Size of one recovery step, as a percentage of the original rate limit.
pub const DEFAULT_RECOVERY_PERCENT: f64 = 10.0;

/// The rate limit is never halved below this value (requests per second).
pub const MIN_RATE_LIMIT: f64 = 1.0;

/// Non-standard status some sites use to ask clients to slow down.
pub const STATUS_THROTTLE_NONSTANDARD: u16 = 999;
