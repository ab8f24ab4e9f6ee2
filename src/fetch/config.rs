//! Pipeline configuration.

use std::time::Duration;

use super::constants::{
    DEFAULT_BACKOFF_UNIT, DEFAULT_BURST_SIZE, DEFAULT_MAX_ATTEMPTS, DEFAULT_RATE_LIMIT,
    DEFAULT_RECOVERY_PERCENT, DEFAULT_SUCCESS_THRESHOLD, DEFAULT_THROTTLE_COOLDOWN,
    MIN_RATE_LIMIT,
};
use super::error::ConfigError;

/// Tunables for one [`FetchPipeline`](super::FetchPipeline) run.
///
/// # Default Values
///
/// | Field | Default |
/// |-------|---------|
/// | `initial_rate_limit` | 15 req/s |
/// | `burst_size` | 5 |
/// | `max_attempts` | 3 |
/// | `throttle_cooldown` | 300 s |
/// | `backoff_unit` | 1 s |
/// | `success_threshold` | 100 |
/// | `recovery_percent` | 10 |
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Starting (and maximum) request rate, in requests per second.
    pub initial_rate_limit: f64,
    /// Token bucket capacity.
    pub burst_size: u32,
    /// Attempts per URL, including the first.
    pub max_attempts: u32,
    /// Worker pause after a throttle signal.
    pub throttle_cooldown: Duration,
    /// Backoff after the n-th failed attempt is `n * backoff_unit`.
    pub backoff_unit: Duration,
    /// Successes between two recovery steps.
    pub success_threshold: u64,
    /// Recovery step as a percentage of `initial_rate_limit`.
    pub recovery_percent: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            initial_rate_limit: DEFAULT_RATE_LIMIT,
            burst_size: DEFAULT_BURST_SIZE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            throttle_cooldown: DEFAULT_THROTTLE_COOLDOWN,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
            success_threshold: DEFAULT_SUCCESS_THRESHOLD,
            recovery_percent: DEFAULT_RECOVERY_PERCENT,
        }
    }
}

impl PipelineConfig {
    /// Checks every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.initial_rate_limit.is_finite() || self.initial_rate_limit < MIN_RATE_LIMIT {
            return Err(ConfigError::InvalidRateLimit {
                value: self.initial_rate_limit,
            });
        }
        if self.burst_size == 0 {
            return Err(ConfigError::ZeroValue {
                field: "burst_size",
            });
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroValue {
                field: "max_attempts",
            });
        }
        if self.success_threshold == 0 {
            return Err(ConfigError::ZeroValue {
                field: "success_threshold",
            });
        }
        if !(self.recovery_percent > 0.0 && self.recovery_percent <= 100.0) {
            return Err(ConfigError::InvalidRecoveryPercent {
                value: self.recovery_percent,
            });
        }
        Ok(())
    }

    /// Number of concurrency gate slots: the integer part of the starting rate.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn gate_capacity(&self) -> usize {
        (self.initial_rate_limit.floor() as usize).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = PipelineConfig::default();
        assert!((config.initial_rate_limit - 15.0).abs() < f64::EPSILON);
        assert_eq!(config.burst_size, 5);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.throttle_cooldown, Duration::from_secs(300));
        assert_eq!(config.backoff_unit, Duration::from_secs(1));
        assert_eq!(config.success_threshold, 100);
        assert!((config.recovery_percent - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_gate_capacity_truncates_rate() {
        let config = PipelineConfig {
            initial_rate_limit: 7.9,
            ..PipelineConfig::default()
        };
        assert_eq!(config.gate_capacity(), 7);
        assert_eq!(PipelineConfig::default().gate_capacity(), 15);
    }

    #[test]
    fn test_validate_rejects_sub_unit_rate() {
        let config = PipelineConfig {
            initial_rate_limit: 0.5,
            ..PipelineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidRateLimit { value: 0.5 })
        );
    }

    #[test]
    fn test_validate_rejects_nan_rate() {
        let config = PipelineConfig {
            initial_rate_limit: f64::NAN,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRateLimit { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_counts() {
        let zero_burst = PipelineConfig {
            burst_size: 0,
            ..PipelineConfig::default()
        };
        assert_eq!(
            zero_burst.validate(),
            Err(ConfigError::ZeroValue {
                field: "burst_size"
            })
        );

        let zero_attempts = PipelineConfig {
            max_attempts: 0,
            ..PipelineConfig::default()
        };
        assert_eq!(
            zero_attempts.validate(),
            Err(ConfigError::ZeroValue {
                field: "max_attempts"
            })
        );

        let zero_threshold = PipelineConfig {
            success_threshold: 0,
            ..PipelineConfig::default()
        };
        assert!(zero_threshold.validate().is_err());
    }

    #[test]
    fn test_validate_recovery_percent_bounds() {
        for bad in [0.0, -5.0, 100.5] {
            let config = PipelineConfig {
                recovery_percent: bad,
                ..PipelineConfig::default()
            };
            assert!(config.validate().is_err(), "{bad} should be rejected");
        }
        let full = PipelineConfig {
            recovery_percent: 100.0,
            ..PipelineConfig::default()
        };
        assert_eq!(full.validate(), Ok(()));
    }
}
