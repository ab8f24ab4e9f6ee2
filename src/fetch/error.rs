//! Error types for the fetch module.
//!
//! Every failed fetch attempt is described by a [`FetchError`]. The worker
//! loop never aborts the batch on these; it classifies them with
//! [`FetchError::kind`] and either retries or reports a terminal outcome.

use std::fmt;

use thiserror::Error;

use super::extract::ExtractError;

/// Classification of a failed fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Connection, DNS, TLS or timeout failure.
    Network,
    /// The server asked us to slow down (429, 503 or 999).
    ThrottleSignal,
    /// HTTP 404. Permanent.
    NotFound,
    /// Any other non-200 status. Retried with backoff.
    HttpError,
    /// The response body could not be turned into a document. Permanent.
    ParseError,
    /// The batch was cancelled before this URL finished.
    Cancelled,
}

impl FailureKind {
    /// Whether another attempt could succeed.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::ThrottleSignal | Self::HttpError)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::ThrottleSignal => write!(f, "throttle signal"),
            Self::NotFound => write!(f, "not found"),
            Self::HttpError => write!(f, "http error"),
            Self::ParseError => write!(f, "parse error"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Errors that can occur while fetching a single document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, timeout, malformed URL).
    #[error("network error fetching {url}: {message}")]
    Network {
        /// The URL that failed.
        url: String,
        /// Description of the underlying failure.
        message: String,
    },

    /// The server signalled backpressure.
    #[error("HTTP {status} fetching {url}, adjust rate limit")]
    Throttled {
        /// The URL that was throttled.
        url: String,
        /// The throttle status code (429, 503 or 999).
        status: u16,
    },

    /// The document does not exist.
    #[error("HTTP 404 fetching {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// Any other non-200 response.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body could not be parsed into a document.
    #[error("failed to parse body of {url}: {source}")]
    Parse {
        /// The URL whose body was malformed.
        url: String,
        /// The extractor's error.
        #[source]
        source: ExtractError,
    },

    /// The batch was cancelled while this URL was pending.
    #[error("cancelled while fetching {url}")]
    Cancelled {
        /// The URL that was abandoned.
        url: String,
    },
}

impl FetchError {
    /// Creates a network error.
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a throttle error for the given status.
    pub fn throttled(url: impl Into<String>, status: u16) -> Self {
        Self::Throttled {
            url: url.into(),
            status,
        }
    }

    /// Creates a not-found error.
    pub fn not_found(url: impl Into<String>) -> Self {
        Self::NotFound { url: url.into() }
    }

    /// Creates a generic HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a parse error.
    pub fn parse(url: impl Into<String>, source: ExtractError) -> Self {
        Self::Parse {
            url: url.into(),
            source,
        }
    }

    /// Creates a cancellation error.
    pub fn cancelled(url: impl Into<String>) -> Self {
        Self::Cancelled { url: url.into() }
    }

    /// Returns the failure classification of this error.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Network { .. } => FailureKind::Network,
            Self::Throttled { .. } => FailureKind::ThrottleSignal,
            Self::NotFound { .. } => FailureKind::NotFound,
            Self::HttpStatus { .. } => FailureKind::HttpError,
            Self::Parse { .. } => FailureKind::ParseError,
            Self::Cancelled { .. } => FailureKind::Cancelled,
        }
    }

    /// Whether another attempt could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    /// The HTTP status behind this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Throttled { status, .. } | Self::HttpStatus { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}

/// Invalid [`PipelineConfig`](super::PipelineConfig) value.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The starting rate limit must be a finite value of at least one request per second.
    #[error("invalid initial rate limit {value}: must be a finite value >= 1 request/sec")]
    InvalidRateLimit {
        /// The rejected value.
        value: f64,
    },

    /// A count-valued setting was zero.
    #[error("invalid {field}: must be at least 1")]
    ZeroValue {
        /// Name of the offending field.
        field: &'static str,
    },

    /// Recovery step out of range.
    #[error("invalid recovery percent {value}: must be in (0, 100]")]
    InvalidRecoveryPercent {
        /// The rejected value.
        value: f64,
    },
}

/// Returned by waits that were interrupted by the pipeline's cancellation token.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("fetch pipeline cancelled")]
pub struct Cancelled;
