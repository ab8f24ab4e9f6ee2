//! Adaptive concurrent fetch pipeline.
//!
//! This module turns a list of URLs into a stream of fetch outcomes while
//! respecting a shared, self-adjusting rate limit and a per-URL retry policy.
//!
//! # Features
//!
//! - One Tokio task per URL, bounded by a [`ConcurrencyGate`]
//! - Token bucket [`RateController`] that halves on throttle signals (429, 503, 999)
//!   and recovers stepwise after sustained success
//! - Fixed cooldown after throttling, linear backoff for other transient errors
//! - Pluggable [`DocumentExtractor`] so no fetch logic depends on page layout
//! - Cooperative cancellation through a `CancellationToken`
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use wordcounter_core::fetch::{FetchPipeline, HttpFetcher, PipelineConfig, SelectorExtractor};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Arc::new(HttpFetcher::new(Arc::new(SelectorExtractor::with_defaults()?))?);
//! let pipeline = FetchPipeline::new(PipelineConfig::default(), fetcher)?;
//! let outcomes = pipeline
//!     .run(["https://example.com/article"], CancellationToken::new())
//!     .collect_all()
//!     .await;
//! assert_eq!(outcomes.len(), 1);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod constants;
mod engine;
mod error;
mod extract;
mod gate;
mod outcome;
mod rate_limiter;
mod retry;
mod sink;

pub use client::{DocumentFetcher, HttpFetcher, classify_status};
pub use config::PipelineConfig;
pub use constants::{
    CONNECT_TIMEOUT_SECS, DEFAULT_BACKOFF_UNIT, DEFAULT_BURST_SIZE, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_RATE_LIMIT, DEFAULT_RECOVERY_PERCENT, DEFAULT_SUCCESS_THRESHOLD,
    DEFAULT_THROTTLE_COOLDOWN, READ_TIMEOUT_SECS,
};
pub use engine::{FetchPipeline, FetchStats};
pub use error::{Cancelled, ConfigError, FailureKind, FetchError};
pub use extract::{
    DEFAULT_HEADING_SELECTOR, DEFAULT_PARAGRAPH_SELECTOR, DEFAULT_TITLE_SELECTOR,
    DocumentExtractor, ExtractError, SelectorExtractor, SelectorSet, TITLE_NOT_FOUND,
};
pub use gate::{ConcurrencyGate, GatePermit};
pub use outcome::{Document, FetchOutcome};
pub use rate_limiter::{RateController, RateState};
pub use retry::{RetryDecision, RetryPolicy};
pub use sink::OutcomeStream;
