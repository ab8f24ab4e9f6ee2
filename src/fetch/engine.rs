//! Fetch pipeline: one worker per URL under a shared rate limit.
//!
//! This module provides the [`FetchPipeline`], which turns a list of URLs into
//! an [`OutcomeStream`], and the per-URL worker state machine.
//!
//! # Overview
//!
//! Each URL gets its own Tokio task. A worker loops through
//!
//! ```text
//! Admitting -> Fetching -> Succeeded
//!                       -> RetryableFailure -> (Cooldown | Backoff) -> Admitting
//!                       -> TerminalFailure
//! ```
//!
//! holding a [`ConcurrencyGate`] slot from admission until the fetch returns.
//! The slot is released before any cooldown or backoff pause, so a sleeping
//! worker never occupies capacity. Throttle signals and successes are
//! reported to the shared [`RateController`], which every worker consults
//! before each attempt.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use wordcounter_core::fetch::{FetchPipeline, HttpFetcher, PipelineConfig, SelectorExtractor};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let extractor = Arc::new(SelectorExtractor::with_defaults()?);
//! let fetcher = Arc::new(HttpFetcher::new(extractor)?);
//! let pipeline = FetchPipeline::new(PipelineConfig::default(), fetcher)?;
//!
//! let mut outcomes = pipeline.run(vec!["https://example.com/a".to_string()], CancellationToken::new());
//! while let Some(outcome) = outcomes.recv().await {
//!     println!("{}: success={}", outcome.url, outcome.is_success());
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::client::DocumentFetcher;
use super::config::PipelineConfig;
use super::error::{Cancelled, ConfigError, FailureKind, FetchError};
use super::gate::ConcurrencyGate;
use super::outcome::{Document, FetchOutcome};
use super::rate_limiter::RateController;
use super::retry::{RetryDecision, RetryPolicy};
use super::sink::OutcomeStream;

/// Counters for one pipeline run.
///
/// Uses atomic counters so concurrent workers can update them without locking.
#[derive(Debug, Default)]
pub struct FetchStats {
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    cancelled: AtomicUsize,
    retried: AtomicUsize,
    throttled: AtomicUsize,
    attempts: AtomicUsize,
}

impl FetchStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs that produced a document.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::SeqCst)
    }

    /// URLs that ended in a terminal failure other than cancellation.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// URLs abandoned because the run was cancelled.
    #[must_use]
    pub fn cancelled(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// URLs finished so far, whatever the result.
    #[must_use]
    pub fn finished(&self) -> usize {
        self.succeeded() + self.failed() + self.cancelled()
    }

    /// Retries scheduled (cooldowns plus backoffs).
    #[must_use]
    pub fn retried(&self) -> usize {
        self.retried.load(Ordering::SeqCst)
    }

    /// Throttle signals received.
    #[must_use]
    pub fn throttled(&self) -> usize {
        self.throttled.load(Ordering::SeqCst)
    }

    /// Fetch attempts issued.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn increment(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

/// Adaptive concurrent fetcher for a batch of URLs.
///
/// A pipeline is consumed by [`run`](Self::run): the rate state, the gate and
/// the counters belong to exactly one run.
pub struct FetchPipeline {
    config: PipelineConfig,
    fetcher: Arc<dyn DocumentFetcher>,
    policy: RetryPolicy,
}

impl std::fmt::Debug for FetchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchPipeline")
            .field("config", &self.config)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl FetchPipeline {
    /// Creates a pipeline from a configuration and a fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is out of range.
    #[instrument(level = "debug", skip(fetcher))]
    pub fn new(
        config: PipelineConfig,
        fetcher: Arc<dyn DocumentFetcher>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let policy = RetryPolicy::from_config(&config);
        debug!(
            gate_capacity = config.gate_capacity(),
            max_attempts = policy.max_attempts(),
            "creating fetch pipeline"
        );
        Ok(Self {
            config,
            fetcher,
            policy,
        })
    }

    /// Returns the pipeline configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Spawns one worker per URL and returns the stream of their outcomes.
    ///
    /// Must be called from within a Tokio runtime. The stream yields exactly
    /// one outcome per URL (duplicates included) and closes once every worker
    /// has terminated. Cancelling `cancel` makes waiting and sleeping workers
    /// unwind promptly; each of them still reports a
    /// [`FailureKind::Cancelled`] outcome.
    #[instrument(skip_all, fields(urls = tracing::field::Empty))]
    pub fn run<I, S>(self, urls: I, cancel: CancellationToken) -> OutcomeStream
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let urls: Vec<String> = urls.into_iter().map(Into::into).collect();
        tracing::Span::current().record("urls", urls.len());

        let rate = Arc::new(RateController::new(&self.config));
        let gate = ConcurrencyGate::new(self.config.gate_capacity());
        let stats = Arc::new(FetchStats::new());
        // Sized to the batch so a finished worker never waits on the consumer.
        let (tx, rx) = mpsc::channel(urls.len().max(1));

        let worker = Worker {
            fetcher: self.fetcher,
            rate: Arc::clone(&rate),
            gate: gate.clone(),
            policy: self.policy,
            stats: Arc::clone(&stats),
            cancel,
        };

        info!(count = urls.len(), "starting fetch batch");
        let expected = urls.len();
        let mut handles = Vec::with_capacity(expected);
        for url in urls {
            let worker = worker.clone();
            let tx = tx.clone();
            handles.push(tokio::spawn(async move {
                let outcome = worker.fetch_with_retry(&url).await;
                if tx.send(outcome).await.is_err() {
                    debug!(url = %url, "outcome stream dropped before delivery");
                }
            }));
        }
        // Only workers hold senders now: the stream closes with the last one.
        drop(tx);

        let summary = Arc::clone(&stats);
        tokio::spawn(async move {
            for handle in handles {
                if let Err(e) = handle.await {
                    warn!(error = %e, "fetch worker panicked");
                }
            }
            info!(
                succeeded = summary.succeeded(),
                failed = summary.failed(),
                cancelled = summary.cancelled(),
                retried = summary.retried(),
                throttled = summary.throttled(),
                attempts = summary.attempts(),
                "fetch batch complete"
            );
        });

        OutcomeStream::new(rx, expected, rate, gate, stats)
    }
}

/// Shared handles every worker needs.
#[derive(Clone)]
struct Worker {
    fetcher: Arc<dyn DocumentFetcher>,
    rate: Arc<RateController>,
    gate: ConcurrencyGate,
    policy: RetryPolicy,
    stats: Arc<FetchStats>,
    cancel: CancellationToken,
}

impl Worker {
    /// Runs the retry state machine for one URL and returns its outcome.
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch_with_retry(&self, url: &str) -> FetchOutcome {
        let mut attempt = 0u32;

        loop {
            let result = match self.attempt(url).await {
                Ok(result) => {
                    attempt += 1;
                    result
                }
                Err(Cancelled) => return self.cancelled(url, attempt),
            };

            let error = match result {
                Ok(document) => {
                    self.rate.on_success();
                    FetchStats::increment(&self.stats.succeeded);
                    debug!(attempt, "fetch succeeded");
                    return FetchOutcome::success(url, attempt, document);
                }
                Err(error) => error,
            };

            let kind = error.kind();
            if kind == FailureKind::Cancelled {
                return self.cancelled(url, attempt);
            }
            if kind == FailureKind::ThrottleSignal {
                FetchStats::increment(&self.stats.throttled);
                self.rate.on_throttle_signal();
            }

            match self.policy.decide(kind, attempt) {
                RetryDecision::Cooldown {
                    delay,
                    attempt: next_attempt,
                }
                | RetryDecision::Backoff {
                    delay,
                    attempt: next_attempt,
                } => {
                    info!(
                        attempt = next_attempt,
                        max_attempts = self.policy.max_attempts(),
                        delay_ms = delay.as_millis(),
                        error = %error,
                        "retrying fetch"
                    );
                    FetchStats::increment(&self.stats.retried);
                    tokio::select! {
                        biased;
                        () = self.cancel.cancelled() => return self.cancelled(url, attempt),
                        () = tokio::time::sleep(delay) => {}
                    }
                }
                RetryDecision::GiveUp { reason } => {
                    warn!(attempt, %reason, error = %error, "fetch failed");
                    FetchStats::increment(&self.stats.failed);
                    return FetchOutcome::failure(url, attempt, error);
                }
            }
        }
    }

    /// One gated, rate-admitted fetch. The gate slot is released on return.
    async fn attempt(&self, url: &str) -> Result<Result<Document, FetchError>, Cancelled> {
        let _permit = self.gate.acquire(&self.cancel).await?;
        self.rate.admit(&self.cancel).await?;
        FetchStats::increment(&self.stats.attempts);

        Ok(tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(FetchError::cancelled(url)),
            result = self.fetcher.fetch(url) => result,
        })
    }

    fn cancelled(&self, url: &str, attempts: u32) -> FetchOutcome {
        debug!(attempts, "fetch cancelled");
        FetchStats::increment(&self.stats.cancelled);
        FetchOutcome::failure(url, attempts, FetchError::cancelled(url))
    }
}
