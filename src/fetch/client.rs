//! HTTP document fetcher.
//!
//! This module provides the [`DocumentFetcher`] seam used by the pipeline and
//! its production implementation [`HttpFetcher`], which performs one GET per
//! call and classifies the response.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS, STATUS_THROTTLE_NONSTANDARD};
use super::error::{FailureKind, FetchError};
use super::extract::DocumentExtractor;
use super::outcome::Document;
use crate::user_agent;

/// One fetch attempt: URL in, document or classified failure out.
///
/// Implementations must not retry or sleep; the pipeline owns that policy.
#[async_trait::async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetches and parses one document.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] whose [`kind`](FetchError::kind) drives the retry decision.
    async fn fetch(&self, url: &str) -> Result<Document, FetchError>;
}

/// [`DocumentFetcher`] backed by `reqwest`.
///
/// Designed to be created once and shared, so all workers reuse one
/// connection pool.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    extractor: Arc<dyn DocumentExtractor>,
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher").finish_non_exhaustive()
    }
}

impl HttpFetcher {
    /// Creates a fetcher with the default timeouts (30s connect, 60s read).
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error if the HTTP client cannot be built.
    pub fn new(extractor: Arc<dyn DocumentExtractor>) -> Result<Self, reqwest::Error> {
        Self::with_timeouts(
            extractor,
            Duration::from_secs(CONNECT_TIMEOUT_SECS),
            Duration::from_secs(READ_TIMEOUT_SECS),
        )
    }

    /// Creates a fetcher with explicit timeouts.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error if the HTTP client cannot be built.
    #[instrument(level = "debug", skip(extractor))]
    pub fn with_timeouts(
        extractor: Arc<dyn DocumentExtractor>,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .user_agent(user_agent::default_user_agent())
            .gzip(true)
            .build()?;
        Ok(Self { client, extractor })
    }
}

#[async_trait::async_trait]
impl DocumentFetcher for HttpFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &str) -> Result<Document, FetchError> {
        let parsed =
            url::Url::parse(url).map_err(|e| FetchError::network(url, format!("invalid URL: {e}")))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| map_reqwest_error(url, &e))?;

        let status = response.status().as_u16();
        debug!(status, "received response");
        if let Some(kind) = classify_status(status) {
            return Err(match kind {
                FailureKind::ThrottleSignal => FetchError::throttled(url, status),
                FailureKind::NotFound => FetchError::not_found(url),
                _ => FetchError::http_status(url, status),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| map_reqwest_error(url, &e))?;

        self.extractor
            .parse(&body)
            .map_err(|source| FetchError::parse(url, source))
    }
}

/// Classifies a response status. `None` means the body should be parsed.
///
/// | Status | Kind |
/// |--------|------|
/// | 200 | (success) |
/// | 429, 503, 999 | `ThrottleSignal` |
/// | 404 | `NotFound` |
/// | anything else | `HttpError` |
#[must_use]
pub fn classify_status(status: u16) -> Option<FailureKind> {
    match status {
        200 => None,
        429 | 503 | STATUS_THROTTLE_NONSTANDARD => Some(FailureKind::ThrottleSignal),
        404 => Some(FailureKind::NotFound),
        _ => Some(FailureKind::HttpError),
    }
}

fn map_reqwest_error(url: &str, error: &reqwest::Error) -> FetchError {
    let message = if error.is_timeout() {
        format!("timeout: {error}")
    } else {
        error.to_string()
    };
    FetchError::network(url, message)
}
