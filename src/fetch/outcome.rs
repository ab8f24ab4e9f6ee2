//! Values produced by the fetch pipeline.

use serde::Serialize;

use super::error::{FailureKind, FetchError};

/// Structured content of one fetched article.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Document {
    /// Article title (from page metadata).
    pub title: String,
    /// Sub-heading text.
    pub heading: String,
    /// Body paragraphs joined by `\n`.
    pub body_text: String,
}

/// Final result for one input URL.
///
/// Exactly one outcome is emitted per URL: either the document or the
/// failure that ended the worker.
#[derive(Debug)]
pub struct FetchOutcome {
    /// The URL as given to the pipeline.
    pub url: String,
    /// Number of fetch attempts made for this URL.
    pub attempts: u32,
    /// The document, or the last failure.
    pub result: Result<Document, FetchError>,
}

impl FetchOutcome {
    pub(crate) fn success(url: impl Into<String>, attempts: u32, document: Document) -> Self {
        Self {
            url: url.into(),
            attempts,
            result: Ok(document),
        }
    }

    pub(crate) fn failure(url: impl Into<String>, attempts: u32, error: FetchError) -> Self {
        Self {
            url: url.into(),
            attempts,
            result: Err(error),
        }
    }

    /// Returns true if the URL was fetched and parsed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// The document, if the fetch succeeded.
    #[must_use]
    pub fn document(&self) -> Option<&Document> {
        self.result.as_ref().ok()
    }

    /// The failure classification, if the fetch failed.
    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.result.as_ref().err().map(FetchError::kind)
    }
}
