//! Tokenizing fetched documents into words.

use std::sync::LazyLock;

use regex::Regex;
use tracing::instrument;

use crate::fetch::Document;

/// Maximal runs of ASCII letters.
#[allow(clippy::expect_used)]
static WORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z]+").expect("word regex is valid") // Static pattern, safe to panic
});

/// Splits text into its alphabetic tokens, in order.
#[must_use]
pub fn tokenize(text: &str) -> Vec<&str> {
    WORD_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Extracts the words of a document: title, heading and body, in that order.
///
/// The fields are joined by single spaces before tokenizing, so a word never
/// spans two fields.
#[must_use]
#[instrument(level = "trace", skip(document), fields(title = %document.title))]
pub fn extract_words(document: &Document) -> Vec<String> {
    let text = format!(
        "{} {} {}",
        document.title, document.heading, document.body_text
    );
    tokenize(&text).into_iter().map(String::from).collect()
}
