//! Vocabulary filtering, counting and ranking.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

/// Shortest word that is ever counted.
pub const MIN_WORD_LEN: usize = 3;

/// Case-insensitive vocabulary of countable words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordBank {
    words: HashSet<String>,
}

impl WordBank {
    /// Builds a bank from vocabulary entries. Entries are lowercased.
    #[must_use]
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: HashSet<String> = entries
            .into_iter()
            .map(|entry| entry.as_ref().to_lowercase())
            .collect();
        debug!(size = words.len(), "built word bank");
        Self { words }
    }

    /// Whether the bank contains `word`, ignoring case.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    /// Number of distinct entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the bank has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Counts the words that qualify for the report.
///
/// A word qualifies when, lowercased, it is at least [`MIN_WORD_LEN`] long,
/// consists only of ASCII letters, and is in the bank. Counts are keyed by
/// the lowercase form.
#[must_use]
pub fn count_valid_words<S: AsRef<str>>(words: &[S], bank: &WordBank) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for word in words {
        let lower = word.as_ref().to_lowercase();
        if lower.len() >= MIN_WORD_LEN
            && lower.bytes().all(|b| b.is_ascii_alphabetic())
            && bank.words.contains(&lower)
        {
            *counts.entry(lower).or_insert(0) += 1;
        }
    }
    counts
}

/// One entry of the ranked report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    /// The lowercase word.
    pub word: String,
    /// Occurrences across all fetched documents.
    pub count: u64,
}

/// Running word counts across a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordTally {
    counts: HashMap<String, u64>,
}

impl WordTally {
    /// Creates an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds per-document counts into the tally.
    pub fn merge(&mut self, counts: HashMap<String, u64>) {
        for (word, count) in counts {
            *self.counts.entry(word).or_insert(0) += count;
        }
    }

    /// Count for one word (lowercase form).
    #[must_use]
    pub fn get(&self, word: &str) -> u64 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    /// Number of distinct words counted.
    #[must_use]
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// The `n` most frequent words, by count descending then word ascending.
    #[must_use]
    pub fn top(&self, n: usize) -> Vec<WordCount> {
        let mut ranked: Vec<WordCount> = self
            .counts
            .iter()
            .map(|(word, &count)| WordCount {
                word: word.clone(),
                count,
            })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
        ranked.truncate(n);
        ranked
    }
}
