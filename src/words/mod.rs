//! Word counting over fetched documents.
//!
//! This module turns each [`Document`](crate::fetch::Document) into
//! alphabetic tokens, counts the ones found in a vocabulary
//! ([`WordBank`]), and ranks the totals ([`WordTally::top`]).

mod extractor;
mod tally;

pub use extractor::{extract_words, tokenize};
pub use tally::{MIN_WORD_LEN, WordBank, WordCount, WordTally, count_valid_words};

use std::collections::HashMap;

use crate::fetch::Document;

/// Counts the vocabulary words of one document.
#[must_use]
pub fn count_document(document: &Document, bank: &WordBank) -> HashMap<String, u64> {
    count_valid_words(&extract_words(document), bank)
}
