//! Wordcounter Core Library
//!
//! This library provides the core functionality for the wordcounter tool,
//! which fetches a batch of articles over HTTP and reports the most frequent
//! words from a fixed vocabulary.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`fetch`] - Adaptive concurrent fetch pipeline (rate control, retries, outcome stream)
//! - [`words`] - Tokenizing documents, vocabulary filtering and top-N ranking
//! - [`input`] - Line-oriented input files (URL lists, word banks)

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod fetch;
pub mod input;
mod user_agent;
pub mod words;

// Re-export commonly used types
pub use fetch::{
    Document, FailureKind, FetchError, FetchOutcome, FetchPipeline, FetchStats, HttpFetcher,
    OutcomeStream, PipelineConfig, SelectorExtractor,
};
pub use input::{InputError, read_lines};
pub use words::{WordBank, WordCount, WordTally};
