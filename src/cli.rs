//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use wordcounter_core::fetch::{
    CONNECT_TIMEOUT_SECS, DEFAULT_BURST_SIZE, DEFAULT_MAX_ATTEMPTS, DEFAULT_RATE_LIMIT,
    DEFAULT_RECOVERY_PERCENT, DEFAULT_SUCCESS_THRESHOLD, PipelineConfig, READ_TIMEOUT_SECS,
};

/// Fetch a batch of articles and report the most frequent vocabulary words.
///
/// Reads one URL per line, fetches every article under an adaptive rate limit,
/// counts words found in the word bank and prints the top words as JSON.
#[derive(Parser, Debug)]
#[command(name = "wordcounter")]
#[command(author, version, about)]
pub struct Args {
    /// File with one article URL per line
    #[arg(default_value = "urls.txt")]
    pub urls_file: PathBuf,

    /// File with one vocabulary word per line
    #[arg(short = 'b', long, default_value = "bank.txt")]
    pub bank: PathBuf,

    /// Number of words to report
    #[arg(short = 'n', long, default_value_t = 10, value_parser = clap::value_parser!(u16).range(1..))]
    pub top: u16,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Starting (and maximum) request rate in requests per second (>= 1)
    #[arg(short = 'l', long, default_value_t = DEFAULT_RATE_LIMIT)]
    pub rate_limit: f64,

    /// Token bucket burst size
    #[arg(long, default_value_t = DEFAULT_BURST_SIZE, value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub burst: u32,

    /// Attempts per URL, including the first (1-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub max_attempts: u32,

    /// Pause after a throttle signal, in seconds (max 3600)
    #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(0..=3600))]
    pub cooldown: u64,

    /// Backoff step for other transient errors, in milliseconds (max 60000)
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub backoff_ms: u64,

    /// Successes between two rate recovery steps
    #[arg(long, default_value_t = DEFAULT_SUCCESS_THRESHOLD, value_parser = clap::value_parser!(u64).range(1..))]
    pub success_threshold: u64,

    /// Rate recovery step as a percentage of the starting rate (0-100]
    #[arg(long, default_value_t = DEFAULT_RECOVERY_PERCENT)]
    pub recovery_percent: f64,

    /// HTTP connect timeout in seconds
    #[arg(long, default_value_t = CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=600))]
    pub connect_timeout: u64,

    /// HTTP read timeout in seconds
    #[arg(long, default_value_t = READ_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=600))]
    pub read_timeout: u64,
}

impl Args {
    /// Pipeline settings selected on the command line (not yet validated).
    #[must_use]
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            initial_rate_limit: self.rate_limit,
            burst_size: self.burst,
            max_attempts: self.max_attempts,
            throttle_cooldown: Duration::from_secs(self.cooldown),
            backoff_unit: Duration::from_millis(self.backoff_ms),
            success_threshold: self.success_threshold,
            recovery_percent: self.recovery_percent,
        }
    }
}
