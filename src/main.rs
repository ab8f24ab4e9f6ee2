//! CLI entry point for the wordcounter tool.

use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use wordcounter_core::fetch::{FailureKind, FetchPipeline, HttpFetcher, SelectorExtractor};
use wordcounter_core::words::{WordBank, WordTally, count_document};
use wordcounter_core::read_lines;

mod cli;
mod progress;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Logs go to stderr; stdout carries only the JSON report.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let urls = read_lines(&args.urls_file)
        .with_context(|| format!("Error reading URLs from {}", args.urls_file.display()))?;
    info!(count = urls.len(), file = %args.urls_file.display(), "Read URLs");

    let bank_entries = read_lines(&args.bank)
        .with_context(|| format!("Error reading word bank from {}", args.bank.display()))?;
    let bank = WordBank::new(&bank_entries);
    info!(count = bank.len(), file = %args.bank.display(), "Read word bank");

    let extractor = Arc::new(SelectorExtractor::with_defaults()?);
    let fetcher = HttpFetcher::with_timeouts(
        extractor,
        Duration::from_secs(args.connect_timeout),
        Duration::from_secs(args.read_timeout),
    )
    .context("Failed to build HTTP client")?;
    let pipeline = FetchPipeline::new(args.pipeline_config(), Arc::new(fetcher))
        .context("Invalid pipeline configuration")?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling remaining fetches");
            interrupt.cancel();
        }
    });

    let show_progress = progress::should_show_progress(
        io::stderr().is_terminal(),
        args.quiet,
        progress::is_dumb_terminal(),
    );
    let bar = progress::batch_progress(urls.len(), show_progress);

    let mut outcomes = pipeline.run(urls, cancel);
    let mut tally = WordTally::new();

    while let Some(outcome) = outcomes.recv().await {
        bar.inc(1);
        match &outcome.result {
            Ok(document) => tally.merge(count_document(document, &bank)),
            Err(error) if error.kind() == FailureKind::Cancelled => {
                debug!(url = %outcome.url, "Fetch cancelled");
            }
            Err(error) => bar.suspend(|| {
                warn!(
                    url = %outcome.url,
                    attempts = outcome.attempts,
                    error = %error,
                    "Error fetching URL"
                );
            }),
        }
    }
    bar.finish_and_clear();

    let stats = outcomes.stats();
    info!(
        succeeded = stats.succeeded(),
        failed = stats.failed(),
        cancelled = stats.cancelled(),
        retried = stats.retried(),
        throttled = stats.throttled(),
        final_rate = outcomes.rate_controller().current_limit(),
        "Fetch complete"
    );

    let top = tally.top(usize::from(args.top));
    let report = serde_json::to_string_pretty(&top).context("Failed to serialize report")?;
    println!("{report}");

    Ok(())
}
