//! The consumable stream of fetch outcomes.
//!
//! Every worker owns a sender half of one bounded channel sized to the batch,
//! so a worker never blocks on delivery and the stream ends exactly when the
//! last worker has terminated. Outcomes arrive in completion order.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::stream::Stream;
use tokio::sync::mpsc;

use super::engine::FetchStats;
use super::gate::ConcurrencyGate;
use super::outcome::FetchOutcome;
use super::rate_limiter::RateController;

/// Stream of [`FetchOutcome`]s for one pipeline run.
///
/// Yields one outcome per input URL and then `None`. Also gives read access
/// to the run's shared state, which stays valid after the stream closes.
#[derive(Debug)]
pub struct OutcomeStream {
    receiver: mpsc::Receiver<FetchOutcome>,
    expected: usize,
    received: usize,
    rate: Arc<RateController>,
    gate: ConcurrencyGate,
    stats: Arc<FetchStats>,
}

impl OutcomeStream {
    pub(crate) fn new(
        receiver: mpsc::Receiver<FetchOutcome>,
        expected: usize,
        rate: Arc<RateController>,
        gate: ConcurrencyGate,
        stats: Arc<FetchStats>,
    ) -> Self {
        Self {
            receiver,
            expected,
            received: 0,
            rate,
            gate,
            stats,
        }
    }

    /// Waits for the next outcome. Returns `None` once every worker has terminated.
    pub async fn recv(&mut self) -> Option<FetchOutcome> {
        let outcome = self.receiver.recv().await;
        if outcome.is_some() {
            self.received += 1;
        }
        outcome
    }

    /// Drains the stream, returning every outcome in arrival order.
    pub async fn collect_all(mut self) -> Vec<FetchOutcome> {
        let mut outcomes = Vec::with_capacity(self.expected);
        while let Some(outcome) = self.recv().await {
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Number of outcomes the run will produce (one per input URL).
    #[must_use]
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Number of outcomes consumed so far.
    #[must_use]
    pub fn received(&self) -> usize {
        self.received
    }

    /// The run's rate controller.
    #[must_use]
    pub fn rate_controller(&self) -> &RateController {
        &self.rate
    }

    /// The run's concurrency gate.
    #[must_use]
    pub fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }

    /// The run's counters.
    #[must_use]
    pub fn stats(&self) -> &FetchStats {
        &self.stats
    }
}

impl Stream for OutcomeStream {
    type Item = FetchOutcome;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let polled = self.receiver.poll_recv(cx);
        if let Poll::Ready(Some(_)) = &polled {
            self.received += 1;
        }
        polled
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.expected.saturating_sub(self.received);
        (0, Some(remaining))
    }
}
