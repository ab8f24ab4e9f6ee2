//! Bounded concurrency for in-flight fetches.
//!
//! The [`ConcurrencyGate`] wraps a `tokio` semaphore and counts how many
//! permits are out, so callers and tests can observe the invariant
//! `0 <= in_use <= capacity`. Permits are RAII guards: dropping a
//! [`GatePermit`] frees the slot on every exit path, panics included.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::error::Cancelled;

#[derive(Debug)]
struct GateCounters {
    in_use: AtomicUsize,
    peak: AtomicUsize,
}

/// Counting semaphore limiting how many fetches run at once.
///
/// Cloning is cheap and yields a handle to the same gate.
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    counters: Arc<GateCounters>,
    capacity: usize,
}

impl ConcurrencyGate {
    /// Creates a gate with `capacity` slots (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            counters: Arc::new(GateCounters {
                in_use: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }),
            capacity,
        }
    }

    /// Waits for a free slot.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if `cancel` fires first. No slot is held in that case.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<GatePermit, Cancelled> {
        let permit = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Cancelled),
            permit = Arc::clone(&self.semaphore).acquire_owned() => {
                // The semaphore is never closed while the gate is alive.
                permit.map_err(|_| Cancelled)?
            }
        };

        let in_use = self.counters.in_use.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.peak.fetch_max(in_use, Ordering::SeqCst);
        trace!(in_use, capacity = self.capacity, "gate slot acquired");

        Ok(GatePermit {
            _permit: permit,
            counters: Arc::clone(&self.counters),
        })
    }

    /// Number of slots currently held.
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.counters.in_use.load(Ordering::SeqCst)
    }

    /// Highest number of slots held at the same time so far.
    #[must_use]
    pub fn peak(&self) -> usize {
        self.counters.peak.load(Ordering::SeqCst)
    }

    /// Total number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// A held gate slot, released on drop.
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
    counters: Arc<GateCounters>,
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.counters.in_use.fetch_sub(1, Ordering::SeqCst);
    }
}
