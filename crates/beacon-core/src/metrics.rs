//! Poll counters, flushed into one log event at the end of every cycle.

use std::sync::atomic::{AtomicU64, Ordering};

pub static METRICS: Metrics = Metrics::new();

/// Counter values at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollCounts {
    pub feeds_fetched: u64,
    pub fetch_failures: u64,
    pub statuses_recorded: u64,
    pub statuses_unchanged: u64,
}

/// Process-wide poll counters.
pub struct Metrics {
    fetched: AtomicU64,
    failed: AtomicU64,
    recorded: AtomicU64,
    unchanged: AtomicU64,
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            fetched: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            recorded: AtomicU64::new(0),
            unchanged: AtomicU64::new(0),
        }
    }

    /// Count one status feed fetch.
    pub fn record_fetch(&self, ok: bool) {
        let counter = if ok { &self.fetched } else { &self.failed };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one reconciliation: stored or skipped as unchanged.
    pub fn record_decision(&self, stored: bool) {
        let counter = if stored {
            &self.recorded
        } else {
            &self.unchanged
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PollCounts {
        PollCounts {
            feeds_fetched: self.fetched.load(Ordering::Relaxed),
            fetch_failures: self.failed.load(Ordering::Relaxed),
            statuses_recorded: self.recorded.load(Ordering::Relaxed),
            statuses_unchanged: self.unchanged.load(Ordering::Relaxed),
        }
    }

    pub fn flush(&self) {
        let counts = self.snapshot();
        tracing::info!(
            event = "metrics.flush",
            feeds_fetched = counts.feeds_fetched,
            fetch_failures = counts.fetch_failures,
            statuses_recorded = counts.statuses_recorded,
            statuses_unchanged = counts.statuses_unchanged,
        );
    }
}
