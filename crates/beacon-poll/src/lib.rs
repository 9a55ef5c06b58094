//! Beacon Poll - feed ingestion
//!
//! Fetches each project's status feed, parses it with the project's backend,
//! compares the result with the latest stored status and appends it to the
//! ledger only when the observed state changed.

pub mod fetcher;
pub mod poller;
pub mod reconcile;

// Re-export key types
pub use fetcher::{FeedFetcher, FetchError, HttpFeedFetcher};
pub use poller::{PollError, PollOutcome, PollReport, Poller};
pub use reconcile::{reconcile, Reconciliation};
