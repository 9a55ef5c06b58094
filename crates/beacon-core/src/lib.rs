//! Beacon Core Library
//!
//! Feed parsing, status reconciliation and online-status queries for the
//! Beacon CI dashboard. Everything here is synchronous and free of I/O;
//! fetching and persistence live in `beacon-poll` and `beacon-state`.

pub mod domain;
pub mod feed;
pub mod metrics;
pub mod obs;
pub mod query;
pub mod telemetry;

pub use domain::{
    AggregateProject, BeaconError, FieldError, Project, ProjectId, StatusRecord,
    StatusWord, ValidationErrors,
};
pub use feed::{
    extract_name, is_valid, FeedBackend, FeedKind, FeedUrlPattern, IntegrityFeed, JenkinsFeed,
};
pub use query::{online, OnlineStatusQuery};

pub use metrics::{PollCounts, METRICS};
pub use obs::{
    emit_fetch_failed, emit_poll_finished, emit_poll_started, emit_status_recorded,
    emit_status_unchanged, poll_span,
};
pub use telemetry::init_tracing;

/// Beacon version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
