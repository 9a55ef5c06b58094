//! Structured observability hooks for the poll lifecycle.
//!
//! - `poll_span` scoping log lines to one project
//! - emission functions for fetch, record and skip decisions

use tracing::info;

/// Project-scoped span for one poll.
///
/// ```ignore
/// poller.poll_project(&project).instrument(poll_span("socialitis")).await;
/// // every event inside carries project = "socialitis"
/// ```
pub fn poll_span(project: &str) -> tracing::Span {
    tracing::info_span!("beacon.poll", project = %project)
}

/// Emit event: a poll cycle started over `projects` projects.
pub fn emit_poll_started(projects: usize) {
    info!(event = "poll.started", projects = projects);
}

/// Emit event: a poll cycle finished.
pub fn emit_poll_finished(recorded: usize, unchanged: usize, duration_ms: u64) {
    info!(
        event = "poll.finished",
        recorded = recorded,
        unchanged = unchanged,
        duration_ms = duration_ms,
    );
}

/// Emit event: a new status was persisted.
pub fn emit_status_recorded(project: &str, words: &str, online: bool) {
    info!(event = "status.recorded", project = %project, status = %words, online = online);
}

/// Emit event: a fetched status matched the latest stored one and was skipped.
pub fn emit_status_unchanged(project: &str) {
    tracing::debug!(event = "status.unchanged", project = %project);
}

/// Emit event: fetching a feed failed (warning level).
pub fn emit_fetch_failed(project: &str, url: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(event = "feed.fetch_failed", project = %project, url = %url, error = %error);
}
