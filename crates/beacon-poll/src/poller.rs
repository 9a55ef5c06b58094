//! Poll cycle: fetch, parse, reconcile, persist.

use beacon_core::obs::{
    emit_fetch_failed, emit_poll_finished, emit_poll_started, emit_status_recorded,
    emit_status_unchanged, poll_span,
};
use beacon_core::{Project, StatusRecord, METRICS};
use beacon_state::{ProjectStatus, StatusLedger, StorageError};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, Instrument};

use crate::fetcher::FeedFetcher;
use crate::reconcile::{reconcile, Reconciliation};

/// Errors that abort a poll.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("status ledger failed: {0}")]
    Storage(#[from] StorageError),
}

/// What happened to one project during a poll.
#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub project: String,

    /// Freshly parsed status, or the offline status built from a fetch error.
    pub status: StatusRecord,

    /// Whether the building feed reported a build in progress.
    pub building: bool,

    pub decision: Reconciliation,

    /// The stored row, when `decision` is `Record`.
    pub stored: Option<ProjectStatus>,
}

/// Result of polling a set of projects.
#[derive(Debug, Clone, Default)]
pub struct PollReport {
    pub outcomes: Vec<PollOutcome>,

    /// Projects without a feed URL.
    pub skipped: Vec<String>,

    pub duration_ms: u64,
}

impl PollReport {
    pub fn recorded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.decision == Reconciliation::Record)
            .count()
    }

    pub fn unchanged(&self) -> usize {
        self.outcomes.len() - self.recorded()
    }
}

/// Runs the ingestion pipeline against a ledger.
///
/// Projects are polled one after another, so at most one
/// fetch/compare/persist cycle runs per project at a time.
pub struct Poller {
    ledger: Arc<dyn StatusLedger>,
    fetcher: Arc<dyn FeedFetcher>,
}

impl Poller {
    pub fn new(ledger: Arc<dyn StatusLedger>, fetcher: Arc<dyn FeedFetcher>) -> Self {
        Self { ledger, fetcher }
    }

    /// Poll one project. Returns `None` when the project has no feed URL.
    pub async fn poll_project(&self, project: &Project) -> Result<Option<PollOutcome>, PollError> {
        let Some(status_url) = project.build_status_url() else {
            debug!(project = %project.name, "no feed url, skipping");
            return Ok(None);
        };

        let (status, body) = match self.fetcher.fetch(&status_url).await {
            Ok(body) => {
                METRICS.record_fetch(true);
                (project.status_parser(&body), Some(body))
            }
            Err(e) => {
                METRICS.record_fetch(false);
                emit_fetch_failed(&project.name, &status_url, &e);
                (StatusRecord::offline(e.to_string()), None)
            }
        };

        let building = match (body, project.building_url()) {
            (Some(body), Some(url)) if url == status_url => project.building_parser(&body).building,
            (Some(_), Some(url)) => match self.fetcher.fetch(&url).await {
                Ok(body) => project.building_parser(&body).building,
                Err(e) => {
                    emit_fetch_failed(&project.name, &url, &e);
                    false
                }
            },
            _ => false,
        };

        let history = self.ledger.history(&project.id).await?;
        let latest = history.last().map(|row| &row.status);
        let latest_online = history
            .iter()
            .rev()
            .map(|row| &row.status)
            .find(|s| s.online);
        let decision = reconcile(latest, latest_online, &status);
        METRICS.record_decision(decision == Reconciliation::Record);

        let stored = match decision {
            Reconciliation::Record => {
                let row = self.ledger.append(&project.id, status.clone()).await?;
                emit_status_recorded(&project.name, status.in_words().as_str(), status.online);
                Some(row)
            }
            Reconciliation::Unchanged => {
                emit_status_unchanged(&project.name);
                None
            }
        };

        Ok(Some(PollOutcome {
            project: project.name.clone(),
            status,
            building,
            decision,
            stored,
        }))
    }

    /// Poll every project in order.
    pub async fn poll_all(&self, projects: &[Project]) -> Result<PollReport, PollError> {
        let start = Instant::now();
        emit_poll_started(projects.len());

        let mut report = PollReport::default();
        for project in projects {
            let outcome = self
                .poll_project(project)
                .instrument(poll_span(&project.name))
                .await?;
            match outcome {
                Some(outcome) => report.outcomes.push(outcome),
                None => report.skipped.push(project.name.clone()),
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        emit_poll_finished(report.recorded(), report.unchanged(), report.duration_ms);
        METRICS.flush();
        Ok(report)
    }
}
