//! Row bookkeeping shared by the ledger backends.

use beacon_core::{OnlineStatusQuery, ProjectId, StatusRecord};
use chrono::Utc;

use crate::storage_traits::{ProjectStatus, StatusId};

#[derive(Debug, Default)]
pub(crate) struct LedgerRows {
    last_id: u64,
    rows: Vec<ProjectStatus>,
}

impl LedgerRows {
    /// Rebuild from stored rows, which must be in id order.
    pub(crate) fn from_rows(rows: Vec<ProjectStatus>) -> Self {
        let last_id = rows.last().map_or(0, |r| r.id.0);
        Self { last_id, rows }
    }

    /// The row `append` would store, without storing it.
    pub(crate) fn next_row(&self, project_id: &ProjectId, status: StatusRecord) -> ProjectStatus {
        ProjectStatus {
            id: StatusId(self.last_id + 1),
            project_id: *project_id,
            status,
            recorded_at: Utc::now(),
        }
    }

    /// Store a row produced by `next_row`.
    pub(crate) fn push(&mut self, row: ProjectStatus) {
        self.last_id = row.id.0;
        self.rows.push(row);
    }

    pub(crate) fn append(&mut self, project_id: &ProjectId, status: StatusRecord) -> ProjectStatus {
        let row = self.next_row(project_id, status);
        self.push(row.clone());
        row
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &ProjectStatus> {
        self.rows.iter()
    }

    pub(crate) fn latest(&self, project_id: &ProjectId) -> Option<ProjectStatus> {
        self.rows
            .iter()
            .rev()
            .find(|r| r.project_id == *project_id)
            .cloned()
    }

    pub(crate) fn history(&self, project_id: &ProjectId) -> Vec<ProjectStatus> {
        self.rows
            .iter()
            .filter(|r| r.project_id == *project_id)
            .cloned()
            .collect()
    }

    pub(crate) fn online(&self, project_ids: &[ProjectId], limit: usize) -> Vec<ProjectStatus> {
        // Rows are kept in id order, so the stable sort breaks ties by id.
        let scoped = self
            .rows
            .iter()
            .filter(|r| project_ids.contains(&r.project_id));
        OnlineStatusQuery::new(limit)
            .select(scoped)
            .into_iter()
            .cloned()
            .collect()
    }

    pub(crate) fn purge(&mut self, project_id: &ProjectId) -> usize {
        let before = self.rows.len();
        self.rows.retain(|r| r.project_id != *project_id);
        before - self.rows.len()
    }
}
