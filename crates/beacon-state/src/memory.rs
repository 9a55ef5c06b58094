//! In-memory status ledger
//!
//! Keeps every row in a `Vec` behind a mutex. Used by the CLI when no ledger
//! file is configured and by tests.

use std::sync::Mutex;

use async_trait::async_trait;
use beacon_core::{ProjectId, StatusRecord};

use crate::rows::LedgerRows;
use crate::storage_traits::*;

#[derive(Debug, Default)]
pub struct MemoryStatusLedger {
    rows: Mutex<LedgerRows>,
}

impl MemoryStatusLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatusLedger for MemoryStatusLedger {
    async fn append(
        &self,
        project_id: &ProjectId,
        status: StatusRecord,
    ) -> StorageResult<ProjectStatus> {
        let mut rows = self.rows.lock()?;
        Ok(rows.append(project_id, status))
    }

    async fn latest(&self, project_id: &ProjectId) -> StorageResult<Option<ProjectStatus>> {
        Ok(self.rows.lock()?.latest(project_id))
    }

    async fn history(&self, project_id: &ProjectId) -> StorageResult<Vec<ProjectStatus>> {
        Ok(self.rows.lock()?.history(project_id))
    }

    async fn online(
        &self,
        project_ids: &[ProjectId],
        limit: usize,
    ) -> StorageResult<Vec<ProjectStatus>> {
        Ok(self.rows.lock()?.online(project_ids, limit))
    }

    async fn purge(&self, project_id: &ProjectId) -> StorageResult<usize> {
        let mut rows = self.rows.lock()?;
        Ok(rows.purge(project_id))
    }
}
