//! Storage trait definitions for Beacon
//!
//! `StatusLedger` is the append-only store of status records per project.
//! It is async and backend-agnostic; `MemoryStatusLedger` and
//! `FileStatusLedger` implement it.

use async_trait::async_trait;
use beacon_core::{ProjectId, StatusRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Ledger-assigned row identifier, increasing with insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatusId(pub u64);

impl std::fmt::Display for StatusId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored status row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectStatus {
    pub id: StatusId,
    pub project_id: ProjectId,
    pub status: StatusRecord,
    pub recorded_at: DateTime<Utc>,
}

impl AsRef<StatusRecord> for ProjectStatus {
    fn as_ref(&self) -> &StatusRecord {
        &self.status
    }
}

/// Append-only status store.
///
/// Guarantees:
/// - Rows are never mutated after `append`.
/// - `history` returns a project's rows in insertion order.
/// - `online` merges rows of every given project, keeps online rows only,
///   orders them by `published_at` descending (undated last, ties by id) and
///   returns at most `limit` rows in total.
#[async_trait]
pub trait StatusLedger: Send + Sync {
    /// Store a status for a project and return the stored row.
    async fn append(
        &self,
        project_id: &ProjectId,
        status: StatusRecord,
    ) -> StorageResult<ProjectStatus>;

    /// Most recently appended row of a project.
    async fn latest(&self, project_id: &ProjectId) -> StorageResult<Option<ProjectStatus>>;

    /// All rows of a project, oldest first.
    async fn history(&self, project_id: &ProjectId) -> StorageResult<Vec<ProjectStatus>>;

    /// Most recent online rows across `project_ids`.
    async fn online(
        &self,
        project_ids: &[ProjectId],
        limit: usize,
    ) -> StorageResult<Vec<ProjectStatus>>;

    /// Delete every row of a project, returning how many were removed.
    async fn purge(&self, project_id: &ProjectId) -> StorageResult<usize>;
}
