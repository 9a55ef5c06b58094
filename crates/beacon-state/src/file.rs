//! JSON-lines file status ledger
//!
//! One `ProjectStatus` per line, in id order. Appends add a single line to
//! the end of the file; only `purge` rewrites it, through a temporary file in
//! the same directory that is renamed into place.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use beacon_core::{ProjectId, StatusRecord};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StorageError;
use crate::rows::LedgerRows;
use crate::storage_traits::*;

#[derive(Debug)]
pub struct FileStatusLedger {
    path: PathBuf,
    rows: Mutex<LedgerRows>,
}

impl FileStatusLedger {
    /// Open the ledger at `path`, starting empty when the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let rows = match fs::read_to_string(&path) {
            Ok(content) => read_rows(&path, &content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), rows = rows.len(), "opened status ledger");
        Ok(Self {
            path,
            rows: Mutex::new(LedgerRows::from_rows(rows)),
        })
    }

    fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn append_line(&self, row: &ProjectStatus) -> StorageResult<()> {
        fs::create_dir_all(self.dir())?;
        let mut line = serde_json::to_string(row)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    fn rewrite<'a>(&self, rows: impl Iterator<Item = &'a ProjectStatus>) -> StorageResult<()> {
        let dir = self.dir();
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        for row in rows {
            serde_json::to_writer(&mut tmp, row)?;
            tmp.write_all(b"\n")?;
        }
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

fn read_rows(path: &Path, content: &str) -> StorageResult<Vec<ProjectStatus>> {
    let mut rows: Vec<ProjectStatus> = Vec::new();
    for (n, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let row: ProjectStatus = serde_json::from_str(line).map_err(|e| StorageError::Corrupt {
            path: path.display().to_string(),
            reason: format!("line {}: {}", n + 1, e),
        })?;
        if rows.last().is_some_and(|prev| prev.id >= row.id) {
            return Err(StorageError::Corrupt {
                path: path.display().to_string(),
                reason: format!("line {}: status id {} out of order", n + 1, row.id),
            });
        }
        rows.push(row);
    }
    Ok(rows)
}

#[async_trait]
impl StatusLedger for FileStatusLedger {
    async fn append(
        &self,
        project_id: &ProjectId,
        status: StatusRecord,
    ) -> StorageResult<ProjectStatus> {
        let mut rows = self.rows.lock()?;
        let row = rows.next_row(project_id, status);
        self.append_line(&row)?;
        rows.push(row.clone());
        Ok(row)
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
        let doomed = rows.iter().filter(|r| r.project_id == *project_id).count();
        if doomed > 0 {
            self.rewrite(rows.iter().filter(|r| r.project_id != *project_id))?;
            rows.purge(project_id);
        }
        Ok(doomed)
    }
}
