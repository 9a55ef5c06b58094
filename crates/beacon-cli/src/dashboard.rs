//! Dashboard view over the status ledger.

use beacon_core::{AggregateProject, Project, StatusWord};
use beacon_state::{StatusLedger, StorageResult};
use std::collections::HashMap;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectLine {
    pub name: String,
    pub words: StatusWord,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OnlineLine {
    pub project: String,
    pub words: StatusWord,
    pub published_at: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub projects: Vec<ProjectLine>,
    pub aggregates: Vec<(String, StatusWord)>,
    pub online: Vec<OnlineLine>,
}

impl Dashboard {
    /// Load each project's history from the ledger and summarize it.
    pub async fn load(
        ledger: &dyn StatusLedger,
        projects: &[Project],
        aggregates: &[AggregateProject],
        limit: usize,
    ) -> StorageResult<Self> {
        let mut hydrated = Vec::with_capacity(projects.len());
        for project in projects {
            let mut project = project.clone();
            project.statuses = ledger
                .history(&project.id)
                .await?
                .into_iter()
                .map(|row| row.status)
                .collect();
            hydrated.push(project);
        }

        let project_lines = hydrated
            .iter()
            .map(|p| {
                let latest = p.latest_status().cloned().unwrap_or_default();
                ProjectLine {
                    name: p.name.clone(),
                    words: latest.in_words(),
                    url: latest.url,
                }
            })
            .collect();

        let aggregate_lines = aggregates
            .iter()
            .map(|a| (a.name.clone(), a.status_in_words(&hydrated)))
            .collect();

        let names: HashMap<_, _> = hydrated.iter().map(|p| (p.id, p.name.as_str())).collect();
        let ids: Vec<_> = hydrated.iter().map(|p| p.id).collect();
        let online = ledger
            .online(&ids, limit)
            .await?
            .into_iter()
            .map(|row| OnlineLine {
                project: names
                    .get(&row.project_id)
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| row.project_id.to_string()),
                words: row.status.in_words(),
                published_at: row.status.published_at.map(|t| t.to_string()),
                url: row.status.url,
            })
            .collect();

        Ok(Self {
            projects: project_lines,
            aggregates: aggregate_lines,
            online,
        })
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Projects");
        if self.projects.is_empty() {
            let _ = writeln!(out, "  (none configured)");
        }
        for line in &self.projects {
            let _ = writeln!(
                out,
                "  {:<24} {:<8} {}",
                line.name,
                line.words,
                line.url.as_deref().unwrap_or("-")
            );
        }

        if !self.aggregates.is_empty() {
            let _ = writeln!(out, "\nAggregates");
            for (name, words) in &self.aggregates {
                let _ = writeln!(out, "  {:<24} {}", name, words);
            }
        }

        let _ = writeln!(out, "\nRecent online statuses");
        if self.online.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for line in &self.online {
            let _ = writeln!(
                out,
                "  {:<24} {:<24} {:<8} {}",
                line.published_at.as_deref().unwrap_or("undated"),
                line.project,
                line.words,
                line.url.as_deref().unwrap_or("-")
            );
        }
        out
    }
}
