//! Dashboard configuration loaded from TOML.

use anyhow::{bail, Context, Result};
use beacon_core::{AggregateProject, BeaconError, FeedKind, Project, ProjectId};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_dashboard_limit() -> usize {
    10
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BeaconConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// How many online statuses the dashboard lists.
    #[serde(default = "default_dashboard_limit")]
    pub dashboard_limit: usize,

    /// JSON ledger file. Statuses are kept in memory when unset.
    pub ledger_path: Option<PathBuf>,

    #[serde(default)]
    pub projects: Vec<ProjectConfig>,

    #[serde(default)]
    pub aggregates: Vec<AggregateConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub kind: FeedKind,
    pub feed_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregateConfig {
    pub name: String,
    #[serde(default)]
    pub projects: Vec<String>,
}

impl BeaconConfig {
    /// Read and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            bail!("poll_interval_secs must be greater than zero");
        }

        let mut names = HashSet::new();
        for project in self.projects() {
            project
                .validate()
                .map_err(BeaconError::from)
                .with_context(|| format!("project '{}'", project.name))?;
            if !names.insert(project.name.clone()) {
                bail!("project '{}' is configured twice", project.name);
            }
        }

        for aggregate in &self.aggregates {
            for member in &aggregate.projects {
                if !names.contains(member) {
                    bail!(
                        "aggregate '{}' names unknown project '{}'",
                        aggregate.name,
                        member
                    );
                }
            }
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Configured projects, with ids stable across runs.
    pub fn projects(&self) -> Vec<Project> {
        self.projects
            .iter()
            .map(|p| {
                let mut project = Project::new(p.name.clone(), p.kind, p.feed_url.clone());
                project.id = ProjectId::for_name(&p.name);
                project
            })
            .collect()
    }

    pub fn aggregates(&self) -> Vec<AggregateProject> {
        self.aggregates
            .iter()
            .map(|a| {
                let mut aggregate = AggregateProject::new(a.name.clone());
                for member in &a.projects {
                    aggregate.add(ProjectId::for_name(member));
                }
                aggregate
            })
            .collect()
    }
}
