//! Projects and aggregate projects.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::error::ValidationErrors;
use super::status::{StatusRecord, StatusWord};
use crate::feed::{FeedBackend, FeedKind};
use crate::query::OnlineStatusQuery;

/// Unique identifier for a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub Uuid);

impl ProjectId {
    /// Generate a new random ProjectId
    pub fn new() -> Self {
        ProjectId(Uuid::new_v4())
    }

    /// Stable id derived from a project name, so configured projects keep
    /// their identity across runs.
    pub fn for_name(name: &str) -> Self {
        ProjectId(Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()))
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A monitored CI project and the statuses recorded for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub kind: FeedKind,
    pub feed_url: Option<String>,
    /// Recorded statuses in insertion order.
    #[serde(default)]
    pub statuses: Vec<StatusRecord>,
}

impl Project {
    pub fn new(name: impl Into<String>, kind: FeedKind, feed_url: Option<String>) -> Self {
        Self {
            id: ProjectId::new(),
            name: name.into(),
            kind,
            feed_url,
            statuses: Vec::new(),
        }
    }

    /// An Integrity project.
    pub fn integrity(name: impl Into<String>, feed_url: impl Into<String>) -> Self {
        Self::new(name, FeedKind::Integrity, Some(feed_url.into()))
    }

    pub fn backend(&self) -> &'static dyn FeedBackend {
        self.kind.backend()
    }

    /// Check field constraints. An invalid feed URL yields exactly one
    /// `feed_url` error.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "can't be blank");
        }
        if !self
            .backend()
            .url_pattern()
            .is_valid(self.feed_url.as_deref())
        {
            errors.add(
                "feed_url",
                format!("does not match the {} feed url format", self.kind),
            );
        }
        errors.into_result()
    }

    /// Project name on the CI server, extracted from the feed URL.
    pub fn project_name(&self) -> Option<String> {
        self.backend()
            .url_pattern()
            .extract_name(self.feed_url.as_deref())
    }

    pub fn build_status_url(&self) -> Option<String> {
        self.feed_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .map(|u| self.backend().build_status_url(u))
    }

    pub fn building_url(&self) -> Option<String> {
        self.feed_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .map(|u| self.backend().building_url(u))
    }

    pub fn status_parser(&self, content: &str) -> StatusRecord {
        self.backend()
            .status_parser(content, self.project_name().as_deref())
    }

    pub fn building_parser(&self, content: &str) -> StatusRecord {
        self.backend()
            .building_parser(content, self.project_name().as_deref())
    }

    pub fn latest_status(&self) -> Option<&StatusRecord> {
        self.statuses.last()
    }

    /// Most recent online statuses of this project alone.
    pub fn online_statuses(&self, limit: usize) -> Vec<&StatusRecord> {
        OnlineStatusQuery::new(limit).select(self.statuses.iter())
    }
}

/// A named group of projects. Purely a grouping: it owns none of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateProject {
    pub id: Uuid,
    pub name: String,
    project_ids: Vec<ProjectId>,
}

impl AggregateProject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            project_ids: Vec::new(),
        }
    }

    pub fn project_ids(&self) -> &[ProjectId] {
        &self.project_ids
    }

    /// Add a member. Returns `false` if it was already present.
    pub fn add(&mut self, project_id: ProjectId) -> bool {
        if self.project_ids.contains(&project_id) {
            return false;
        }
        self.project_ids.push(project_id);
        true
    }

    /// Drop a member. The project itself is untouched.
    pub fn remove(&mut self, project_id: &ProjectId) -> bool {
        let before = self.project_ids.len();
        self.project_ids.retain(|id| id != project_id);
        self.project_ids.len() != before
    }

    /// Member projects found in `projects`, in membership order.
    pub fn projects_in<'a>(&self, projects: &'a [Project]) -> Vec<&'a Project> {
        self.project_ids
            .iter()
            .filter_map(|id| projects.iter().find(|p| p.id == *id))
            .collect()
    }

    /// Failure if any member's latest status is an online failure, success if
    /// any other member is online, offline otherwise.
    pub fn status_in_words(&self, projects: &[Project]) -> StatusWord {
        let words: Vec<StatusWord> = self
            .projects_in(projects)
            .into_iter()
            .filter_map(|p| p.latest_status())
            .map(StatusRecord::in_words)
            .collect();

        if words.contains(&StatusWord::Failure) {
            StatusWord::Failure
        } else if words.contains(&StatusWord::Success) {
            StatusWord::Success
        } else {
            StatusWord::Offline
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED_URL: &str = "http://foo.bar.com:9292/example_project";

    fn project() -> Project {
        Project::integrity("my_integrity_project", FEED_URL)
    }

    #[test]
    fn test_project_id_for_name_is_stable() {
        assert_eq!(ProjectId::for_name("socialitis"), ProjectId::for_name("socialitis"));
        assert_ne!(ProjectId::for_name("socialitis"), ProjectId::for_name("other"));
    }

    #[test]
    fn test_project_name_nil_without_feed_url() {
        let mut project = project();
        project.feed_url = None;
        assert_eq!(project.project_name(), None);
        assert_eq!(project.build_status_url(), None);
    }

    #[test]
    fn test_project_name_from_feed_url() {
        assert_eq!(project().project_name().as_deref(), Some("example_project"));

        let mut project = project();
        project.feed_url = Some(FEED_URL.to_uppercase());
        assert_eq!(project.project_name().as_deref(), Some("EXAMPLE_PROJECT"));
    }

    #[test]
    fn test_requires_integrity_url_format() {
        let mut project = project();
        assert!(project.validate().is_ok());

        project.feed_url = Some("http://foo.bar.com:9292/wrong/wrong".to_string());
        let errors = project.validate().unwrap_err();
        assert_eq!(errors.errors_on("feed_url").len(), 1);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_feed_url_is_optional() {
        let mut project = project();
        project.feed_url = None;
        assert!(project.validate().is_ok());
        project.feed_url = Some(String::new());
        assert!(project.validate().is_ok());
    }

    #[test]
    fn test_requires_name() {
        let mut project = project();
        project.name = "  ".to_string();
        let errors = project.validate().unwrap_err();
        assert_eq!(errors.errors_on("name").len(), 1);
    }

    #[test]
    fn test_jenkins_project_rejects_integrity_url() {
        let project = Project::new("beacon", FeedKind::Jenkins, Some(FEED_URL.to_string()));
        assert_eq!(
            project.validate().unwrap_err().errors_on("feed_url").len(),
            1
        );
    }

    #[test]
    fn test_parsers_handle_bad_data() {
        let project = project();
        assert!(!project.status_parser("asdfa").online);
        assert!(!project.building_parser("asdfas").online);
    }

    #[test]
    fn test_status_parser_uses_extracted_project_name() {
        let feed = r#"<Projects>
            <Project name="someone_else" lastBuildStatus="Failure" lastBuildTime="2007-01-03T00:00:00Z"/>
            <Project name="example_project" lastBuildStatus="Success" lastBuildTime="2007-01-04T00:00:00Z"/>
        </Projects>"#;
        assert!(project().status_parser(feed).success);
    }

    #[test]
    fn test_build_status_url_is_feed_url() {
        assert_eq!(project().build_status_url().as_deref(), Some(FEED_URL));
        assert_eq!(project().building_url().as_deref(), Some(FEED_URL));
    }

    #[test]
    fn test_aggregate_membership() {
        let a = project();
        let mut aggregate = AggregateProject::new("internal");
        assert!(aggregate.add(a.id));
        assert!(!aggregate.add(a.id));
        assert_eq!(aggregate.project_ids(), &[a.id]);

        let projects = vec![a.clone()];
        assert_eq!(aggregate.projects_in(&projects).len(), 1);

        assert!(aggregate.remove(&a.id));
        assert!(!aggregate.remove(&a.id));
        assert!(aggregate.projects_in(&projects).is_empty());
        assert_eq!(projects[0], a);
    }

    #[test]
    fn test_aggregate_status_in_words() {
        let mut green = project();
        green.statuses.push(StatusRecord::online().with_success(true));
        let mut red = project();
        red.statuses.push(StatusRecord::online().with_success(false));
        let mut dark = project();
        dark.statuses.push(StatusRecord::offline("timeout"));

        let projects = vec![green.clone(), red.clone(), dark.clone()];

        let mut aggregate = AggregateProject::new("all");
        assert_eq!(aggregate.status_in_words(&projects), StatusWord::Offline);

        aggregate.add(dark.id);
        assert_eq!(aggregate.status_in_words(&projects), StatusWord::Offline);

        aggregate.add(green.id);
        assert_eq!(aggregate.status_in_words(&projects), StatusWord::Success);

        aggregate.add(red.id);
        assert_eq!(aggregate.status_in_words(&projects), StatusWord::Failure);
    }
}
