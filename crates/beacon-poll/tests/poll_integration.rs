//! End-to-end poll cycles against a scripted fetcher and an in-memory ledger.

use async_trait::async_trait;
use beacon_core::{FeedKind, Project, StatusRecord};
use beacon_poll::{FeedFetcher, FetchError, Poller, Reconciliation};
use beacon_state::{MemoryStatusLedger, StatusLedger};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Serves canned bodies per URL; unknown URLs answer 503.
#[derive(Default)]
struct ScriptedFetcher {
    bodies: Mutex<HashMap<String, String>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    fn serve(&self, url: &str, body: &str) {
        self.bodies
            .lock()
            .unwrap()
            .insert(url.to_string(), body.to_string());
    }

    fn go_down(&self, url: &str) {
        self.bodies.lock().unwrap().remove(url);
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.bodies
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 503,
            })
    }
}

const FEED: &str = "http://ci.example.com/socialitis";

fn cctray(status: &str, time: &str, activity: &str) -> String {
    format!(
        r#"<Projects><Project name="socialitis" activity="{activity}" lastBuildStatus="{status}" lastBuildTime="{time}" webUrl="http://ci.example.com/socialitis/builds/{time}"/></Projects>"#
    )
}

fn setup() -> (Arc<MemoryStatusLedger>, Arc<ScriptedFetcher>, Poller) {
    let ledger = Arc::new(MemoryStatusLedger::new());
    let fetcher = Arc::new(ScriptedFetcher::default());
    let poller = Poller::new(ledger.clone(), fetcher.clone());
    (ledger, fetcher, poller)
}

#[tokio::test]
async fn test_first_status_is_recorded() {
    let (ledger, fetcher, poller) = setup();
    let project = Project::integrity("socialitis", FEED);
    fetcher.serve(FEED, &cctray("Success", "2007-01-04T00:00:00Z", "Sleeping"));

    let outcome = poller.poll_project(&project).await.unwrap().unwrap();

    assert_eq!(outcome.decision, Reconciliation::Record);
    assert!(outcome.status.online);
    assert!(outcome.status.success);
    let latest = ledger.latest(&project.id).await.unwrap().unwrap();
    assert_eq!(latest.status, outcome.status);
    assert_eq!(outcome.stored.unwrap().id, latest.id);
}

#[tokio::test]
async fn test_identical_status_is_not_recorded_twice() {
    let (ledger, fetcher, poller) = setup();
    let project = Project::integrity("socialitis", FEED);
    fetcher.serve(FEED, &cctray("Success", "2007-01-04T00:00:00Z", "Sleeping"));

    poller.poll_project(&project).await.unwrap();
    let second = poller.poll_project(&project).await.unwrap().unwrap();

    assert_eq!(second.decision, Reconciliation::Unchanged);
    assert!(second.stored.is_none());
    assert_eq!(ledger.history(&project.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_changed_status_is_recorded() {
    let (ledger, fetcher, poller) = setup();
    let project = Project::integrity("socialitis", FEED);

    fetcher.serve(FEED, &cctray("Success", "2007-01-04T00:00:00Z", "Sleeping"));
    poller.poll_project(&project).await.unwrap();
    fetcher.serve(FEED, &cctray("Failure", "2007-01-05T00:00:00Z", "Sleeping"));
    poller.poll_project(&project).await.unwrap();

    let history = ledger.history(&project.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].status.success);
    assert!(!history[1].status.success);
}

#[tokio::test]
async fn test_offline_recorded_only_without_history() {
    let (ledger, _fetcher, poller) = setup();
    let project = Project::integrity("socialitis", FEED);

    let first = poller.poll_project(&project).await.unwrap().unwrap();
    assert_eq!(first.decision, Reconciliation::Record);
    assert!(!first.status.online);
    assert!(first.status.error.unwrap().contains("503"));

    // Offline matches any stored status, so a second failure is not stored.
    let second = poller.poll_project(&project).await.unwrap().unwrap();
    assert_eq!(second.decision, Reconciliation::Unchanged);
    assert_eq!(ledger.history(&project.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_recovery_after_first_poll_outage_is_recorded() {
    let (ledger, fetcher, poller) = setup();
    let project = Project::integrity("socialitis", FEED);

    let outage = poller.poll_project(&project).await.unwrap().unwrap();
    assert_eq!(outage.decision, Reconciliation::Record);

    fetcher.serve(FEED, &cctray("Success", "2007-01-04T00:00:00Z", "Sleeping"));
    let recovered = poller.poll_project(&project).await.unwrap().unwrap();
    assert_eq!(recovered.decision, Reconciliation::Record);

    fetcher.serve(FEED, &cctray("Failure", "2007-01-05T00:00:00Z", "Sleeping"));
    let broken = poller.poll_project(&project).await.unwrap().unwrap();
    assert_eq!(broken.decision, Reconciliation::Record);

    let again = poller.poll_project(&project).await.unwrap().unwrap();
    assert_eq!(again.decision, Reconciliation::Unchanged);

    let history = ledger.history(&project.id).await.unwrap();
    let online: Vec<_> = history.iter().map(|row| row.status.online).collect();
    assert_eq!(online, vec![false, true, true]);
    let latest = ledger.latest(&project.id).await.unwrap().unwrap();
    assert!(latest.status.online);
    assert!(!latest.status.success);
}

#[tokio::test]
async fn test_garbage_first_then_valid_feed_is_recorded() {
    let (ledger, fetcher, poller) = setup();
    let project = Project::integrity("socialitis", FEED);

    fetcher.serve(FEED, "<html>502 Bad Gateway</html>");
    poller.poll_project(&project).await.unwrap();
    fetcher.serve(FEED, &cctray("Success", "2007-01-04T00:00:00Z", "Sleeping"));
    poller.poll_project(&project).await.unwrap();

    let latest = ledger.latest(&project.id).await.unwrap().unwrap();
    assert!(latest.status.online);
    assert_eq!(ledger.history(&project.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_fetch_failure_after_success_is_unchanged() {
    let (ledger, fetcher, poller) = setup();
    let project = Project::integrity("socialitis", FEED);

    fetcher.serve(FEED, &cctray("Success", "2007-01-04T00:00:00Z", "Sleeping"));
    poller.poll_project(&project).await.unwrap();
    fetcher.go_down(FEED);
    let outcome = poller.poll_project(&project).await.unwrap().unwrap();

    assert!(!outcome.status.online);
    assert_eq!(outcome.decision, Reconciliation::Unchanged);
    let latest = ledger.latest(&project.id).await.unwrap().unwrap();
    assert!(latest.status.online);
}

#[tokio::test]
async fn test_garbage_feed_becomes_offline_status() {
    let (_ledger, fetcher, poller) = setup();
    let project = Project::integrity("socialitis", FEED);
    fetcher.serve(FEED, "<html>502 Bad Gateway</html>");

    let outcome = poller.poll_project(&project).await.unwrap().unwrap();

    assert!(!outcome.status.online);
    assert!(outcome.status.error.is_some());
}

#[tokio::test]
async fn test_integrity_reuses_body_for_building() {
    let (_ledger, fetcher, poller) = setup();
    let project = Project::integrity("socialitis", FEED);
    fetcher.serve(FEED, &cctray("Success", "2007-01-04T00:00:00Z", "Building"));

    let outcome = poller.poll_project(&project).await.unwrap().unwrap();

    assert!(outcome.building);
    assert_eq!(fetcher.requests(), vec![FEED.to_string()]);
}

#[tokio::test]
async fn test_jenkins_fetches_both_endpoints() {
    let (ledger, fetcher, poller) = setup();
    let feed = "http://jenkins.example.com/job/beacon";
    let project = Project::new("beacon", FeedKind::Jenkins, Some(feed.to_string()));
    fetcher.serve(
        &format!("{feed}/lastCompletedBuild/api/json"),
        r#"{"result":"FAILURE","building":false,"timestamp":1167868800000,"url":"http://jenkins.example.com/job/beacon/42/"}"#,
    );
    fetcher.serve(
        &format!("{feed}/lastBuild/api/json"),
        r#"{"result":null,"building":true,"timestamp":1167955200000,"url":"http://jenkins.example.com/job/beacon/43/"}"#,
    );

    let outcome = poller.poll_project(&project).await.unwrap().unwrap();

    assert!(outcome.status.online);
    assert!(!outcome.status.success);
    assert!(outcome.building);
    assert_eq!(fetcher.requests().len(), 2);
    assert_eq!(
        ledger.latest(&project.id).await.unwrap().unwrap().status.url.as_deref(),
        Some("http://jenkins.example.com/job/beacon/42/")
    );
}

#[tokio::test]
async fn test_project_without_feed_is_skipped() {
    let (_ledger, fetcher, poller) = setup();
    let project = Project::new("manual", FeedKind::Integrity, None);

    assert!(poller.poll_project(&project).await.unwrap().is_none());
    assert!(fetcher.requests().is_empty());
}

#[tokio::test]
async fn test_poll_all_report_and_online_query() {
    let (ledger, fetcher, poller) = setup();
    let socialitis = Project::integrity("socialitis", FEED);
    let other_feed = "http://ci.example.com/other";
    let other = Project::integrity("other", other_feed);
    let manual = Project::new("manual", FeedKind::Integrity, None);
    fetcher.serve(FEED, &cctray("Success", "2007-01-04T00:00:00Z", "Sleeping"));
    fetcher.serve(
        other_feed,
        r#"<Projects><Project name="other" lastBuildStatus="Failure" lastBuildTime="2007-01-05T00:00:00Z" webUrl="http://ci.example.com/other/1"/></Projects>"#,
    );
    let projects = vec![socialitis.clone(), other.clone(), manual];

    let report = poller.poll_all(&projects).await.unwrap();
    assert_eq!(report.recorded(), 2);
    assert_eq!(report.unchanged(), 0);
    assert_eq!(report.skipped, vec!["manual".to_string()]);

    let again = poller.poll_all(&projects).await.unwrap();
    assert_eq!(again.recorded(), 0);
    assert_eq!(again.unchanged(), 2);

    let online = ledger
        .online(&[socialitis.id, other.id], 10)
        .await
        .unwrap();
    let urls: Vec<_> = online
        .iter()
        .map(|row| row.status.url.clone().unwrap())
        .collect();
    assert_eq!(
        urls,
        vec![
            "http://ci.example.com/other/1".to_string(),
            "http://ci.example.com/socialitis/builds/2007-01-04T00:00:00Z".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_recorded_status_keeps_fetched_fields() {
    let (ledger, fetcher, poller) = setup();
    let project = Project::integrity("socialitis", FEED);
    fetcher.serve(FEED, &cctray("Failure", "2007-01-04T00:00:00Z", "Sleeping"));

    poller.poll_project(&project).await.unwrap();

    let stored: StatusRecord = ledger.latest(&project.id).await.unwrap().unwrap().status;
    assert_eq!(stored.in_words().as_str(), "failure");
    assert_eq!(
        stored.published_at.map(|t| t.to_rfc3339()),
        Some("2007-01-04T00:00:00+00:00".to_string())
    );
}
