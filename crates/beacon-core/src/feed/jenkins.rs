//! Jenkins CI backend.
//!
//! Reads the JSON build object served at `<job url>/lastCompletedBuild/api/json`
//! (status) and `<job url>/lastBuild/api/json` (building).

use chrono::{TimeZone, Utc};
use serde::Deserialize;
use tracing::debug;

use super::url::FeedUrlPattern;
use super::{FeedBackend, FeedKind};
use crate::domain::status::StatusRecord;

#[derive(Debug, Deserialize)]
struct JenkinsBuild {
    result: Option<String>,
    #[serde(default)]
    building: bool,
    timestamp: Option<i64>,
    url: Option<String>,
}

fn parse_build(content: &str) -> Result<JenkinsBuild, StatusRecord> {
    serde_json::from_str(content).map_err(|e| {
        debug!(error = %e, "jenkins feed is not a build object");
        StatusRecord::offline(format!("unparseable build json: {}", e))
    })
}

/// Jenkins feed backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct JenkinsFeed;

impl FeedBackend for JenkinsFeed {
    fn kind(&self) -> FeedKind {
        FeedKind::Jenkins
    }

    fn url_pattern(&self) -> &'static FeedUrlPattern {
        FeedUrlPattern::jenkins()
    }

    fn build_status_url(&self, feed_url: &str) -> String {
        format!("{}/lastCompletedBuild/api/json", feed_url.trim_end_matches('/'))
    }

    fn building_url(&self, feed_url: &str) -> String {
        format!("{}/lastBuild/api/json", feed_url.trim_end_matches('/'))
    }

    fn status_parser(&self, content: &str, _project_name: Option<&str>) -> StatusRecord {
        let build = match parse_build(content) {
            Ok(build) => build,
            Err(offline) => return offline,
        };
        let Some(result) = build.result else {
            return StatusRecord::offline("build has no result");
        };

        StatusRecord {
            online: true,
            success: result.eq_ignore_ascii_case("success"),
            url: build.url,
            error: None,
            published_at: build
                .timestamp
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
            building: false,
        }
    }

    fn building_parser(&self, content: &str, _project_name: Option<&str>) -> StatusRecord {
        match parse_build(content) {
            Ok(build) => StatusRecord {
                online: true,
                building: build.building,
                url: build.url,
                ..StatusRecord::default()
            },
            Err(offline) => offline,
        }
    }
}
