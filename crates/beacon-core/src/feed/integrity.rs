//! Integrity CI backend.
//!
//! Integrity publishes a cctray-style XML document at the project feed URL:
//!
//! ```xml
//! <Projects>
//!   <Project name="example_project" activity="Sleeping" lastBuildStatus="Success"
//!            lastBuildTime="2007-01-04T00:00:00Z" webUrl="http://ci/example_project"/>
//! </Projects>
//! ```
//!
//! Status and building information share that one document.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

use super::url::FeedUrlPattern;
use super::{parse_timestamp, FeedBackend, FeedKind};
use crate::domain::status::StatusRecord;

/// A `<Project ...>` start tag. Quoted values are consumed whole, so a
/// literal `>` inside an attribute does not end the element.
fn project_element() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<Project\b(?P<attrs>(?:[^>"']|"[^"]*"|'[^']*')*)>"#)
            .expect("project element pattern is valid")
    })
}

fn attribute() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?P<key>[A-Za-z_:][A-Za-z0-9_:.\-]*)\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#,
        )
        .expect("attribute pattern is valid")
    })
}

fn decode_entities(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Attributes of every `<Project>` element in document order.
fn project_elements(content: &str) -> Vec<HashMap<String, String>> {
    project_element()
        .captures_iter(content)
        .filter_map(|caps| caps.name("attrs"))
        .map(|attrs| {
            attribute()
                .captures_iter(attrs.as_str())
                .filter_map(|a| {
                    let key = a.name("key")?.as_str().to_string();
                    let value = a.name("dq").or_else(|| a.name("sq"))?.as_str();
                    Some((key, decode_entities(value)))
                })
                .collect()
        })
        .collect()
}

/// The element named `project_name` (case-insensitive), or the first one.
fn find_project(content: &str, project_name: Option<&str>) -> Option<HashMap<String, String>> {
    let mut elements = project_elements(content).into_iter();
    match project_name {
        Some(name) => elements.find(|attrs| {
            attrs
                .get("name")
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        }),
        None => elements.next(),
    }
}

/// Integrity feed backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegrityFeed;

impl FeedBackend for IntegrityFeed {
    fn kind(&self) -> FeedKind {
        FeedKind::Integrity
    }

    fn url_pattern(&self) -> &'static FeedUrlPattern {
        FeedUrlPattern::integrity()
    }

    fn build_status_url(&self, feed_url: &str) -> String {
        feed_url.to_string()
    }

    fn building_url(&self, feed_url: &str) -> String {
        feed_url.to_string()
    }

    fn status_parser(&self, content: &str, project_name: Option<&str>) -> StatusRecord {
        let Some(attrs) = find_project(content, project_name) else {
            debug!(project = ?project_name, "integrity status feed has no matching project");
            return StatusRecord::offline("no matching project in status feed");
        };

        let Some(last_status) = attrs.get("lastBuildStatus") else {
            return StatusRecord::offline("status feed entry has no lastBuildStatus");
        };
        let Some(published_at) = attrs.get("lastBuildTime").and_then(|t| parse_timestamp(t))
        else {
            return StatusRecord::offline("status feed entry has no parseable lastBuildTime");
        };

        StatusRecord {
            online: true,
            success: last_status.eq_ignore_ascii_case("success"),
            url: attrs.get("webUrl").cloned(),
            error: None,
            published_at: Some(published_at),
            building: false,
        }
    }

    fn building_parser(&self, content: &str, project_name: Option<&str>) -> StatusRecord {
        let Some(attrs) = find_project(content, project_name) else {
            debug!(project = ?project_name, "integrity building feed has no matching project");
            return StatusRecord::offline("no matching project in building feed");
        };

        StatusRecord {
            online: true,
            building: attrs
                .get("activity")
                .is_some_and(|a| a.eq_ignore_ascii_case("building")),
            url: attrs.get("webUrl").cloned(),
            ..StatusRecord::default()
        }
    }
}
