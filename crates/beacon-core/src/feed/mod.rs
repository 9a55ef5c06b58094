//! CI feed backends.
//!
//! Each supported CI server implements [`FeedBackend`]; the normalized
//! [`StatusRecord`] is the common output, so ingestion stays backend-agnostic.
//! Parsers are total: garbage in yields an offline record, never a panic or
//! an `Err`.

pub mod integrity;
pub mod jenkins;
pub mod url;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::BeaconError;
use crate::domain::status::StatusRecord;

pub use integrity::IntegrityFeed;
pub use jenkins::JenkinsFeed;
pub use url::{extract_name, is_valid, FeedUrlPattern};

/// Supported CI backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    #[default]
    Integrity,
    Jenkins,
}

impl FeedKind {
    pub const ALL: [FeedKind; 2] = [FeedKind::Integrity, FeedKind::Jenkins];

    /// The parser and URL rules for this backend.
    pub fn backend(&self) -> &'static dyn FeedBackend {
        match self {
            FeedKind::Integrity => &IntegrityFeed,
            FeedKind::Jenkins => &JenkinsFeed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::Integrity => "integrity",
            FeedKind::Jenkins => "jenkins",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedKind {
    type Err = BeaconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeedKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BeaconError::UnknownFeedKind(s.to_string()))
    }
}

/// Parsing and URL capabilities of one CI backend.
pub trait FeedBackend: Send + Sync {
    fn kind(&self) -> FeedKind;

    /// Accepted feed URL shape, used for validation and name extraction.
    fn url_pattern(&self) -> &'static FeedUrlPattern;

    /// Where the latest completed build status is published.
    fn build_status_url(&self, feed_url: &str) -> String;

    /// Where the in-progress build notification is published.
    fn building_url(&self, feed_url: &str) -> String;

    /// Parse a status payload. `project_name` selects the project when the
    /// payload lists several.
    fn status_parser(&self, content: &str, project_name: Option<&str>) -> StatusRecord;

    /// Parse an in-progress build payload.
    fn building_parser(&self, content: &str, project_name: Option<&str>) -> StatusRecord;
}

/// Parse a feed timestamp: RFC 3339, ISO-8601 with a numeric offset, or a
/// naive ISO-8601 value taken as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}
