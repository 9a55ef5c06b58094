//! Normalized build status records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Short human label for a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusWord {
    Success,
    Failure,
    Offline,
}

impl StatusWord {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusWord::Success => "success",
            StatusWord::Failure => "failure",
            StatusWord::Offline => "offline",
        }
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// The normalized unit of build status produced by a feed backend.
///
/// A freshly constructed record (`StatusRecord::default()`) is offline.
/// Records are never mutated once stored; a change is always a new record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    /// Whether the feed was reachable and produced a parseable result.
    pub online: bool,

    /// Whether the most recent build succeeded. Meaningful only when online.
    pub success: bool,

    /// Build or status page associated with this status.
    pub url: Option<String>,

    /// Diagnostic text when fetching or parsing failed.
    pub error: Option<String>,

    /// When the source feed reported the build.
    pub published_at: Option<DateTime<Utc>>,

    /// Whether a build was in progress. Only set by building parsers.
    #[serde(default)]
    pub building: bool,
}

impl StatusRecord {
    /// An online record with every other field at its default.
    pub fn online() -> Self {
        Self {
            online: true,
            ..Self::default()
        }
    }

    /// An offline record carrying a diagnostic message.
    pub fn offline(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn with_success(mut self, success: bool) -> Self {
        self.success = success;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn published_at(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }

    pub fn with_building(mut self, building: bool) -> Self {
        self.building = building;
        self
    }

    /// Whether `other` describes the same observed state as `self`.
    ///
    /// Offline records collapse into one equivalence class that also absorbs
    /// online records: if either side is offline the two match. Two online
    /// records match when success, published time and url are all equal.
    pub fn matches(&self, other: &StatusRecord) -> bool {
        if !self.online || !other.online {
            return true;
        }
        self.success == other.success
            && self.published_at == other.published_at
            && self.url == other.url
    }

    pub fn in_words(&self) -> StatusWord {
        match (self.online, self.success) {
            (false, _) => StatusWord::Offline,
            (true, true) => StatusWord::Success,
            (true, false) => StatusWord::Failure,
        }
    }
}

impl AsRef<StatusRecord> for StatusRecord {
    fn as_ref(&self) -> &StatusRecord {
        self
    }
}
