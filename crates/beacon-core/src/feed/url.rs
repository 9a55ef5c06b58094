//! Feed URL validation and project name extraction.
//!
//! Both operations are pattern based and never perform I/O. Validation is
//! strict about the URL shape a backend accepts; extraction is best effort
//! and returns `None` instead of failing.

use regex::Regex;
use std::sync::OnceLock;

/// `scheme://authority` followed by an optional path, query and fragment excluded.
const URL_PARTS: &str = r"^[A-Za-z][A-Za-z0-9+.\-]*://[^/\s?#]+(?P<path>/[^\s?#]*)?";

fn url_parts() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(URL_PARTS).expect("URL_PARTS is a valid pattern"))
}

/// The accepted feed URL shape for one CI backend.
#[derive(Debug)]
pub struct FeedUrlPattern {
    shape: Regex,
    /// Path segment that precedes the project name, if the backend nests it.
    name_after: Option<&'static str>,
}

impl FeedUrlPattern {
    /// `scheme://host[:port]/<project>`.
    pub fn integrity() -> &'static FeedUrlPattern {
        static PATTERN: OnceLock<FeedUrlPattern> = OnceLock::new();
        PATTERN.get_or_init(|| FeedUrlPattern {
            shape: Regex::new(r"(?i)^[a-z][a-z0-9+.\-]*://[^/\s?#]+/[^/\s?#]+$")
                .expect("integrity feed pattern is valid"),
            name_after: None,
        })
    }

    /// `scheme://host[:port]/job/<project>`.
    pub fn jenkins() -> &'static FeedUrlPattern {
        static PATTERN: OnceLock<FeedUrlPattern> = OnceLock::new();
        PATTERN.get_or_init(|| FeedUrlPattern {
            shape: Regex::new(r"(?i)^[a-z][a-z0-9+.\-]*://[^/\s?#]+/job/[^/\s?#]+$")
                .expect("jenkins feed pattern is valid"),
            name_after: Some("job"),
        })
    }

    /// An absent or empty URL is valid: CI wiring is opt-in.
    pub fn is_valid(&self, feed_url: Option<&str>) -> bool {
        match feed_url {
            None => true,
            Some(url) if url.is_empty() => true,
            Some(url) => self.shape.is_match(url),
        }
    }

    /// Extract the project name with its case preserved.
    pub fn extract_name(&self, feed_url: Option<&str>) -> Option<String> {
        let url = feed_url.filter(|u| !u.is_empty())?;
        let caps = url_parts().captures(url)?;
        let segments: Vec<&str> = caps
            .name("path")
            .map(|p| p.as_str().split('/').filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        if let Some(marker) = self.name_after {
            if let Some(pos) = segments
                .iter()
                .rposition(|s| s.eq_ignore_ascii_case(marker))
            {
                if let Some(name) = segments.get(pos + 1) {
                    return Some((*name).to_string());
                }
            }
        }

        segments.last().map(|s| (*s).to_string())
    }
}

/// Project name of an Integrity feed URL.
pub fn extract_name(feed_url: Option<&str>) -> Option<String> {
    FeedUrlPattern::integrity().extract_name(feed_url)
}

/// Whether an Integrity feed URL has the accepted shape.
pub fn is_valid(feed_url: Option<&str>) -> bool {
    FeedUrlPattern::integrity().is_valid(feed_url)
}
