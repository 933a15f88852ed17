use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Coarse lifecycle status of a review, taken from the index page heading
/// the review was listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Current,
    Completed,
}

impl ReviewStatus {
    /// Heading text used by the commission site for this status.
    pub fn label(&self) -> &'static str {
        match self {
            ReviewStatus::Current => "Current Reviews",
            ReviewStatus::Completed => "Recently Completed",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Current Reviews" => Some(ReviewStatus::Current),
            "Recently Completed" => Some(ReviewStatus::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Current => "current",
            ReviewStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "current" => Some(ReviewStatus::Current),
            "completed" => Some(ReviewStatus::Completed),
            _ => None,
        }
    }
}

/// One boundary review, keyed by its immutable slug.
///
/// The slug is the last path segment of the review's URL and is the primary
/// key everywhere (snapshot, store, notifications). Everything else is
/// mutable over the review's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub slug: String,
    pub name: String,
    pub url: String,
    pub status: ReviewStatus,
    /// Most recent lifecycle milestone text from the review's own page.
    /// None until per-page detail has been attached.
    pub latest_event: Option<String>,
    pub shapefile_link: Option<String>,
    pub eco_made: bool,
    /// Link to the legal instrument; only populated when `eco_made` is true.
    pub eco_order_link: Option<String>,
}

impl ReviewRecord {
    pub fn new(slug: String, name: String, url: String, status: ReviewStatus) -> Self {
        Self {
            slug,
            name,
            url,
            status,
            latest_event: None,
            shapefile_link: None,
            eco_made: false,
            eco_order_link: None,
        }
    }

    pub fn has_event(&self) -> bool {
        self.latest_event.as_deref().map(|e| !e.is_empty()).unwrap_or(false)
    }
}

/// Per-page detail scraped from one review's own page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDetail {
    pub slug: String,
    pub latest_event: String,
    pub shapefile_link: Option<String>,
    pub eco_made: bool,
    pub eco_order_link: Option<String>,
}

/// A full scraped snapshot, slug-ordered.
///
/// BTreeMap keeps validation, notification planning and the JSON export
/// deterministic.
pub type Snapshot = BTreeMap<String, ReviewRecord>;

/// Last non-empty path segment of a review URL.
pub fn slug_from_url(url: &str) -> Option<String> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty() && !s.contains(':'))
        .map(|s| s.to_string())
}

/// Normalize event text before storing or comparing it.
///
/// The site mixes non-breaking spaces and stray whitespace into otherwise
/// identical event strings; a raw `!=` on them produces phantom change
/// notifications. Collapse to single spaces and treat the empty result as
/// no event at all.
pub fn normalize_event(raw: &str) -> Option<String> {
    let cleaned = raw.replace('\u{a0}', " ");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Does this event text describe an electoral change order?
pub fn is_eco(event: &str) -> bool {
    event.to_lowercase().contains("electoral change")
}
