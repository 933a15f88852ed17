//! Typed errors for the watcher library.
//!
//! Uses `thiserror` for library errors (not `anyhow`); everything here is
//! fatal to the current run and aborts it before any state is persisted.

use thiserror::Error;

use crate::types::ReviewRecord;

/// Lifecycle invariants checked by the validator, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invariant {
    /// 4: every known review must have `latest_event` populated once
    /// detail has been attached.
    EventPopulated,
    /// 1: a completed review must have a made electoral change order.
    CompletedImpliesMade,
    /// 5: a slug seen for the first time must not already be completed.
    NewMustBeCurrent,
    /// 2: status never regresses from completed to current.
    StatusMonotonic,
    /// 3: `eco_made` never regresses from true to false.
    EcoMonotonic,
}

impl Invariant {
    pub fn id(&self) -> u8 {
        match self {
            Invariant::CompletedImpliesMade => 1,
            Invariant::StatusMonotonic => 2,
            Invariant::EcoMonotonic => 3,
            Invariant::EventPopulated => 4,
            Invariant::NewMustBeCurrent => 5,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Invariant::EventPopulated => "failed to populate 'latest_event' field",
            Invariant::CompletedImpliesMade => {
                "found 'completed' record which is not a made electoral change order"
            }
            Invariant::NewMustBeCurrent => "new record found but status is already 'completed'",
            Invariant::StatusMonotonic => "record status has regressed from 'completed' to 'current'",
            Invariant::EcoMonotonic => "'eco_made' field has regressed from true to false",
        }
    }
}

impl std::fmt::Display for Invariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invariant {}: {}", self.id(), self.describe())
    }
}

/// Errors that abort a watcher run.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The index page layout changed: the heading set found does not match
    /// the expected one, so nothing downstream can be trusted.
    #[error("unexpected index page structure: found headings {found:?}")]
    Structure { found: Vec<String> },

    /// The detail crawl returned a slug absent from the index snapshot.
    /// Either the index and detail crawls raced, or parsing broke.
    #[error("detail crawl returned unknown slug: {slug}")]
    UnexpectedSlug { slug: String },

    /// A lifecycle invariant was violated; carries both record versions
    /// for diagnosis.
    #[error("validation failed for '{slug}': {invariant}")]
    Validation {
        invariant: Invariant,
        slug: String,
        prior: Option<Box<ReviewRecord>>,
        current: Box<ReviewRecord>,
    },

    /// More than one persisted row for a slug. Never expected; signals
    /// store corruption or a bug elsewhere.
    #[error("store corruption: {rows} rows persisted for slug '{slug}'")]
    StoreCorruption { slug: String, rows: usize },

    /// The configured index URL is not a valid absolute URL. A setup
    /// problem, not a network one.
    #[error("invalid index url '{url}': {source}")]
    BadIndexUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Index fetch failed; without the index there is no snapshot.
    #[error("fetch failed: {0}")]
    Fetch(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Storage operation failed.
    #[error("storage error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Snapshot export failed.
    #[error("export failed: {0}")]
    Export(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl WatchError {
    pub fn fetch(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        WatchError::Fetch(Box::new(err))
    }

    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        WatchError::Store(Box::new(err))
    }

    pub fn export(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        WatchError::Export(Box::new(err))
    }
}

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, WatchError>;
