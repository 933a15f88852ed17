//! The run pipeline.
//!
//! One run is sequential, start to finish: fetch index, attach per-page
//! detail, validate, plan notifications, persist, dispatch, prune stale
//! rows. Validation happens strictly before persistence, so a rejected run
//! leaves the store untouched; dispatch happens strictly after, so a flaky
//! sink can never corrupt saved state. Overlapping runs are prevented by
//! external scheduling, not by locking.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::error::{Result, WatchError};
use crate::export::write_snapshot;
use crate::fetch::{crawl_details, Fetcher};
use crate::index::parse_index;
use crate::notify::{dispatch, plan_notifications, NotificationEvent, Sinks};
use crate::reconcile::attach_details;
use crate::store::Store;
use crate::types::ReviewRecord;
use crate::validate::validate;

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Seed an empty store: relax prior-row invariants, plan nothing.
    pub bootstrap: bool,
    /// Gate on dispatch, independent of data integrity.
    pub send_notifications: bool,
    /// Index page whose links define the snapshot.
    pub index_url: String,
    /// Optional slug-sorted JSON mirror of the accepted snapshot.
    pub export_path: Option<PathBuf>,
}

/// What a completed run did.
#[derive(Debug)]
pub struct RunSummary {
    pub reviews: usize,
    pub events: Vec<NotificationEvent>,
    pub dispatch_failures: usize,
}

/// Execute one full watch run.
pub async fn run(
    fetcher: &impl Fetcher,
    store: &impl Store,
    sinks: &Sinks,
    options: &RunOptions,
) -> Result<RunSummary> {
    tracing::info!(
        bootstrap = options.bootstrap,
        index_url = %options.index_url,
        "Starting run"
    );

    let html = fetcher
        .fetch_index()
        .await
        .map_err(|e| WatchError::Fetch(e.into()))?;
    let mut snapshot = parse_index(&html, &options.index_url)?;

    let details = crawl_details(&snapshot, fetcher).await;
    attach_details(&mut snapshot, details)?;

    // Zero or one prior row per slug; more is corruption and aborts here.
    let mut prior: BTreeMap<String, ReviewRecord> = BTreeMap::new();
    for slug in snapshot.keys() {
        if let Some(record) = store.get(slug).await? {
            prior.insert(slug.clone(), record);
        }
    }

    validate(&snapshot, &prior, options.bootstrap)?;

    let events = if options.bootstrap {
        Vec::new()
    } else {
        plan_notifications(&snapshot, &prior)
    };

    for record in snapshot.values() {
        store.upsert(record).await?;
    }
    tracing::info!(reviews = snapshot.len(), "Snapshot persisted");

    let dispatch_failures = if options.send_notifications && !events.is_empty() {
        dispatch(&events, sinks).await
    } else {
        0
    };

    let current: BTreeSet<String> = snapshot.keys().cloned().collect();
    store.delete_all_except(&current).await?;

    if let Some(path) = &options.export_path {
        write_snapshot(path, &snapshot)?;
        tracing::info!(path = %path.display(), "Snapshot exported");
    }

    tracing::info!(
        reviews = snapshot.len(),
        events = events.len(),
        dispatch_failures,
        "Run complete"
    );

    Ok(RunSummary {
        reviews: snapshot.len(),
        events,
        dispatch_failures,
    })
}
