//! Lifecycle validation.
//!
//! Runs strictly between reconciliation and persistence: a single violation
//! anywhere in the snapshot fails the whole run and leaves the store
//! untouched. Pure function over the merged snapshot and the previously
//! persisted records, which makes it the most directly unit-testable part
//! of the pipeline.

use std::collections::BTreeMap;

use crate::error::{Invariant, Result, WatchError};
use crate::types::{ReviewRecord, ReviewStatus, Snapshot};

/// Check every record against the lifecycle invariants, in slug order, in
/// a fixed invariant order per slug, aborting on the first violation.
///
/// In bootstrap mode (seeding an empty store) the invariants that compare
/// against a prior row are skipped; only the shape check on `latest_event`
/// remains.
pub fn validate(
    snapshot: &Snapshot,
    prior: &BTreeMap<String, ReviewRecord>,
    bootstrap: bool,
) -> Result<()> {
    for (slug, record) in snapshot {
        let previous = prior.get(slug);

        // Invariant 4: a known review whose detail failed to scrape must
        // not silently lose its event. A genuinely new review with no
        // event yet is tolerated, as is one whose persisted event was
        // itself empty.
        if !record.has_event() {
            let tolerated = !bootstrap
                && previous.map(|p| !p.has_event()).unwrap_or(true);
            if !tolerated {
                return Err(violation(Invariant::EventPopulated, record, previous));
            }
        }

        // Invariant 1: completed implies a made order.
        if record.status == ReviewStatus::Completed && !record.eco_made {
            return Err(violation(Invariant::CompletedImpliesMade, record, previous));
        }

        if bootstrap {
            continue;
        }

        match previous {
            None => {
                // Invariant 5: every review first appears as current.
                if record.status == ReviewStatus::Completed {
                    return Err(violation(Invariant::NewMustBeCurrent, record, previous));
                }
            }
            Some(prev) => {
                // Invariant 2: status never moves backwards.
                if prev.status == ReviewStatus::Completed
                    && record.status == ReviewStatus::Current
                {
                    return Err(violation(Invariant::StatusMonotonic, record, previous));
                }
                // Invariant 3: a made order stays made.
                if prev.eco_made && !record.eco_made {
                    return Err(violation(Invariant::EcoMonotonic, record, previous));
                }
            }
        }
    }

    tracing::debug!(reviews = snapshot.len(), bootstrap, "Snapshot validated");
    Ok(())
}

fn violation(
    invariant: Invariant,
    record: &ReviewRecord,
    previous: Option<&ReviewRecord>,
) -> WatchError {
    tracing::error!(
        slug = %record.slug,
        invariant = invariant.id(),
        "Validation failed: {}",
        invariant.describe()
    );
    WatchError::Validation {
        invariant,
        slug: record.slug.clone(),
        prior: previous.map(|p| Box::new(p.clone())),
        current: Box::new(record.clone()),
    }
}
