//! Notification planning.
//!
//! Compares the validated snapshot against the previously persisted records
//! and produces the ordered list of events to dispatch. Planning never
//! mutates state and runs after validation, before persistence, so the
//! events reflect exactly what is about to be saved.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{is_eco, ReviewRecord, Snapshot};

/// One planned notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// A slug with no previously persisted row.
    NewReview { record: ReviewRecord },

    /// The enabling order transitioned into the made state. Also fans out
    /// to the issue tracker, unlike the chat-only events.
    ReviewCompleted { record: ReviewRecord },

    /// The event text changed and no completion was emitted for this slug
    /// in the same run.
    EventChanged {
        record: ReviewRecord,
        previous_event: Option<String>,
    },
}

impl NotificationEvent {
    pub fn slug(&self) -> &str {
        match self {
            NotificationEvent::NewReview { record }
            | NotificationEvent::ReviewCompleted { record }
            | NotificationEvent::EventChanged { record, .. } => &record.slug,
        }
    }

    /// Completions additionally open an issue in the tracker sink.
    pub fn wants_issue(&self) -> bool {
        matches!(self, NotificationEvent::ReviewCompleted { .. })
    }
}

/// Plan notifications for the run, in slug order.
pub fn plan_notifications(
    snapshot: &Snapshot,
    prior: &BTreeMap<String, ReviewRecord>,
) -> Vec<NotificationEvent> {
    let mut events = Vec::new();

    for (slug, record) in snapshot {
        let previous = match prior.get(slug) {
            None => {
                // Exactly one event for a brand-new review, whatever its
                // current text says.
                events.push(NotificationEvent::NewReview {
                    record: record.clone(),
                });
                continue;
            }
            Some(previous) => previous,
        };

        let order_made = !previous.eco_made
            && record.eco_made
            && record
                .latest_event
                .as_deref()
                .map(is_eco)
                .unwrap_or(false);

        if order_made {
            events.push(NotificationEvent::ReviewCompleted {
                record: record.clone(),
            });
        }

        // The completion event supersedes the generic change event for the
        // same slug, to avoid duplicate noise.
        if !order_made && previous.latest_event != record.latest_event {
            events.push(NotificationEvent::EventChanged {
                record: record.clone(),
                previous_event: previous.latest_event.clone(),
            });
        }
    }

    tracing::debug!(events = events.len(), "Planned notifications");
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReviewStatus;

    fn record(slug: &str, status: ReviewStatus, event: Option<&str>, eco_made: bool) -> ReviewRecord {
        ReviewRecord {
            slug: slug.to_string(),
            name: slug.to_string(),
            url: format!("http://example.org/reviews/{}", slug),
            status,
            latest_event: event.map(|e| e.to_string()),
            shapefile_link: None,
            eco_made,
            eco_order_link: None,
        }
    }

    fn as_map(records: Vec<ReviewRecord>) -> BTreeMap<String, ReviewRecord> {
        records.into_iter().map(|r| (r.slug.clone(), r)).collect()
    }

    #[test]
    fn unchanged_snapshot_plans_nothing() {
        let babergh = record("babergh", ReviewStatus::Current, Some("Consultation"), false);
        let snapshot = as_map(vec![babergh.clone()]);
        let prior = as_map(vec![babergh]);
        assert!(plan_notifications(&snapshot, &prior).is_empty());
    }

    #[test]
    fn new_review_emits_exactly_one_event() {
        let snapshot = as_map(vec![record(
            "babergh",
            ReviewStatus::Current,
            Some("Consultation"),
            false,
        )]);
        let events = plan_notifications(&snapshot, &BTreeMap::new());
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], NotificationEvent::NewReview { .. }));
        assert!(!events[0].wants_issue());
    }

    #[test]
    fn event_text_change_is_reported() {
        let prior = as_map(vec![record("babergh", ReviewStatus::Current, Some("foo"), false)]);
        let snapshot = as_map(vec![record("babergh", ReviewStatus::Current, Some("bar"), false)]);

        let events = plan_notifications(&snapshot, &prior);
        assert_eq!(events.len(), 1);
        match &events[0] {
            NotificationEvent::EventChanged { record, previous_event } => {
                assert_eq!(record.latest_event.as_deref(), Some("bar"));
                assert_eq!(previous_event.as_deref(), Some("foo"));
            }
            other => panic!("expected EventChanged, got {:?}", other),
        }
    }

    #[test]
    fn order_made_transition_emits_completion() {
        let prior = as_map(vec![record(
            "babergh",
            ReviewStatus::Current,
            Some("Consultation"),
            false,
        )]);
        let snapshot = as_map(vec![record(
            "babergh",
            ReviewStatus::Completed,
            Some("The Babergh (Electoral Changes) Order 2017"),
            true,
        )]);

        let events = plan_notifications(&snapshot, &prior);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], NotificationEvent::ReviewCompleted { .. }));
        assert!(events[0].wants_issue());
    }

    #[test]
    fn completion_supersedes_event_change() {
        // Both the made transition and a text change apply; only the
        // completion is emitted.
        let prior = as_map(vec![record(
            "babergh",
            ReviewStatus::Current,
            Some("Consultation"),
            false,
        )]);
        let snapshot = as_map(vec![record(
            "babergh",
            ReviewStatus::Completed,
            Some("The Babergh (Electoral Changes) Order 2017"),
            true,
        )]);

        let events = plan_notifications(&snapshot, &prior);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].slug(), "babergh");
        assert!(events[0].wants_issue());
    }

    #[test]
    fn made_transition_without_eco_text_is_a_plain_change() {
        let prior = as_map(vec![record(
            "babergh",
            ReviewStatus::Current,
            Some("Consultation"),
            false,
        )]);
        let snapshot = as_map(vec![record(
            "babergh",
            ReviewStatus::Current,
            Some("Final recommendations published"),
            true,
        )]);

        let events = plan_notifications(&snapshot, &prior);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], NotificationEvent::EventChanged { .. }));
    }

    #[test]
    fn events_come_out_in_slug_order() {
        let snapshot = as_map(vec![
            record("babergh", ReviewStatus::Current, Some("foo"), false),
            record("allerdale", ReviewStatus::Current, Some("bar"), false),
        ]);
        let events = plan_notifications(&snapshot, &BTreeMap::new());
        let slugs: Vec<&str> = events.iter().map(|e| e.slug()).collect();
        assert_eq!(slugs, vec!["allerdale", "babergh"]);
    }
}
