//! Merge per-page detail into the index snapshot.

use crate::error::{Result, WatchError};
use crate::types::{normalize_event, PageDetail, Snapshot};

/// Overwrite detail fields on the matching snapshot records.
///
/// Detail records never create new slugs: a detail for a slug absent from
/// the index signals either a race between the index and detail crawls or
/// a parsing bug, and aborts the run rather than being silently dropped.
pub fn attach_details(snapshot: &mut Snapshot, details: Vec<PageDetail>) -> Result<()> {
    for detail in details {
        let record = snapshot
            .get_mut(&detail.slug)
            .ok_or_else(|| WatchError::UnexpectedSlug {
                slug: detail.slug.clone(),
            })?;

        record.latest_event = normalize_event(&detail.latest_event);
        record.shapefile_link = detail.shapefile_link;
        record.eco_made = detail.eco_made;
        record.eco_order_link = detail.eco_order_link;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ReviewRecord, ReviewStatus};

    fn snapshot_with(slug: &str) -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert(
            slug.to_string(),
            ReviewRecord::new(
                slug.to_string(),
                "Babergh".to_string(),
                format!("http://example.org/reviews/{}", slug),
                ReviewStatus::Current,
            ),
        );
        snapshot
    }

    fn detail(slug: &str, event: &str) -> PageDetail {
        PageDetail {
            slug: slug.to_string(),
            latest_event: event.to_string(),
            shapefile_link: Some("/files/babergh.zip".to_string()),
            eco_made: true,
            eco_order_link: Some("/orders/babergh.pdf".to_string()),
        }
    }

    #[test]
    fn overwrites_detail_fields_in_place() {
        let mut snapshot = snapshot_with("babergh");
        attach_details(&mut snapshot, vec![detail("babergh", "Consultation")]).unwrap();

        let record = &snapshot["babergh"];
        assert_eq!(record.latest_event, Some("Consultation".to_string()));
        assert_eq!(record.shapefile_link, Some("/files/babergh.zip".to_string()));
        assert!(record.eco_made);
        assert_eq!(record.eco_order_link, Some("/orders/babergh.pdf".to_string()));
        // Index-derived fields untouched.
        assert_eq!(record.name, "Babergh");
        assert_eq!(record.status, ReviewStatus::Current);
    }

    #[test]
    fn normalizes_event_text_on_attach() {
        let mut snapshot = snapshot_with("babergh");
        attach_details(
            &mut snapshot,
            vec![detail("babergh", "The Babergh\u{a0}(Electoral Changes)  Order 2017")],
        )
        .unwrap();
        assert_eq!(
            snapshot["babergh"].latest_event,
            Some("The Babergh (Electoral Changes) Order 2017".to_string())
        );

        attach_details(&mut snapshot, vec![detail("babergh", " \u{a0} ")]).unwrap();
        assert_eq!(snapshot["babergh"].latest_event, None);
    }

    #[test]
    fn unknown_slug_aborts() {
        let mut snapshot = snapshot_with("babergh");
        let err = attach_details(&mut snapshot, vec![detail("allerdale", "foo")]).unwrap_err();
        assert!(matches!(
            err,
            WatchError::UnexpectedSlug { slug } if slug == "allerdale"
        ));
    }

    #[test]
    fn details_never_create_records() {
        let mut snapshot = snapshot_with("babergh");
        let _ = attach_details(&mut snapshot, vec![detail("allerdale", "foo")]);
        assert_eq!(snapshot.len(), 1);
        assert!(!snapshot.contains_key("allerdale"));
    }
}
