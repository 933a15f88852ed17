//! Index page parser.
//!
//! Turns the review-index page into the authoritative set of known reviews
//! with coarse status. The page is two headed sections ("Current Reviews",
//! "Recently Completed"), each followed by a list of review links. Any
//! deviation from that heading set means the site layout changed and the
//! whole run must abort before anything is trusted or persisted.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{Result, WatchError};
use crate::types::{slug_from_url, ReviewRecord, ReviewStatus, Snapshot};

/// Parse the index page into a partial snapshot (status, name, url set;
/// detail fields default).
pub fn parse_index(html: &str, base_url: &str) -> Result<Snapshot> {
    let document = Html::parse_document(html);
    let heading_sel = Selector::parse("h2").unwrap();
    let link_sel = Selector::parse("a[href]").unwrap();

    let headings: Vec<ElementRef> = document.select(&heading_sel).collect();
    let found: Vec<String> = headings
        .iter()
        .map(|h| h.text().collect::<String>().trim().to_string())
        .collect();

    let expected = [
        ReviewStatus::Current.label(),
        ReviewStatus::Completed.label(),
    ];
    if found != expected {
        return Err(WatchError::Structure { found });
    }

    let base = Url::parse(base_url).map_err(|source| WatchError::BadIndexUrl {
        url: base_url.to_string(),
        source,
    })?;

    let mut snapshot = Snapshot::new();
    for heading in &headings {
        let text = heading.text().collect::<String>();
        // Guarded by the exact-set check above.
        let status = match ReviewStatus::from_label(&text) {
            Some(status) => status,
            None => continue,
        };

        for anchor in section_links(heading, &link_sel) {
            let href = match anchor.value().attr("href") {
                Some(href) => href,
                None => continue,
            };
            let url = match base.join(href) {
                Ok(url) => url.to_string(),
                Err(_) => {
                    tracing::warn!(href = %href, "Skipping unparseable review link");
                    continue;
                }
            };
            let slug = match slug_from_url(&url) {
                Some(slug) => slug,
                None => {
                    tracing::warn!(url = %url, "Review link has no usable slug");
                    continue;
                }
            };
            let name = anchor.text().collect::<String>().trim().to_string();

            tracing::debug!(slug = %slug, status = ?status, "Indexed review");
            snapshot.insert(slug.clone(), ReviewRecord::new(slug, name, url, status));
        }
    }

    tracing::info!(reviews = snapshot.len(), "Parsed index page");
    Ok(snapshot)
}

/// Anchors in the elements between this heading and the next one.
fn section_links<'a>(heading: &ElementRef<'a>, link_sel: &Selector) -> Vec<ElementRef<'a>> {
    let mut links = Vec::new();
    for sibling in heading.next_siblings() {
        let element = match ElementRef::wrap(sibling) {
            Some(element) => element,
            None => continue,
        };
        if element.value().name() == "h2" {
            break;
        }
        links.extend(element.select(link_sel));
    }
    links
}
