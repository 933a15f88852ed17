//! Per-page detail extractor.
//!
//! Each review has its own page whose event container carries the latest
//! lifecycle milestone in a `desc` attribute. The container's class name
//! has drifted over time, so an ordered list of selector variants is tried
//! until one matches.

use std::collections::BTreeSet;

use scraper::{ElementRef, Html, Selector};

use crate::types::{is_eco, normalize_event, PageDetail};

/// Accepted event-container variants, in priority order.
const CONTAINER_SELECTORS: [&str; 3] = ["div.tab-1", "div.-tab-1", "div.tab-2"];

/// Sentence present in the container once the order has cleared scrutiny.
const ECO_MADE_TEXT: &str =
    "have now successfully completed a 40 day period of parliamentary scrutiny \
     and will come into force";

/// Extract detail from one review page.
///
/// Returns None when no recognizable event container is present; the
/// validator decides whether that is tolerable for this slug.
pub fn extract_detail(slug: &str, html: &str) -> Option<PageDetail> {
    let document = Html::parse_document(html);

    let container = CONTAINER_SELECTORS.iter().find_map(|s| {
        let selector = Selector::parse(s).unwrap();
        document.select(&selector).next()
    })?;

    let desc = container.value().attr("desc")?;
    let latest_event = normalize_event(desc).unwrap_or_default();

    let eco_made = is_eco(&latest_event) && container_mentions_made(&container);

    let detail = PageDetail {
        slug: slug.to_string(),
        latest_event,
        shapefile_link: single_zip_link(&document),
        eco_made,
        eco_order_link: if eco_made { order_link(&container) } else { None },
    };

    tracing::debug!(
        slug = %slug,
        eco_made = detail.eco_made,
        has_shapefile = detail.shapefile_link.is_some(),
        "Extracted page detail"
    );

    Some(detail)
}

fn container_mentions_made(container: &ElementRef) -> bool {
    let text = container.text().collect::<String>().to_lowercase();
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.contains(ECO_MADE_TEXT)
}

/// Any links to zip files in the page. The shapefiles are not consistently
/// named, so only an unambiguous single candidate is trusted.
fn single_zip_link(document: &Html) -> Option<String> {
    let link_sel = Selector::parse("a[href]").unwrap();
    let zips: BTreeSet<String> = document
        .select(&link_sel)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.to_lowercase().ends_with(".zip"))
        .map(|href| href.to_string())
        .collect();

    if zips.len() == 1 {
        zips.into_iter().next()
    } else {
        None
    }
}

/// First link inside the event container whose text mentions the order.
fn order_link(container: &ElementRef) -> Option<String> {
    let link_sel = Selector::parse("a[href]").unwrap();
    container
        .select(&link_sel)
        .find(|a| {
            a.text()
                .collect::<String>()
                .to_lowercase()
                .contains("order")
        })
        .and_then(|a| a.value().attr("href"))
        .map(|href| href.to_string())
}
