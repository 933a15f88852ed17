//! HTTP fetching and the bounded detail crawl.
//!
//! The crawl is a collaborator to the reconciliation core: it fully drains
//! into a static list of `PageDetail`s before any merging starts, so the
//! core never observes a partially-fetched crawl.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::detail::extract_detail;
use crate::types::{PageDetail, Snapshot};

/// Maximum concurrent page requests.
const MAX_CONCURRENT_REQUESTS: usize = 5;

/// Stagger between request starts, to keep the crawl polite.
const REQUEST_DELAY: Duration = Duration::from_millis(250);

/// Trait for page fetching (to allow mocking).
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the review index page.
    async fn fetch_index(&self) -> Result<String>;

    /// Fetch one review's own page.
    async fn fetch_page(&self, url: &str) -> Result<String>;
}

/// Live fetcher over reqwest.
pub struct HttpFetcher {
    client: reqwest::Client,
    index_url: String,
}

impl HttpFetcher {
    pub fn new(index_url: String) -> Result<Self> {
        // Browser-like User-Agent; the site rejects obvious bots.
        let user_agent = "Mozilla/5.0 (Windows NT 10.0; WOW64; rv:56.0) \
                          Gecko/20100101 Firefox/56.0";

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                .parse()
                .unwrap(),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            "en-GB,en;q=0.5".parse().unwrap(),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, index_url })
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {} for {}", status, url);
        }

        response.text().await.context("Failed to read response body")
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_index(&self) -> Result<String> {
        self.fetch_html(&self.index_url).await
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.fetch_html(url).await
    }
}

/// Crawl every review page in the snapshot and extract its detail.
///
/// A failed fetch or an unrecognizable page yields no detail for that slug;
/// the validator catches the resulting missing event for known reviews.
pub async fn crawl_details(snapshot: &Snapshot, fetcher: &dyn Fetcher) -> Vec<PageDetail> {
    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_REQUESTS));

    let fetches = snapshot.values().enumerate().map(|(i, record)| {
        let semaphore = Arc::clone(&semaphore);
        async move {
            tokio::time::sleep(REQUEST_DELAY * i as u32).await;
            // Closed only if the semaphore is dropped, which it is not.
            let _permit = semaphore.acquire().await.expect("semaphore closed");

            match fetcher.fetch_page(&record.url).await {
                Ok(html) => extract_detail(&record.slug, &html),
                Err(err) => {
                    tracing::warn!(
                        slug = %record.slug,
                        url = %record.url,
                        error = %err,
                        "Failed to fetch review page"
                    );
                    None
                }
            }
        }
    });

    let details: Vec<PageDetail> = futures::future::join_all(fetches)
        .await
        .into_iter()
        .flatten()
        .collect();

    tracing::info!(
        pages = snapshot.len(),
        details = details.len(),
        "Detail crawl complete"
    );

    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ReviewRecord, ReviewStatus};
    use std::collections::HashMap;

    struct MockFetcher {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl Fetcher for MockFetcher {
        async fn fetch_index(&self) -> Result<String> {
            anyhow::bail!("not used")
        }

        async fn fetch_page(&self, url: &str) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("HTTP 404 for {}", url))
        }
    }

    fn record(slug: &str) -> ReviewRecord {
        ReviewRecord::new(
            slug.to_string(),
            slug.to_string(),
            format!("http://example.org/reviews/{}", slug),
            ReviewStatus::Current,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetches_yield_no_detail() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("babergh".to_string(), record("babergh"));
        snapshot.insert("ashford".to_string(), record("ashford"));

        let fetcher = MockFetcher {
            pages: HashMap::from([(
                "http://example.org/reviews/babergh".to_string(),
                "<div class=\"tab-1\" desc=\"Consultation\"></div>".to_string(),
            )]),
        };

        let details = crawl_details(&snapshot, &fetcher).await;
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].slug, "babergh");
        assert_eq!(details[0].latest_event, "Consultation");
    }
}
