//! GitHub issues client.
//!
//! Completed reviews are fanned out to an issue tracker so someone picks
//! up the follow-on data work; this is a thin wrapper over the REST
//! issues endpoint.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct CreatedIssue {
    pub number: u64,
    pub html_url: String,
}

#[derive(Debug, Clone)]
pub struct GithubClient {
    client: reqwest::Client,
    token: String,
    /// "owner/repo" target for new issues.
    repo: String,
}

impl GithubClient {
    pub fn new(token: String, repo: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            repo,
        }
    }

    pub async fn create_issue(&self, title: &str, body: &str) -> Result<CreatedIssue> {
        let url = format!("https://api.github.com/repos/{}/issues", self.repo);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::USER_AGENT, "boundary-watch")
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .json(&json!({ "title": title, "body": body }))
            .send()
            .await
            .context("GitHub issue request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("GitHub returned {}: {}", status, body);
        }

        response
            .json::<CreatedIssue>()
            .await
            .context("Failed to parse GitHub issue response")
    }
}
