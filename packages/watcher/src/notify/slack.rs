//! Slack incoming-webhook client.

use anyhow::{Context, Result};
use serde_json::json;

#[derive(Debug, Clone)]
pub struct SlackClient {
    client: reqwest::Client,
    webhook_url: String,
}

impl SlackClient {
    pub fn new(webhook_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url,
        }
    }

    /// Post one single-line message to the webhook channel.
    pub async fn post_message(&self, text: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&json!({ "text": text }))
            .send()
            .await
            .context("Slack webhook request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Slack returned {}: {}", status, body);
        }

        Ok(())
    }
}
