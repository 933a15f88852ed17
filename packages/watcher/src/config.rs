use anyhow::Result;
use dotenvy::dotenv;
use std::env;

use crate::notify::github::GithubClient;
use crate::notify::slack::SlackClient;
use crate::notify::Sinks;

const DEFAULT_INDEX_URL: &str = "http://www.lgbce.org.uk/current-reviews";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub index_url: String,
    pub slack_webhook_url: Option<String>,
    pub github_token: Option<String>,
    pub github_repo: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let github_token = env::var("GITHUB_TOKEN").ok();
        let github_repo = env::var("GITHUB_REPO").ok();
        if github_token.is_some() != github_repo.is_some() {
            anyhow::bail!("GITHUB_TOKEN and GITHUB_REPO must be set together");
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:lgbce.db".to_string()),
            index_url: env::var("LGBCE_INDEX_URL")
                .unwrap_or_else(|_| DEFAULT_INDEX_URL.to_string()),
            slack_webhook_url: env::var("SLACK_WEBHOOK_URL").ok(),
            github_token,
            github_repo,
        })
    }

    /// Build the notification sinks this config enables.
    pub fn sinks(&self) -> Sinks {
        Sinks {
            slack: self
                .slack_webhook_url
                .clone()
                .map(SlackClient::new),
            github: match (&self.github_token, &self.github_repo) {
                (Some(token), Some(repo)) => {
                    Some(GithubClient::new(token.clone(), repo.clone()))
                }
                _ => None,
            },
        }
    }
}
