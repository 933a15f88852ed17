//! Notification planning and dispatch.
//!
//! Dispatch runs strictly after persistence. A failed send is logged and
//! swallowed: by then the data is already safely saved, and a flaky sink
//! must not make the run look like it lost data.

pub mod github;
pub mod plan;
pub mod slack;

pub use plan::{plan_notifications, NotificationEvent};

use github::GithubClient;
use slack::SlackClient;

/// Configured notification sinks; both optional.
#[derive(Debug, Clone, Default)]
pub struct Sinks {
    pub slack: Option<SlackClient>,
    pub github: Option<GithubClient>,
}

impl Sinks {
    pub fn is_empty(&self) -> bool {
        self.slack.is_none() && self.github.is_none()
    }
}

/// Single-line chat rendering of an event.
pub fn chat_line(event: &NotificationEvent) -> String {
    match event {
        NotificationEvent::NewReview { record } => {
            format!("New boundary review found: {} ({})", record.name, record.url)
        }
        NotificationEvent::ReviewCompleted { record } => format!(
            "Completed boundary review: {}: {} ({})",
            record.name,
            record.latest_event.as_deref().unwrap_or(""),
            record.url
        ),
        NotificationEvent::EventChanged { record, .. } => format!(
            "{} boundary review status updated to '{}' ({})",
            record.name,
            record.latest_event.as_deref().unwrap_or(""),
            record.url
        ),
    }
}

/// Issue-tracker rendering; only completions open issues.
pub fn issue_content(event: &NotificationEvent) -> Option<(String, String)> {
    let record = match event {
        NotificationEvent::ReviewCompleted { record } => record,
        _ => return None,
    };

    let title = format!("Completed boundary review: {}", record.name);
    let mut body = format!(
        "Completed boundary review: {}\n\n{}\n\nReview page: {}\n",
        record.name,
        record.latest_event.as_deref().unwrap_or(""),
        record.url
    );
    if let Some(link) = &record.eco_order_link {
        body.push_str(&format!("Order: {}\n", link));
    }
    if let Some(link) = &record.shapefile_link {
        body.push_str(&format!("Boundary data: {}\n", link));
    }
    Some((title, body))
}

/// Send every planned event to the configured sinks.
///
/// Returns the number of failed sends; failures never propagate.
pub async fn dispatch(events: &[NotificationEvent], sinks: &Sinks) -> usize {
    let mut failures = 0;

    for event in events {
        if let Some(slack) = &sinks.slack {
            let line = chat_line(event);
            if let Err(err) = slack.post_message(&line).await {
                tracing::warn!(slug = %event.slug(), error = %err, "Slack send failed");
                failures += 1;
            }
        }

        if let Some(github) = &sinks.github {
            if let Some((title, body)) = issue_content(event) {
                match github.create_issue(&title, &body).await {
                    Ok(issue) => {
                        tracing::info!(
                            slug = %event.slug(),
                            issue = issue.number,
                            url = %issue.html_url,
                            "Opened completion issue"
                        );
                    }
                    Err(err) => {
                        tracing::warn!(slug = %event.slug(), error = %err, "GitHub send failed");
                        failures += 1;
                    }
                }
            }
        }
    }

    if failures > 0 {
        tracing::warn!(failures, "Some notifications failed to send");
    }
    failures
}
