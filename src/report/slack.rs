// src/report/slack.rs
// =============================================================================
// Posts one Slack message per broken link to an incoming webhook.
//
// A webhook that is down must never stop the crawl, so delivery errors are
// only logged.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::warn;

use super::Reporter;
use crate::crawl::BrokenLink;

pub struct SlackReporter {
    client: Client,
    webhook: String,
}

impl SlackReporter {
    pub fn new(webhook: impl Into<String>) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            webhook: webhook.into(),
        })
    }
}

#[async_trait]
impl Reporter for SlackReporter {
    async fn on_broken_link(&self, link: &BrokenLink) {
        let result = self
            .client
            .post(&self.webhook)
            .json(&payload(link))
            .send()
            .await
            .and_then(|response| response.error_for_status());

        if let Err(e) = result {
            warn!("Slack notification for {} failed: {}", link.request_url, e);
        }
    }
}

// Builds a Slack attachment with one field per piece of the broken link
fn payload(link: &BrokenLink) -> Value {
    let status_code = link.status_code.unwrap_or(0);
    let fallback = format!(
        "Broken url: {}\nAppears on: {}\nStatus msg: {} ({})",
        link.request_url, link.reference_url, link.status_message, status_code
    );

    json!({
        "attachments": [
            {
                "fallback": fallback,
                "fields": [
                    { "title": "Broken url", "value": link.request_url },
                    { "title": "Appears on", "value": link.reference_url },
                    { "title": "Status code", "value": status_code, "short": true },
                    { "title": "Status message", "value": link.status_message, "short": true }
                ],
                "color": "danger"
            }
        ]
    })
}
