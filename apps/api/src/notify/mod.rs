//! Outbound notifications for connect requests.
//!
//! `AppState` holds an `Arc<dyn Notifier>`; callers never know which
//! backend is behind it. The Slack backend posts to an incoming-webhook
//! URL and degrades to a logged no-op when none is configured.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

/// Delivery seam for one-line event notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<()>;
}

/// Posts messages to a Slack incoming webhook.
pub struct SlackNotifier {
    client: Client,
    webhook_url: Option<String>,
}

impl SlackNotifier {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            webhook_url,
        }
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        let Some(url) = self.webhook_url.as_deref() else {
            debug!("No Slack webhook configured, dropping notification");
            return Ok(());
        };

        let response = self
            .client
            .post(url)
            .json(&json!({ "text": message }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Slack webhook returned status {status}");
        }
        Ok(())
    }
}
