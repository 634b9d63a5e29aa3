//! Discord webhook notifications.

use crate::types::Notification;
use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::debug;

/// Webhook-based Discord notifier.
#[derive(Debug, Clone)]
pub struct DiscordNotifier {
    webhook_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct WebhookPayload {
    content: String,
}

impl DiscordNotifier {
    pub fn new(webhook_url: &str) -> Self {
        Self {
            webhook_url: webhook_url.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.webhook_url.is_empty()
    }

    /// Relay a notification to the webhook channel.
    pub async fn notify(&self, notification: &Notification) -> Result<()> {
        if !self.is_configured() {
            bail!("Discord webhook is not configured");
        }

        let content = format!(
            "[{}] #{}: {}",
            notification.priority.to_uppercase(),
            notification.channel,
            notification.message
        );

        let resp = self
            .http
            .post(&self.webhook_url)
            .json(&WebhookPayload { content })
            .send()
            .await
            .context("Failed to send Discord notification")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Discord notification failed ({}): {}", status, body);
        }

        debug!("Discord notification sent to #{}", notification.channel);
        Ok(())
    }
}
