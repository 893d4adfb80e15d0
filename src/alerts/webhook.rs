//! Webhook-backed notifier

use super::AutomationEvent;
use crate::constants::webhook;
use crate::services::Notifier;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    server_id: &'a str,
    #[serde(flatten)]
    event: &'a AutomationEvent,
}

/// Posts automation events to a configured webhook URL. An empty URL
/// disables delivery; all failures are logged and swallowed.
pub struct WebhookNotifier {
    webhook_url: String,
    client: Client,
}

impl WebhookNotifier {
    pub fn new(webhook_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(webhook::TIMEOUT_SECONDS))
            .build()
            .expect("Failed to create HTTP client for WebhookNotifier");

        Self {
            webhook_url,
            client,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.webhook_url.is_empty()
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, server_id: &str, event: AutomationEvent) {
        if self.webhook_url.is_empty() {
            debug!("No webhook URL configured, skipping notification");
            return;
        }

        let payload = WebhookPayload {
            server_id,
            event: &event,
        };

        match timeout(
            Duration::from_secs(webhook::TIMEOUT_SECONDS),
            self.client.post(&self.webhook_url).json(&payload).send(),
        )
        .await
        {
            Ok(Ok(response)) => {
                if response.status().is_success() {
                    info!("Notification sent for {}: {:?}", server_id, event.kind);
                } else {
                    warn!(
                        "Notification webhook returned status {} for {}",
                        response.status(),
                        server_id
                    );
                }
            }
            Ok(Err(e)) => {
                warn!("Failed to send notification for {}: {}", server_id, e);
            }
            Err(_) => {
                warn!("Notification webhook timeout for {}", server_id);
            }
        }
    }
}

impl Clone for WebhookNotifier {
    fn clone(&self) -> Self {
        Self {
            webhook_url: self.webhook_url.clone(),
            client: self.client.clone(),
        }
    }
}
