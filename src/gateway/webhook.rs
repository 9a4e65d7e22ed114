//! Webhook-backed chat delivery. Every call is best-effort: transport
//! failures and non-success statuses are logged and swallowed so they
//! never reach the lifecycle. Without a configured webhook URL the
//! gateway logs the payloads instead, which keeps local development
//! runnable.

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::gateway::render::PartySummary;
use crate::gateway::{ChatGateway, GatewayError};
use crate::party::record::LocationRef;

pub struct WebhookGateway {
    http: reqwest::Client,
    webhook_url: Option<String>,
}

impl WebhookGateway {
    pub fn new(webhook_url: Option<String>) -> Self {
        if webhook_url.is_none() {
            tracing::warn!("no chat webhook configured; outbound messages will only be logged");
        }
        Self {
            http: reqwest::Client::new(),
            webhook_url,
        }
    }

    async fn post(&self, body: serde_json::Value) -> Result<serde_json::Value, GatewayError> {
        let Some(url) = &self.webhook_url else {
            tracing::info!(payload = %body, "chat gateway (log only)");
            return Ok(json!({}));
        };
        let response = self.http.post(url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(GatewayError::Status(response.status()));
        }
        Ok(response.json().await.unwrap_or_else(|_| json!({})))
    }
}

#[async_trait]
impl ChatGateway for WebhookGateway {
    async fn publish_summary(
        &self,
        channel_id: &str,
        summary: &PartySummary,
        existing: Option<&LocationRef>,
    ) -> Option<LocationRef> {
        let body = json!({
            "kind": "summary",
            "channel_id": channel_id,
            "message_id": existing.map(|l| l.message_id.clone()),
            "summary": summary,
        });
        match self.post(body).await {
            Ok(reply) => {
                let message_id = reply
                    .get("message_id")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .or_else(|| existing.map(|l| l.message_id.clone()))
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                Some(LocationRef {
                    channel_id: channel_id.to_string(),
                    message_id,
                })
            }
            Err(e) => {
                tracing::warn!(party_id = %summary.party_id, error = %e, "summary publish failed");
                None
            }
        }
    }

    async fn remove_summary(&self, location: &LocationRef) {
        let body = json!({
            "kind": "delete",
            "channel_id": location.channel_id,
            "message_id": location.message_id,
        });
        if let Err(e) = self.post(body).await {
            tracing::warn!(
                channel = %location.channel_id,
                message = %location.message_id,
                error = %e,
                "summary removal failed"
            );
        }
    }

    async fn notify_user(&self, user_id: &str, message: &str) -> Result<(), GatewayError> {
        let body = json!({
            "kind": "dm",
            "user_id": user_id,
            "text": message,
        });
        self.post(body).await.map(|_| ())
    }

    async fn announce(&self, channel_id: &str, message: &str) {
        let body = json!({
            "kind": "announce",
            "channel_id": channel_id,
            "text": message,
        });
        if let Err(e) = self.post(body).await {
            tracing::warn!(channel = %channel_id, error = %e, "channel announcement failed");
        }
    }
}
