pub mod render;
pub mod webhook;

use async_trait::async_trait;
use thiserror::Error;

use crate::party::record::LocationRef;
use render::PartySummary;

pub use webhook::WebhookGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("webhook returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Outbound half of the presentation boundary. Every method is
/// best-effort: implementations log delivery failures and never let
/// them reach the lifecycle.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Creates or updates the live roster surface. Returns where it
    /// lives, or `None` when delivery failed.
    async fn publish_summary(
        &self,
        channel_id: &str,
        summary: &PartySummary,
        existing: Option<&LocationRef>,
    ) -> Option<LocationRef>;

    /// Best-effort deletion of the rendered summary.
    async fn remove_summary(&self, location: &LocationRef);

    /// One direct message. Returns the failure so `notify_users` can
    /// count deliveries; callers outside the fan-out treat it as
    /// best-effort too.
    async fn notify_user(&self, user_id: &str, message: &str) -> Result<(), GatewayError>;

    /// Broadcast to a party's home channel (departure reminders and
    /// completion records).
    async fn announce(&self, channel_id: &str, message: &str);

    /// Per-recipient fan-out: a failed delivery is logged and skipped,
    /// never aborting the rest. Returns how many messages went out.
    async fn notify_users(&self, user_ids: &[String], message: &str) -> usize {
        let mut delivered = 0;
        for user_id in user_ids {
            match self.notify_user(user_id, message).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(user = %user_id, error = %e, "direct message delivery failed");
                }
            }
        }
        delivered
    }
}
