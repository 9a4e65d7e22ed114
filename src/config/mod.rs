use std::env;
use std::time::Duration;

use crate::party::notifier::ReminderWindow;
use crate::party::record::PartyLimits;

/// Runtime configuration, loaded from the environment with working
/// defaults so a bare environment still boots.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    /// Outbound chat webhook. When unset the gateway degrades to
    /// structured log lines.
    pub chat_webhook_url: Option<String>,
    pub catalog_api_base_url: String,
    pub catalog_api_key: Option<String>,
    pub min_party_size: usize,
    pub max_party_size: usize,
    pub notify_tick_secs: u64,
    /// Minutes before departure at which the reminder fires. The scan
    /// window is [lead - 1, lead] minutes; keep the tick period at or
    /// below one minute or due records can be missed entirely.
    pub reminder_lead_mins: i64,
}

fn var_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: var_or("SERVER_PORT", 3000),
            api_base_uri: env::var("API_BASE_URI").unwrap_or_else(|_| "/api".into()),
            chat_webhook_url: env::var("CHAT_WEBHOOK_URL").ok(),
            catalog_api_base_url: env::var("CATALOG_API_BASE_URL")
                .unwrap_or_else(|_| "https://open.api.nexon.com".into()),
            catalog_api_key: env::var("CATALOG_API_KEY").ok(),
            min_party_size: var_or("MIN_PARTY_SIZE", 2),
            max_party_size: var_or("MAX_PARTY_SIZE", 16),
            notify_tick_secs: var_or("NOTIFY_TICK_SECS", 60),
            reminder_lead_mins: var_or("REMINDER_LEAD_MINS", 10),
        }
    }

    pub fn notify_tick(&self) -> Duration {
        Duration::from_secs(self.notify_tick_secs)
    }

    pub fn reminder_window(&self) -> ReminderWindow {
        ReminderWindow {
            low: chrono::Duration::minutes(self.reminder_lead_mins - 1),
            high: chrono::Duration::minutes(self.reminder_lead_mins),
        }
    }

    pub fn party_limits(&self) -> PartyLimits {
        PartyLimits {
            min_size: self.min_party_size,
            max_size: self.max_party_size,
        }
    }
}
