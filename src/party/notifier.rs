//! Periodic departure-reminder scan.
//!
//! Once per tick the notifier walks every live record and latches the
//! ones whose departure falls inside the reminder window, then sends
//! the reminders after the registry lock is dropped. The window width
//! (1 minute) must stay at least as wide as the tick period or records
//! can slip through without ever being caught; the two constants are
//! configured together for that reason.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Local, NaiveDateTime};
use tokio::sync::watch;
use uuid::Uuid;

use crate::config::Config;
use crate::gateway::ChatGateway;
use crate::gateway::render;
use crate::party::record::PartyStatus;
use crate::party::registry::{PartyRegistry, SharedRegistry};

/// Closed interval before departure in which the one-shot reminder
/// fires. Reference values: 9 to 10 minutes.
#[derive(Debug, Clone, Copy)]
pub struct ReminderWindow {
    pub low: ChronoDuration,
    pub high: ChronoDuration,
}

impl Default for ReminderWindow {
    fn default() -> Self {
        Self {
            low: ChronoDuration::minutes(9),
            high: ChronoDuration::minutes(10),
        }
    }
}

/// Snapshot of a record whose reminder latch was just set.
#[derive(Debug, Clone)]
pub struct DueReminder {
    pub party_id: Uuid,
    pub purpose: String,
    pub departure_time: NaiveDateTime,
    pub members: Vec<String>,
    pub channel_id: Option<String>,
}

/// Latches and returns every record due for its departure reminder.
/// The latch is monotonic: it is set here, before delivery is even
/// attempted, so each record gets exactly one attempt ever.
pub fn collect_due(
    registry: &mut PartyRegistry,
    now: NaiveDateTime,
    window: &ReminderWindow,
) -> Vec<DueReminder> {
    let mut due = Vec::new();
    for record in registry.records_mut() {
        if record.notification_sent || record.status == PartyStatus::Completed {
            continue;
        }
        let delta = record.departure_time - now;
        if delta >= window.low && delta <= window.high {
            record.notification_sent = true;
            due.push(DueReminder {
                party_id: record.id,
                purpose: record.purpose.clone(),
                departure_time: record.departure_time,
                members: record.members.clone(),
                channel_id: record.location.as_ref().map(|l| l.channel_id.clone()),
            });
        }
    }
    due
}

/// Background task that owns the scan loop. Shuts down when the watch
/// channel flips to `true` or its sender is dropped.
pub struct DepartureNotifier {
    registry: SharedRegistry,
    gateway: Arc<dyn ChatGateway>,
    tick: Duration,
    window: ReminderWindow,
}

impl DepartureNotifier {
    pub fn new(registry: SharedRegistry, gateway: Arc<dyn ChatGateway>, config: &Config) -> Self {
        Self {
            registry,
            gateway,
            tick: config.notify_tick(),
            window: config.reminder_window(),
        }
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        tracing::info!(tick_secs = self.tick.as_secs(), "departure notifier started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep(Local::now().naive_local()).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!("departure notifier stopped");
    }

    async fn sweep(&self, now: NaiveDateTime) {
        let due = {
            let mut registry = self.registry.lock().await;
            collect_due(&mut registry, now, &self.window)
        };
        for reminder in due {
            let text = render::render_reminder(&reminder);
            match &reminder.channel_id {
                Some(channel_id) => self.gateway.announce(channel_id, &text).await,
                // The summary never got published, so there is no home
                // channel to announce on. The latch stays set.
                None => tracing::warn!(
                    party_id = %reminder.party_id,
                    "no summary location for due reminder; skipping"
                ),
            }
        }
    }
}
