//! Pure rendering of registry snapshots into displayable payloads.
//! Nothing here touches the registry or performs I/O.

use chrono::Duration;
use serde::Serialize;
use uuid::Uuid;

use crate::party::lifecycle::{CancelReport, CompletionReport};
use crate::party::notifier::DueReminder;
use crate::party::record::{PartyRecord, PartyStatus};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Organizer,
    Member,
}

#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
    pub position: usize,
    pub user_id: String,
    pub role: MemberRole,
}

/// The live roster surface, re-rendered from the current record after
/// every lifecycle operation.
#[derive(Debug, Clone, Serialize)]
pub struct PartySummary {
    pub party_id: Uuid,
    pub title: String,
    pub status: PartyStatus,
    pub purpose: String,
    pub organizer_id: String,
    pub departure_time: String,
    pub member_count: usize,
    pub capacity: usize,
    pub requirements: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub roster: Vec<RosterEntry>,
}

/// Durable completion record posted to the home channel; the only
/// artifact that outlives the party.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionSummary {
    pub party_id: Uuid,
    pub purpose: String,
    pub organizer_id: String,
    pub departure_time: String,
    pub completed_at: String,
    pub elapsed: String,
    pub requirements: Vec<String>,
    pub roster: Vec<RosterEntry>,
}

fn roster(record: &PartyRecord) -> Vec<RosterEntry> {
    record
        .members
        .iter()
        .enumerate()
        .map(|(i, user_id)| RosterEntry {
            position: i + 1,
            user_id: user_id.clone(),
            role: if record.is_organizer(user_id) {
                MemberRole::Organizer
            } else {
                MemberRole::Member
            },
        })
        .collect()
}

pub fn render_summary(record: &PartyRecord) -> PartySummary {
    let title = match record.status {
        PartyStatus::Open => "Party recruiting",
        PartyStatus::Full => "Party full",
        PartyStatus::Completed => "Party completed",
    };
    PartySummary {
        party_id: record.id,
        title: title.to_string(),
        status: record.status,
        purpose: record.purpose.clone(),
        organizer_id: record.organizer_id.clone(),
        departure_time: record.departure_time.format(TIME_FORMAT).to_string(),
        member_count: record.member_count(),
        capacity: record.capacity,
        requirements: record.requirements.clone(),
        notes: (!record.notes.is_empty()).then(|| record.notes.clone()),
        roster: roster(record),
    }
}

pub fn render_completion(report: &CompletionReport) -> CompletionSummary {
    let record = &report.record;
    CompletionSummary {
        party_id: record.id,
        purpose: record.purpose.clone(),
        organizer_id: record.organizer_id.clone(),
        departure_time: record.departure_time.format(TIME_FORMAT).to_string(),
        completed_at: report.completed_at.format(TIME_FORMAT).to_string(),
        elapsed: format_elapsed(report.completed_at - record.departure_time),
        requirements: record.requirements.clone(),
        roster: roster(record),
    }
}

/// Elapsed activity time between departure and completion, `"2h 5m"`
/// style, minutes only under an hour.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_minutes = elapsed.num_minutes().max(0);
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

pub fn render_reminder(due: &DueReminder) -> String {
    let mentions: Vec<String> = due.members.iter().map(|m| format!("@{m}")).collect();
    format!(
        "Departure reminder\n{}\nThe '{}' party departs in 10 minutes!\nDeparture time: {}",
        mentions.join(" "),
        due.purpose,
        due.departure_time.format(TIME_FORMAT)
    )
}

/// Direct message sent to each non-organizer member on cancellation.
pub fn render_cancellation(report: &CancelReport) -> String {
    format!(
        "Party cancelled\n\nThe '{}' party you joined was cancelled by its organizer.\nPlanned departure time: {}",
        report.record.purpose,
        report.record.departure_time.format(TIME_FORMAT)
    )
}

pub fn render_completion_announcement(summary: &CompletionSummary) -> String {
    format!(
        "Party activity completed\nThe '{}' party finished successfully.\nDeparture: {} | Completed: {} | Elapsed: {}\nMembers: {}",
        summary.purpose,
        summary.departure_time,
        summary.completed_at,
        summary.elapsed,
        summary
            .roster
            .iter()
            .map(|e| e.user_id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record() -> PartyRecord {
        PartyRecord {
            id: Uuid::new_v4(),
            organizer_id: "u1".to_string(),
            purpose: "raid".to_string(),
            departure_time: NaiveDate::from_ymd_opt(2025, 7, 15)
                .unwrap()
                .and_hms_opt(20, 50, 0)
                .unwrap(),
            capacity: 3,
            requirements: vec!["item level 600".to_string()],
            notes: String::new(),
            members: vec!["u1".to_string(), "u2".to_string()],
            status: PartyStatus::Open,
            notification_sent: false,
            location: None,
        }
    }

    #[test]
    fn summary_reflects_roles_and_capacity_fraction() {
        let summary = render_summary(&record());

        assert_eq!(summary.member_count, 2);
        assert_eq!(summary.capacity, 3);
        assert_eq!(summary.roster[0].role, MemberRole::Organizer);
        assert_eq!(summary.roster[0].position, 1);
        assert_eq!(summary.roster[1].role, MemberRole::Member);
        assert!(summary.notes.is_none());
        assert_eq!(summary.title, "Party recruiting");
    }

    #[test]
    fn title_follows_status() {
        let mut rec = record();
        rec.status = PartyStatus::Full;
        assert_eq!(render_summary(&rec).title, "Party full");
        rec.status = PartyStatus::Completed;
        assert_eq!(render_summary(&rec).title, "Party completed");
    }

    #[test]
    fn elapsed_formats_hours_and_minutes() {
        assert_eq!(format_elapsed(Duration::minutes(125)), "2h 5m");
        assert_eq!(format_elapsed(Duration::minutes(45)), "45m");
        assert_eq!(format_elapsed(Duration::minutes(60)), "1h 0m");
        // Completion before departure clamps to zero.
        assert_eq!(format_elapsed(Duration::minutes(-5)), "0m");
    }

    #[test]
    fn completion_summary_carries_elapsed_time() {
        let rec = record();
        let completed_at = rec.departure_time + Duration::minutes(95);
        let report = CompletionReport {
            record: rec,
            completed_at,
        };
        let summary = render_completion(&report);
        assert_eq!(summary.elapsed, "1h 35m");
        assert_eq!(summary.roster.len(), 2);
    }

    #[test]
    fn reminder_mentions_every_member() {
        let due = DueReminder {
            party_id: Uuid::new_v4(),
            purpose: "raid".to_string(),
            departure_time: record().departure_time,
            members: vec!["u1".to_string(), "u2".to_string()],
            channel_id: Some("c1".to_string()),
        };
        let text = render_reminder(&due);
        assert!(text.contains("@u1"));
        assert!(text.contains("@u2"));
        assert!(text.contains("raid"));
    }
}
