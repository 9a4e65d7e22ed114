use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PartyError;

/// Recruitment state of a party. `Completed` is terminal; completed
/// records are removed from the registry as part of the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyStatus {
    Open,
    Full,
    Completed,
}

/// Where the live roster summary is rendered on the chat platform.
/// Bound once after the first successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRef {
    pub channel_id: String,
    pub message_id: String,
}

/// One active party. The organizer is always `members[0]` and stays a
/// member until the record leaves the registry.
#[derive(Debug, Clone, Serialize)]
pub struct PartyRecord {
    pub id: Uuid,
    pub organizer_id: String,
    pub purpose: String,
    pub departure_time: NaiveDateTime,
    pub capacity: usize,
    pub requirements: Vec<String>,
    pub notes: String,
    pub members: Vec<String>,
    pub status: PartyStatus,
    pub notification_sent: bool,
    pub location: Option<LocationRef>,
}

impl PartyRecord {
    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }

    pub fn is_organizer(&self, user_id: &str) -> bool {
        self.organizer_id == user_id
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// Size bounds applied when a party is created.
#[derive(Debug, Clone, Copy)]
pub struct PartyLimits {
    pub min_size: usize,
    pub max_size: usize,
}

impl Default for PartyLimits {
    fn default() -> Self {
        Self {
            min_size: 2,
            max_size: 16,
        }
    }
}

/// Parses the fixed departure-time format accepted at the boundary:
/// `YYMMDD HH:MM`, one space, 2-digit year mapped to 2000+YY, 24-hour
/// clock. Any deviation is a validation error.
pub fn parse_departure(input: &str) -> Result<NaiveDateTime, PartyError> {
    let invalid = || {
        PartyError::Validation(
            "departure time must use the format YYMMDD HH:MM (e.g. 250715 20:50)".to_string(),
        )
    };

    let parts: Vec<&str> = input.trim().split(' ').collect();
    let [date_part, time_part] = parts.as_slice() else {
        return Err(invalid());
    };

    if date_part.len() != 6 || !date_part.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let year = 2000 + date_part[0..2].parse::<i32>().map_err(|_| invalid())?;
    let month: u32 = date_part[2..4].parse().map_err(|_| invalid())?;
    let day: u32 = date_part[4..6].parse().map_err(|_| invalid())?;

    let time_fields: Vec<&str> = time_part.split(':').collect();
    let [hour_part, minute_part] = time_fields.as_slice() else {
        return Err(invalid());
    };
    if hour_part.len() != 2 || minute_part.len() != 2 {
        return Err(invalid());
    }
    let hour: u32 = hour_part.parse().map_err(|_| invalid())?;
    let minute: u32 = minute_part.parse().map_err(|_| invalid())?;

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)?;
    Ok(NaiveDateTime::new(date, time))
}
