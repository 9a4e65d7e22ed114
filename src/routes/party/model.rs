use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Create form as forwarded by the chat adapter. `requirements` is the
/// raw multi-line block from the form; the lifecycle splits and trims
/// it.
#[derive(Debug, Deserialize)]
pub struct CreatePartyRequest {
    pub organizer_id: String,
    /// Channel where the live summary is published.
    pub channel_id: String,
    pub purpose: String,
    /// `YYMMDD HH:MM`, server-local wall clock.
    pub departure_time: String,
    pub capacity: usize,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct PartyActionRequest {
    pub user_id: String,
    pub party_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct PartyIdQuery {
    pub party_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CancelPartyResponse {
    pub cancelled: bool,
    /// How many non-organizer members actually received the direct
    /// cancellation notice (delivery is best-effort).
    pub notified_members: usize,
}
