use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::party::record::PartyRecord;

/// Registry handle shared between the HTTP handlers and the departure
/// notifier. One mutex guards both maps; every lifecycle operation
/// validates and mutates inside a single lock acquisition and releases
/// it before any outbound I/O.
pub type SharedRegistry = Arc<Mutex<PartyRegistry>>;

/// Owns every live party plus the user → party reverse index that
/// enforces single membership. The two maps are only mutated together,
/// through the lifecycle operations.
#[derive(Debug, Default)]
pub struct PartyRegistry {
    records: HashMap<Uuid, PartyRecord>,
    party_by_user: HashMap<String, Uuid>,
}

impl PartyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: Uuid) -> Option<&PartyRecord> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut PartyRecord> {
        self.records.get_mut(&id)
    }

    /// The party the user currently belongs to, if any.
    pub fn party_of(&self, user_id: &str) -> Option<Uuid> {
        self.party_by_user.get(user_id).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut PartyRecord> {
        self.records.values_mut()
    }

    /// Inserts a fresh record and indexes every current member.
    pub fn insert(&mut self, record: PartyRecord) {
        for member in &record.members {
            self.party_by_user.insert(member.clone(), record.id);
        }
        self.records.insert(record.id, record);
    }

    pub fn bind_user(&mut self, user_id: &str, id: Uuid) {
        self.party_by_user.insert(user_id.to_string(), id);
    }

    pub fn release_user(&mut self, user_id: &str) {
        self.party_by_user.remove(user_id);
    }

    /// Removes a record and releases all of its members from the
    /// reverse index in the same step.
    pub fn remove(&mut self, id: Uuid) -> Option<PartyRecord> {
        let record = self.records.remove(&id)?;
        for member in &record.members {
            self.party_by_user.remove(member);
        }
        Some(record)
    }

    /// Cross-map consistency: a user is indexed iff they appear in the
    /// member list of exactly the indexed record. Used by tests.
    #[cfg(test)]
    pub fn is_consistent(&self) -> bool {
        let indexed_ok = self.party_by_user.iter().all(|(user, id)| {
            self.records
                .get(id)
                .is_some_and(|record| record.is_member(user))
        });
        let members_ok = self.records.values().all(|record| {
            record
                .members
                .iter()
                .all(|member| self.party_by_user.get(member) == Some(&record.id))
        });
        indexed_ok && members_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::party::record::PartyStatus;
    use chrono::NaiveDate;

    fn record(organizer: &str) -> PartyRecord {
        PartyRecord {
            id: Uuid::new_v4(),
            organizer_id: organizer.to_string(),
            purpose: "dungeon run".to_string(),
            departure_time: NaiveDate::from_ymd_opt(2025, 7, 15)
                .unwrap()
                .and_hms_opt(20, 50, 0)
                .unwrap(),
            capacity: 4,
            requirements: vec![],
            notes: String::new(),
            members: vec![organizer.to_string()],
            status: PartyStatus::Open,
            notification_sent: false,
            location: None,
        }
    }

    #[test]
    fn insert_indexes_every_member() {
        let mut registry = PartyRegistry::new();
        let mut rec = record("u1");
        rec.members.push("u2".to_string());
        let id = rec.id;
        registry.insert(rec);

        assert_eq!(registry.party_of("u1"), Some(id));
        assert_eq!(registry.party_of("u2"), Some(id));
        assert!(registry.is_consistent());
    }

    #[test]
    fn remove_releases_every_member() {
        let mut registry = PartyRegistry::new();
        let mut rec = record("u1");
        rec.members.push("u2".to_string());
        let id = rec.id;
        registry.insert(rec);

        let removed = registry.remove(id).unwrap();
        assert_eq!(removed.members.len(), 2);
        assert!(registry.party_of("u1").is_none());
        assert!(registry.party_of("u2").is_none());
        assert!(registry.is_empty());
        assert!(registry.is_consistent());
    }

    #[test]
    fn remove_unknown_id_is_none() {
        let mut registry = PartyRegistry::new();
        assert!(registry.remove(Uuid::new_v4()).is_none());
    }
}
