//! State transitions for the party lifecycle.
//!
//! Every function here takes `&mut PartyRegistry` and performs its
//! whole validate-and-mutate span before returning, so callers that
//! hold the registry lock get atomic transitions. Snapshots are
//! returned by value for rendering after the lock is dropped.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::error::PartyError;
use crate::party::record::{LocationRef, PartyLimits, PartyRecord, PartyStatus, parse_departure};
use crate::party::registry::PartyRegistry;

/// Raw create form as submitted through the chat adapter. Departure
/// time and requirements arrive as the user typed them and are parsed
/// here so the precondition order stays in one place.
#[derive(Debug, Clone)]
pub struct CreateParty {
    pub organizer_id: String,
    pub purpose: String,
    pub departure_time: String,
    pub capacity: usize,
    pub requirements: String,
    pub notes: String,
}

/// Snapshot handed to the presentation layer after a completion; the
/// completion record posted to the home channel is the only durable
/// artifact of the party.
#[derive(Debug, Clone)]
pub struct CompletionReport {
    pub record: PartyRecord,
    pub completed_at: NaiveDateTime,
}

/// Snapshot handed to the presentation layer after a cancellation.
/// `recipients` are the non-organizer members owed a direct message.
#[derive(Debug, Clone)]
pub struct CancelReport {
    pub record: PartyRecord,
    pub recipients: Vec<String>,
}

const ORGANIZER_BARRED: &str =
    "the organizer cannot use member actions; use the organizer controls instead";
const ORGANIZER_ONLY: &str = "only the party organizer can do that";

fn not_found(id: Uuid) -> PartyError {
    PartyError::NotFound(format!("no party found for id {id}"))
}

fn find_party(registry: &PartyRegistry, id: Uuid) -> Result<&PartyRecord, PartyError> {
    registry.get(id).ok_or_else(|| not_found(id))
}

/// Opens a new party with the organizer as its first member.
pub fn create(
    registry: &mut PartyRegistry,
    form: CreateParty,
    limits: &PartyLimits,
    now: NaiveDateTime,
) -> Result<PartyRecord, PartyError> {
    if registry.party_of(&form.organizer_id).is_some() {
        return Err(PartyError::Validation(
            "you are already in a party; you can only be in one at a time".to_string(),
        ));
    }

    let departure_time = parse_departure(&form.departure_time)?;
    if departure_time <= now {
        return Err(PartyError::Validation(
            "the departure time must be in the future".to_string(),
        ));
    }

    if form.capacity < limits.min_size || form.capacity > limits.max_size {
        return Err(PartyError::Validation(format!(
            "party size must be between {} and {}",
            limits.min_size, limits.max_size
        )));
    }

    let purpose = form.purpose.trim().to_string();
    if purpose.is_empty() || purpose.chars().count() > 100 {
        return Err(PartyError::Validation(
            "the purpose must be between 1 and 100 characters".to_string(),
        ));
    }

    let requirements: Vec<String> = form
        .requirements
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    let record = PartyRecord {
        id: Uuid::new_v4(),
        organizer_id: form.organizer_id.clone(),
        purpose,
        departure_time,
        capacity: form.capacity,
        requirements,
        notes: form.notes.trim().to_string(),
        members: vec![form.organizer_id],
        status: PartyStatus::Open,
        notification_sent: false,
        location: None,
    };
    let snapshot = record.clone();
    registry.insert(record);
    tracing::info!(party_id = %snapshot.id, organizer = %snapshot.organizer_id, "party created");
    Ok(snapshot)
}

/// Adds a member to an open party, transitioning to `Full` when the
/// last slot is taken.
pub fn join(
    registry: &mut PartyRegistry,
    user_id: &str,
    party_id: Uuid,
) -> Result<PartyRecord, PartyError> {
    let record = find_party(registry, party_id)?;
    if record.status == PartyStatus::Completed {
        return Err(PartyError::AlreadyCompleted);
    }
    if record.is_organizer(user_id) {
        return Err(PartyError::Permission(ORGANIZER_BARRED.to_string()));
    }
    if registry.party_of(user_id).is_some() {
        return Err(PartyError::Validation(
            "you are already in a party; leave it before joining another".to_string(),
        ));
    }
    let record = registry
        .get_mut(party_id)
        .ok_or_else(|| not_found(party_id))?;
    if record.is_member(user_id) {
        return Err(PartyError::Validation(
            "you have already joined this party".to_string(),
        ));
    }
    if record.member_count() >= record.capacity {
        return Err(PartyError::Validation("the party is full".to_string()));
    }

    record.members.push(user_id.to_string());
    if record.member_count() == record.capacity {
        record.status = PartyStatus::Full;
    }
    let snapshot = record.clone();
    registry.bind_user(user_id, party_id);
    tracing::info!(party_id = %party_id, user = %user_id, "member joined");
    Ok(snapshot)
}

/// Removes a member, reopening a full party. The organizer cannot
/// leave; they complete or cancel instead.
pub fn leave(
    registry: &mut PartyRegistry,
    user_id: &str,
    party_id: Uuid,
) -> Result<PartyRecord, PartyError> {
    let record = find_party(registry, party_id)?;
    if record.status == PartyStatus::Completed {
        return Err(PartyError::AlreadyCompleted);
    }
    if record.is_organizer(user_id) {
        return Err(PartyError::Permission(ORGANIZER_BARRED.to_string()));
    }
    if !record.is_member(user_id) {
        return Err(PartyError::Validation(
            "you are not a member of this party".to_string(),
        ));
    }

    let record = registry
        .get_mut(party_id)
        .ok_or_else(|| not_found(party_id))?;
    record.members.retain(|member| member != user_id);
    if record.status == PartyStatus::Full {
        record.status = PartyStatus::Open;
    }
    let snapshot = record.clone();
    registry.release_user(user_id);
    tracing::info!(party_id = %party_id, user = %user_id, "member left");
    Ok(snapshot)
}

/// Terminal transition: releases every member, removes the record and
/// returns the snapshot for the durable completion announcement.
pub fn complete(
    registry: &mut PartyRegistry,
    caller_id: &str,
    party_id: Uuid,
    now: NaiveDateTime,
) -> Result<CompletionReport, PartyError> {
    let record = find_party(registry, party_id)?;
    if !record.is_organizer(caller_id) {
        return Err(PartyError::Permission(ORGANIZER_ONLY.to_string()));
    }
    if record.status == PartyStatus::Completed {
        return Err(PartyError::AlreadyCompleted);
    }

    let mut record = registry.remove(party_id).ok_or_else(|| not_found(party_id))?;
    record.status = PartyStatus::Completed;
    tracing::info!(party_id = %party_id, members = record.member_count(), "party completed");
    Ok(CompletionReport {
        record,
        completed_at: now,
    })
}

/// Organizer-only teardown: releases every member and removes the
/// record. Notifying members and removing the summary are the caller's
/// best-effort follow-ups and never roll this back.
pub fn cancel(
    registry: &mut PartyRegistry,
    caller_id: &str,
    party_id: Uuid,
) -> Result<CancelReport, PartyError> {
    let record = find_party(registry, party_id)?;
    if !record.is_organizer(caller_id) {
        return Err(PartyError::Permission(ORGANIZER_ONLY.to_string()));
    }
    if record.status == PartyStatus::Completed {
        return Err(PartyError::AlreadyCompleted);
    }

    let record = registry.remove(party_id).ok_or_else(|| not_found(party_id))?;
    let recipients: Vec<String> = record
        .members
        .iter()
        .filter(|member| *member != &record.organizer_id)
        .cloned()
        .collect();
    tracing::info!(party_id = %party_id, notified = recipients.len(), "party cancelled");
    Ok(CancelReport { record, recipients })
}

/// Binds the rendered summary location after the first publish. The
/// location never changes once set.
pub fn set_location(
    registry: &mut PartyRegistry,
    party_id: Uuid,
    location: LocationRef,
) -> Result<(), PartyError> {
    let record = registry
        .get_mut(party_id)
        .ok_or_else(|| not_found(party_id))?;
    if record.location.is_none() {
        record.location = Some(location);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local};

    fn now() -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn departure_in(hours: i64) -> String {
        (now() + Duration::hours(hours))
            .format("%y%m%d %H:%M")
            .to_string()
    }

    fn form(organizer: &str, capacity: usize) -> CreateParty {
        CreateParty {
            organizer_id: organizer.to_string(),
            purpose: "raid".to_string(),
            departure_time: departure_in(1),
            capacity,
            requirements: String::new(),
            notes: String::new(),
        }
    }

    fn open_party(registry: &mut PartyRegistry, organizer: &str, capacity: usize) -> Uuid {
        create(registry, form(organizer, capacity), &PartyLimits::default(), now())
            .unwrap()
            .id
    }

    #[test]
    fn create_seeds_organizer_as_first_member() {
        let mut registry = PartyRegistry::new();
        let record = create(
            &mut registry,
            form("u1", 3),
            &PartyLimits::default(),
            now(),
        )
        .unwrap();

        assert_eq!(record.members, vec!["u1".to_string()]);
        assert_eq!(record.status, PartyStatus::Open);
        assert_eq!(record.capacity, 3);
        assert!(!record.notification_sent);
        assert_eq!(registry.party_of("u1"), Some(record.id));
        assert!(registry.is_consistent());
    }

    #[test]
    fn create_rejects_organizer_already_in_a_party() {
        let mut registry = PartyRegistry::new();
        open_party(&mut registry, "u1", 3);

        let err = create(&mut registry, form("u1", 3), &PartyLimits::default(), now());
        assert!(matches!(err, Err(PartyError::Validation(_))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn create_rejects_past_departure() {
        let mut registry = PartyRegistry::new();
        let mut f = form("u1", 3);
        f.departure_time = (now() - Duration::hours(1)).format("%y%m%d %H:%M").to_string();

        assert!(matches!(
            create(&mut registry, f, &PartyLimits::default(), now()),
            Err(PartyError::Validation(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn create_rejects_malformed_departure_without_a_record() {
        let mut registry = PartyRegistry::new();
        let mut f = form("u1", 3);
        f.departure_time = "991301 99:99".to_string();

        assert!(matches!(
            create(&mut registry, f, &PartyLimits::default(), now()),
            Err(PartyError::Validation(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn create_rejects_capacity_out_of_bounds() {
        let mut registry = PartyRegistry::new();
        for capacity in [1, 17] {
            assert!(matches!(
                create(&mut registry, form("u1", capacity), &PartyLimits::default(), now()),
                Err(PartyError::Validation(_))
            ));
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn create_splits_and_trims_requirement_lines() {
        let mut registry = PartyRegistry::new();
        let mut f = form("u1", 3);
        f.requirements = " item level 600 \n\n  healer preferred\n".to_string();

        let record = create(&mut registry, f, &PartyLimits::default(), now()).unwrap();
        assert_eq!(record.requirements, vec!["item level 600", "healer preferred"]);
    }

    #[test]
    fn join_fills_party_and_flips_status() {
        let mut registry = PartyRegistry::new();
        let id = open_party(&mut registry, "u1", 3);

        let after_u2 = join(&mut registry, "u2", id).unwrap();
        assert_eq!(after_u2.status, PartyStatus::Open);

        let after_u3 = join(&mut registry, "u3", id).unwrap();
        assert_eq!(after_u3.status, PartyStatus::Full);
        assert_eq!(after_u3.members, vec!["u1", "u2", "u3"]);
        assert!(registry.is_consistent());
    }

    #[test]
    fn join_rejects_organizer_without_mutation() {
        let mut registry = PartyRegistry::new();
        let id = open_party(&mut registry, "u1", 3);

        assert!(matches!(
            join(&mut registry, "u1", id),
            Err(PartyError::Permission(_))
        ));
        assert_eq!(registry.get(id).unwrap().member_count(), 1);
    }

    #[test]
    fn join_rejects_member_of_another_party() {
        let mut registry = PartyRegistry::new();
        let first = open_party(&mut registry, "u1", 3);
        let second = open_party(&mut registry, "u2", 3);
        join(&mut registry, "u3", first).unwrap();

        assert!(matches!(
            join(&mut registry, "u3", second),
            Err(PartyError::Validation(_))
        ));
        assert_eq!(registry.party_of("u3"), Some(first));
    }

    #[test]
    fn join_rejects_when_full_and_never_overflows() {
        let mut registry = PartyRegistry::new();
        let id = open_party(&mut registry, "u1", 2);
        join(&mut registry, "u2", id).unwrap();

        assert!(matches!(
            join(&mut registry, "u3", id),
            Err(PartyError::Validation(_))
        ));
        let record = registry.get(id).unwrap();
        assert!(record.member_count() <= record.capacity);
    }

    #[test]
    fn join_unknown_party_is_not_found() {
        let mut registry = PartyRegistry::new();
        assert!(matches!(
            join(&mut registry, "u2", Uuid::new_v4()),
            Err(PartyError::NotFound(_))
        ));
    }

    #[test]
    fn leave_reopens_a_full_party() {
        let mut registry = PartyRegistry::new();
        let id = open_party(&mut registry, "u1", 3);
        join(&mut registry, "u2", id).unwrap();
        join(&mut registry, "u3", id).unwrap();
        assert_eq!(registry.get(id).unwrap().status, PartyStatus::Full);

        let record = leave(&mut registry, "u2", id).unwrap();
        assert_eq!(record.status, PartyStatus::Open);
        assert_eq!(record.member_count(), 2);
        assert!(registry.party_of("u2").is_none());
        assert!(registry.is_consistent());
    }

    #[test]
    fn leave_rejects_organizer_and_non_members() {
        let mut registry = PartyRegistry::new();
        let id = open_party(&mut registry, "u1", 3);

        assert!(matches!(
            leave(&mut registry, "u1", id),
            Err(PartyError::Permission(_))
        ));
        assert!(matches!(
            leave(&mut registry, "u9", id),
            Err(PartyError::Validation(_))
        ));
        assert!(registry.get(id).unwrap().is_member("u1"));
    }

    #[test]
    fn complete_releases_everyone_and_is_terminal() {
        let mut registry = PartyRegistry::new();
        let id = open_party(&mut registry, "u1", 3);
        join(&mut registry, "u2", id).unwrap();

        let report = complete(&mut registry, "u1", id, now()).unwrap();
        assert_eq!(report.record.status, PartyStatus::Completed);
        assert!(registry.get(id).is_none());
        assert!(registry.party_of("u1").is_none());
        assert!(registry.party_of("u2").is_none());

        // Second call fails: the record is gone.
        assert!(matches!(
            complete(&mut registry, "u1", id, now()),
            Err(PartyError::NotFound(_))
        ));
    }

    #[test]
    fn complete_rejects_non_organizer() {
        let mut registry = PartyRegistry::new();
        let id = open_party(&mut registry, "u1", 3);
        join(&mut registry, "u2", id).unwrap();

        assert!(matches!(
            complete(&mut registry, "u2", id, now()),
            Err(PartyError::Permission(_))
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn members_can_rejoin_after_completion() {
        let mut registry = PartyRegistry::new();
        let id = open_party(&mut registry, "u1", 3);
        join(&mut registry, "u2", id).unwrap();
        complete(&mut registry, "u1", id, now()).unwrap();

        // Everyone is released, so both can organize or join again.
        let next = open_party(&mut registry, "u2", 3);
        join(&mut registry, "u1", next).unwrap();
    }

    #[test]
    fn cancel_clears_registry_and_lists_recipients() {
        let mut registry = PartyRegistry::new();
        let id = open_party(&mut registry, "u1", 3);
        join(&mut registry, "u2", id).unwrap();
        join(&mut registry, "u3", id).unwrap();

        let report = cancel(&mut registry, "u1", id).unwrap();
        assert_eq!(report.recipients, vec!["u2", "u3"]);
        assert!(registry.get(id).is_none());
        for user in ["u1", "u2", "u3"] {
            assert!(registry.party_of(user).is_none());
        }
        assert!(registry.is_consistent());
    }

    #[test]
    fn cancel_rejects_non_organizer() {
        let mut registry = PartyRegistry::new();
        let id = open_party(&mut registry, "u1", 3);
        join(&mut registry, "u2", id).unwrap();

        assert!(matches!(
            cancel(&mut registry, "u2", id),
            Err(PartyError::Permission(_))
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn set_location_binds_once() {
        let mut registry = PartyRegistry::new();
        let id = open_party(&mut registry, "u1", 3);
        let first = LocationRef {
            channel_id: "c1".to_string(),
            message_id: "m1".to_string(),
        };
        set_location(&mut registry, id, first.clone()).unwrap();
        set_location(
            &mut registry,
            id,
            LocationRef {
                channel_id: "c2".to_string(),
                message_id: "m2".to_string(),
            },
        )
        .unwrap();

        assert_eq!(registry.get(id).unwrap().location, Some(first));
    }

    #[test]
    fn operations_on_distinct_parties_are_independent() {
        let mut registry = PartyRegistry::new();
        let a = open_party(&mut registry, "u1", 2);
        let b = open_party(&mut registry, "u2", 2);
        join(&mut registry, "u3", a).unwrap();
        join(&mut registry, "u4", b).unwrap();

        cancel(&mut registry, "u1", a).unwrap();
        assert!(registry.get(b).is_some());
        assert_eq!(registry.party_of("u4"), Some(b));
        assert!(registry.is_consistent());
    }
}
