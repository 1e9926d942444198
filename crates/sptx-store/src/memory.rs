//! In-memory storage implementation.
//!
//! Every collection sits behind its own `RwLock`. Compound operations hold
//! the collection's write lock for the whole read-modify-write, which gives
//! them the atomicity the `Store` contract asks for.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use sptx_core::{
    Reference, ReferencePatch, ReferenceRecord, Referral, ReferralUsage, TicketId,
    TicketLocation, TicketRecord, UserProfile,
};

use crate::error::{Result, StoreError};
use crate::{Store, TicketAssignment};

type TicketGroups = HashMap<(TicketLocation, String), BTreeMap<String, TicketRecord>>;

/// In-memory storage backend.
#[derive(Default)]
pub struct MemoryStore {
    references: RwLock<HashMap<Reference, ReferenceRecord>>,
    users: RwLock<HashMap<String, UserProfile>>,
    tickets: RwLock<TicketGroups>,
    referrals: RwLock<HashMap<String, Referral>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| StoreError::Database("lock poisoned".into()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| StoreError::Database("lock poisoned".into()))
}

impl Store for MemoryStore {
    // =========================================================================
    // Reference Operations
    // =========================================================================

    fn put_reference(&self, record: &ReferenceRecord) -> Result<()> {
        write(&self.references)?.insert(record.reference.clone(), record.clone());
        Ok(())
    }

    fn get_reference(&self, reference: &Reference) -> Result<Option<ReferenceRecord>> {
        Ok(read(&self.references)?.get(reference).cloned())
    }

    fn update_reference(
        &self,
        reference: &Reference,
        patch: &ReferencePatch,
    ) -> Result<ReferenceRecord> {
        let mut references = write(&self.references)?;
        let record = references
            .get_mut(reference)
            .ok_or_else(|| StoreError::reference_not_found(reference))?;

        record.apply(patch, Utc::now());
        Ok(record.clone())
    }

    fn assign_ticket_id(
        &self,
        reference: &Reference,
        generate: &mut dyn FnMut() -> TicketId,
    ) -> Result<TicketAssignment> {
        let mut references = write(&self.references)?;
        let record = references.get_mut(reference).ok_or_else(|| {
            StoreError::TransactionFailed(format!("reference {reference} does not exist"))
        })?;

        if let Some(ticket_id) = &record.ticket_id {
            tracing::debug!(reference = %reference, ticket_id = %ticket_id, "Reusing ticket id");
            return Ok(TicketAssignment {
                ticket_id: ticket_id.clone(),
                newly_assigned: false,
            });
        }

        let ticket_id = generate();
        let now = Utc::now();
        record.ticket_id = Some(ticket_id.clone());
        record.ticket_id_assigned_at = Some(now);
        record.updated_at = now;
        tracing::debug!(reference = %reference, ticket_id = %ticket_id, "Assigned ticket id");

        Ok(TicketAssignment {
            ticket_id,
            newly_assigned: true,
        })
    }

    // =========================================================================
    // User Operations
    // =========================================================================

    fn put_user(&self, user: &UserProfile) -> Result<()> {
        write(&self.users)?.insert(user.user_id.clone(), user.clone());
        Ok(())
    }

    fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>> {
        Ok(read(&self.users)?.get(user_id).cloned())
    }

    // =========================================================================
    // Ticket Operations
    // =========================================================================

    fn insert_ticket(&self, location: TicketLocation, ticket: &TicketRecord) -> Result<bool> {
        let mut tickets = write(&self.tickets)?;
        let group = tickets
            .entry((location, location.owner_key(ticket).to_string()))
            .or_default();

        if group.contains_key(ticket.ticket_id.as_str()) {
            return Ok(false);
        }
        group.insert(ticket.ticket_id.to_string(), ticket.clone());
        Ok(true)
    }

    fn get_ticket(
        &self,
        location: TicketLocation,
        owner: &str,
        ticket_id: &TicketId,
    ) -> Result<Option<TicketRecord>> {
        Ok(read(&self.tickets)?
            .get(&(location, owner.to_string()))
            .and_then(|group| group.get(ticket_id.as_str()))
            .cloned())
    }

    fn list_tickets(&self, location: TicketLocation, owner: &str) -> Result<Vec<TicketRecord>> {
        Ok(read(&self.tickets)?
            .get(&(location, owner.to_string()))
            .map(|group| group.values().cloned().collect())
            .unwrap_or_default())
    }

    // =========================================================================
    // Referral Operations
    // =========================================================================

    fn put_referral(&self, referral: &Referral) -> Result<()> {
        write(&self.referrals)?.insert(referral.code.clone(), referral.clone());
        Ok(())
    }

    fn get_referral(&self, code: &str) -> Result<Option<Referral>> {
        Ok(read(&self.referrals)?.get(code).cloned())
    }

    fn record_referral_usage(&self, code: &str, usage: ReferralUsage) -> Result<Option<u64>> {
        let mut referrals = write(&self.referrals)?;
        Ok(referrals.get_mut(code).map(|referral| {
            referral.record(usage);
            referral.usage_count
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use sptx_core::{PaymentMethod, ReferenceStatus, TicketSnapshot};

    use super::*;

    fn seeded_store(reference: &str) -> (MemoryStore, Reference) {
        let store = MemoryStore::new();
        let reference: Reference = reference.parse().unwrap();
        let snapshot = TicketSnapshot {
            user_id: "u1".into(),
            event_id: "e1".into(),
            ..TicketSnapshot::default()
        };
        store
            .put_reference(&ReferenceRecord::pending(reference.clone(), snapshot))
            .unwrap();
        (store, reference)
    }

    fn ticket(store: &MemoryStore, reference: &Reference) -> TicketRecord {
        let record = store.get_reference(reference).unwrap().unwrap();
        TicketRecord::issue(
            TicketId::generate(),
            &record,
            &UserProfile::new("u1", "Ada", "ada@example.com"),
            PaymentMethod::Paystack,
            Utc::now(),
        )
    }

    #[test]
    fn reference_crud() {
        let (store, reference) = seeded_store("SPTX-REF-crud");

        let record = store.get_reference(&reference).unwrap().unwrap();
        assert_eq!(record.status, ReferenceStatus::Pending);

        let updated = store
            .update_reference(&reference, &ReferencePatch::status(ReferenceStatus::Failed))
            .unwrap();
        assert_eq!(updated.status, ReferenceStatus::Failed);

        let missing: Reference = "SPTX-REF-missing".parse().unwrap();
        assert!(store.get_reference(&missing).unwrap().is_none());
        assert!(matches!(
            store.update_reference(&missing, &ReferencePatch::default()),
            Err(StoreError::NotFound { entity: "reference", .. })
        ));
    }

    #[test]
    fn assign_ticket_id_is_idempotent() {
        let (store, reference) = seeded_store("SPTX-REF-idem");
        let mut calls = 0;
        let mut generate = || {
            calls += 1;
            TicketId::generate()
        };

        let first = store.assign_ticket_id(&reference, &mut generate).unwrap();
        let second = store.assign_ticket_id(&reference, &mut generate).unwrap();

        assert!(first.newly_assigned);
        assert!(!second.newly_assigned);
        assert_eq!(first.ticket_id, second.ticket_id);
        assert_eq!(calls, 1);

        let record = store.get_reference(&reference).unwrap().unwrap();
        assert_eq!(record.ticket_id, Some(first.ticket_id));
        assert!(record.ticket_id_assigned_at.is_some());
    }

    #[test]
    fn assign_ticket_id_missing_reference_fails() {
        let store = MemoryStore::new();
        let reference: Reference = "SPTX-REF-ghost".parse().unwrap();

        let result = store.assign_ticket_id(&reference, &mut TicketId::generate);
        assert!(matches!(result, Err(StoreError::TransactionFailed(_))));
    }

    #[test]
    fn concurrent_assignment_mints_one_id() {
        let (store, reference) = seeded_store("SPTX-REF-race");
        let store = Arc::new(store);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                let reference = reference.clone();
                std::thread::spawn(move || {
                    store
                        .assign_ticket_id(&reference, &mut TicketId::generate)
                        .unwrap()
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let ids: HashSet<_> = results.iter().map(|r| r.ticket_id.clone()).collect();

        assert_eq!(ids.len(), 1);
        assert_eq!(results.iter().filter(|r| r.newly_assigned).count(), 1);
    }

    #[test]
    fn insert_ticket_first_write_wins() {
        let (store, reference) = seeded_store("SPTX-REF-fanout");
        let original = ticket(&store, &reference);

        for location in TicketLocation::ALL {
            assert!(store.insert_ticket(location, &original).unwrap());
        }

        let mut replay = original.clone();
        replay.attendee_name = "Someone Else".into();
        for location in TicketLocation::ALL {
            assert!(!store.insert_ticket(location, &replay).unwrap());
        }

        let history = store.list_tickets(TicketLocation::UserHistory, "u1").unwrap();
        assert_eq!(history, vec![original.clone()]);

        let stored = store
            .get_ticket(TicketLocation::AdminLedger, "e1", &original.ticket_id)
            .unwrap()
            .unwrap();
        assert_eq!(stored.attendee_name, "Ada");
    }

    #[test]
    fn referral_usage_counts() {
        let store = MemoryStore::new();
        store.put_referral(&Referral::new("AMAKA10", "u9")).unwrap();

        let usage = ReferralUsage {
            ticket_id: TicketId::generate(),
            user_id: "u1".into(),
            reference: "SPTX-REF-1".parse().unwrap(),
            used_at: Utc::now(),
        };

        assert_eq!(
            store.record_referral_usage("AMAKA10", usage.clone()).unwrap(),
            Some(1)
        );
        assert_eq!(
            store.record_referral_usage("AMAKA10", usage).unwrap(),
            Some(1)
        );
        assert_eq!(
            store
                .record_referral_usage(
                    "NOPE",
                    ReferralUsage {
                        ticket_id: TicketId::generate(),
                        user_id: "u1".into(),
                        reference: "SPTX-REF-2".parse().unwrap(),
                        used_at: Utc::now(),
                    }
                )
                .unwrap(),
            None
        );
    }

    #[test]
    fn user_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get_user("u1").unwrap().is_none());

        store
            .put_user(&UserProfile::new("u1", "Ada", "ada@example.com"))
            .unwrap();
        assert_eq!(store.get_user("u1").unwrap().unwrap().full_name, "Ada");
    }
}
