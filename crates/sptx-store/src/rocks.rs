//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.
//! Values are CBOR-encoded. Read-modify-write operations run under a
//! process-wide write lock, so the atomicity guarantee holds for a single
//! service process owning the database directory.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode,
    MultiThreaded, Options,
};
use sptx_core::{
    Reference, ReferencePatch, ReferenceRecord, Referral, ReferralUsage, TicketId,
    TicketLocation, TicketRecord, UserProfile,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{Store, TicketAssignment};

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    write_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Database("write lock poisoned".into()))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn get_value<T: serde::de::DeserializeOwned>(
        &self,
        cf_name: &str,
        key: &[u8],
    ) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn put_value<T: serde::Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let value = Self::serialize(value)?;
        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Reference Operations
    // =========================================================================

    fn put_reference(&self, record: &ReferenceRecord) -> Result<()> {
        self.put_value(cf::REFERENCES, record.reference.as_ref(), record)
    }

    fn get_reference(&self, reference: &Reference) -> Result<Option<ReferenceRecord>> {
        self.get_value(cf::REFERENCES, reference.as_ref())
    }

    fn update_reference(
        &self,
        reference: &Reference,
        patch: &ReferencePatch,
    ) -> Result<ReferenceRecord> {
        let _guard = self.lock()?;

        let mut record = self
            .get_reference(reference)?
            .ok_or_else(|| StoreError::reference_not_found(reference))?;
        record.apply(patch, Utc::now());

        self.put_reference(&record)?;
        Ok(record)
    }

    fn assign_ticket_id(
        &self,
        reference: &Reference,
        generate: &mut dyn FnMut() -> TicketId,
    ) -> Result<TicketAssignment> {
        let _guard = self.lock()?;

        let mut record = self.get_reference(reference)?.ok_or_else(|| {
            StoreError::TransactionFailed(format!("reference {reference} does not exist"))
        })?;

        if let Some(ticket_id) = record.ticket_id {
            tracing::debug!(reference = %reference, ticket_id = %ticket_id, "Reusing ticket id");
            return Ok(TicketAssignment {
                ticket_id,
                newly_assigned: false,
            });
        }

        let ticket_id = generate();
        let now = Utc::now();
        record.ticket_id = Some(ticket_id.clone());
        record.ticket_id_assigned_at = Some(now);
        record.updated_at = now;

        self.put_reference(&record)
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;
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
        self.put_value(cf::USERS, user.user_id.as_bytes(), user)
    }

    fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>> {
        self.get_value(cf::USERS, user_id.as_bytes())
    }

    // =========================================================================
    // Ticket Operations
    // =========================================================================

    fn insert_ticket(&self, location: TicketLocation, ticket: &TicketRecord) -> Result<bool> {
        let _guard = self.lock()?;

        let key = keys::ticket_key(location.owner_key(ticket), &ticket.ticket_id);
        let cf = self.cf(location.collection())?;
        let exists = self
            .db
            .get_cf(&cf, &key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some();

        if exists {
            return Ok(false);
        }

        self.put_value(location.collection(), &key, ticket)?;
        Ok(true)
    }

    fn get_ticket(
        &self,
        location: TicketLocation,
        owner: &str,
        ticket_id: &TicketId,
    ) -> Result<Option<TicketRecord>> {
        self.get_value(location.collection(), &keys::ticket_key(owner, ticket_id))
    }

    fn list_tickets(&self, location: TicketLocation, owner: &str) -> Result<Vec<TicketRecord>> {
        let cf = self.cf(location.collection())?;
        let prefix = keys::owner_prefix(owner);

        let mut tickets = Vec::new();
        for item in self
            .db
            .iterator_cf(&cf, IteratorMode::From(&prefix, Direction::Forward))
        {
            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            tickets.push(Self::deserialize(&value)?);
        }

        Ok(tickets)
    }

    // =========================================================================
    // Referral Operations
    // =========================================================================

    fn put_referral(&self, referral: &Referral) -> Result<()> {
        self.put_value(cf::REFERRALS, referral.code.as_bytes(), referral)
    }

    fn get_referral(&self, code: &str) -> Result<Option<Referral>> {
        self.get_value(cf::REFERRALS, code.as_bytes())
    }

    fn record_referral_usage(&self, code: &str, usage: ReferralUsage) -> Result<Option<u64>> {
        let _guard = self.lock()?;

        let Some(mut referral) = self.get_referral(code)? else {
            return Ok(None);
        };

        if referral.record(usage) {
            self.put_referral(&referral)?;
        }
        Ok(Some(referral.usage_count))
    }
}
