//! Document storage layer for SPTX.
//!
//! This crate stands in for the platform's document database. It stores
//! reference records, user profiles, issued tickets and referral codes, and
//! offers the one transactional primitive the service relies on: assigning a
//! ticket identifier to a reference exactly once.
//!
//! # Collections
//!
//! - `references`: reference records, keyed by reference string
//! - `users`: user profiles, keyed by user id
//! - `ticket_history`: tickets grouped by user
//! - `event_attendees`: tickets grouped by event
//! - `admin_ledger`: tickets grouped by event
//! - `referrals`: referral codes, keyed by code
//!
//! # Example
//!
//! ```
//! use sptx_core::{ReferenceRecord, TicketId, TicketSnapshot};
//! use sptx_store::{MemoryStore, Store};
//!
//! let store = MemoryStore::new();
//! let reference = "SPTX-REF-1".parse().unwrap();
//! let snapshot = TicketSnapshot {
//!     user_id: "u1".into(),
//!     event_id: "e1".into(),
//!     ..TicketSnapshot::default()
//! };
//! store.put_reference(&ReferenceRecord::pending(reference, snapshot)).unwrap();
//!
//! let reference = "SPTX-REF-1".parse().unwrap();
//! let first = store.assign_ticket_id(&reference, &mut TicketId::generate).unwrap();
//! let again = store.assign_ticket_id(&reference, &mut TicketId::generate).unwrap();
//! assert_eq!(first.ticket_id, again.ticket_id);
//! assert!(!again.newly_assigned);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod memory;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

use sptx_core::{
    Reference, ReferencePatch, ReferenceRecord, Referral, ReferralUsage, TicketId,
    TicketLocation, TicketRecord, UserProfile,
};

/// Outcome of [`Store::assign_ticket_id`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketAssignment {
    /// The identifier now bound to the reference.
    pub ticket_id: TicketId,
    /// `true` if this call minted the identifier, `false` on replay.
    pub newly_assigned: bool,
}

/// The storage trait defining all database operations.
///
/// Implementations must make [`Store::assign_ticket_id`] atomic with respect
/// to other calls for the same reference.
pub trait Store: Send + Sync {
    // =========================================================================
    // Reference Operations
    // =========================================================================

    /// Insert or replace a reference record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_reference(&self, record: &ReferenceRecord) -> Result<()>;

    /// Get a reference record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_reference(&self, reference: &Reference) -> Result<Option<ReferenceRecord>>;

    /// Apply a partial update to a reference record and return the result.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the reference doesn't exist.
    fn update_reference(
        &self,
        reference: &Reference,
        patch: &ReferencePatch,
    ) -> Result<ReferenceRecord>;

    /// Return the reference's ticket identifier, minting one if absent.
    ///
    /// If the record already carries a ticket identifier it is returned with
    /// no write. Otherwise `generate` is called once and the identifier is
    /// written together with its assignment time, in the same atomic unit as
    /// the read.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::TransactionFailed` if the reference doesn't exist
    /// or the conditional write is rejected.
    fn assign_ticket_id(
        &self,
        reference: &Reference,
        generate: &mut dyn FnMut() -> TicketId,
    ) -> Result<TicketAssignment>;

    // =========================================================================
    // User Operations
    // =========================================================================

    /// Insert or replace a user profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_user(&self, user: &UserProfile) -> Result<()>;

    /// Get a user profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>>;

    // =========================================================================
    // Ticket Operations
    // =========================================================================

    /// Insert a ticket into one location unless it is already there.
    ///
    /// Returns `true` if the ticket was written, `false` if a ticket with the
    /// same identifier already existed (first write wins).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn insert_ticket(&self, location: TicketLocation, ticket: &TicketRecord) -> Result<bool>;

    /// Get a ticket from one location.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_ticket(
        &self,
        location: TicketLocation,
        owner: &str,
        ticket_id: &TicketId,
    ) -> Result<Option<TicketRecord>>;

    /// List the tickets grouped under `owner` in one location.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_tickets(&self, location: TicketLocation, owner: &str) -> Result<Vec<TicketRecord>>;

    // =========================================================================
    // Referral Operations
    // =========================================================================

    /// Insert or replace a referral code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_referral(&self, referral: &Referral) -> Result<()>;

    /// Get a referral code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_referral(&self, code: &str) -> Result<Option<Referral>>;

    /// Append a usage entry and increment the counter atomically.
    ///
    /// Returns the usage count afterwards, or `None` if the code doesn't
    /// exist. A usage for a ticket that is already recorded is not appended
    /// again.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn record_referral_usage(&self, code: &str, usage: ReferralUsage) -> Result<Option<u64>>;
}
