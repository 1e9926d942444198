//! Key encoding for grouped collections.
//!
//! Tickets are stored under `owner || 0x00 || ticket_id` so that a prefix scan
//! on `owner || 0x00` lists one user's history or one event's attendees.

use sptx_core::TicketId;

const SEPARATOR: u8 = 0;

/// Create a ticket key within a grouped collection.
#[must_use]
pub fn ticket_key(owner: &str, ticket_id: &TicketId) -> Vec<u8> {
    let mut key = owner_prefix(owner);
    key.extend_from_slice(ticket_id.as_str().as_bytes());
    key
}

/// Create the prefix for iterating every ticket under `owner`.
#[must_use]
pub fn owner_prefix(owner: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(owner.len() + 1);
    key.extend_from_slice(owner.as_bytes());
    key.push(SEPARATOR);
    key
}
