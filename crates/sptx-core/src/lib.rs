//! Core types for the SPTX ticketing service.
//!
//! This crate provides the foundational types shared by the store and the
//! HTTP service:
//!
//! - **Identifiers**: `Reference`, `ReferenceKind`, `TicketId`
//! - **References**: `ReferenceRecord`, `ReferenceStatus`, `ReferencePatch`
//! - **Tickets**: `TicketRecord`, `TicketLocation`, `PaymentMethod`
//! - **Users and referrals**: `UserProfile`, `Referral`, `ReferralUsage`
//!
//! # Money
//!
//! All monetary fields are `i64` minor units (kobo). The free-ticket path pins
//! every monetary field to zero.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod reference;
pub mod referral;
pub mod ticket;
pub mod user;

pub use error::{CoreError, Result};
pub use ids::{
    IdError, Reference, ReferenceKind, TicketId, FREE_REFERENCE_PREFIX, PAID_REFERENCE_PREFIX,
    TICKET_ID_PREFIX,
};
pub use reference::{
    PaymentDetails, ReferencePatch, ReferenceRecord, ReferenceStatus, TicketSnapshot,
    FREE_TICKET_VENDOR, TICKET_PURCHASE,
};
pub use referral::{Referral, ReferralUsage};
pub use ticket::{PaymentMethod, TicketLocation, TicketRecord};
pub use user::UserProfile;
