//! Issued tickets.
//!
//! A ticket is written identically into three collections, each serving its
//! own read pattern: a user's booking history, an event's attendee list, and
//! the admin ledger for an event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{Reference, TicketId};
use crate::reference::ReferenceRecord;
use crate::user::UserProfile;

/// How a ticket was paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Charged through the payment gateway.
    Paystack,
    /// Free ticket.
    Free,
}

/// The collections a ticket is written into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TicketLocation {
    /// Booking history, grouped by user.
    UserHistory,
    /// Attendee list, grouped by event.
    EventAttendees,
    /// Admin ledger, grouped by event.
    AdminLedger,
}

impl TicketLocation {
    /// Every location, in write order.
    pub const ALL: [Self; 3] = [Self::UserHistory, Self::EventAttendees, Self::AdminLedger];

    /// Collection name used by storage backends.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::UserHistory => "ticket_history",
            Self::EventAttendees => "event_attendees",
            Self::AdminLedger => "admin_ledger",
        }
    }

    /// The grouping key of `ticket` within this location.
    #[must_use]
    pub fn owner_key(self, ticket: &TicketRecord) -> &str {
        match self {
            Self::UserHistory => &ticket.user_id,
            Self::EventAttendees | Self::AdminLedger => &ticket.event_id,
        }
    }
}

/// One issued ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRecord {
    /// Ticket identifier; primary key within each location.
    pub ticket_id: TicketId,
    /// Reference the ticket was issued from.
    pub reference: Reference,
    /// Attendee user id.
    pub user_id: String,
    /// Attendee display name.
    pub attendee_name: String,
    /// Attendee email.
    pub attendee_email: String,
    /// Event id.
    pub event_id: String,
    /// Event display name.
    pub event_name: String,
    /// Ticket tier.
    pub ticket_type: String,
    /// Ticket price in kobo.
    pub ticket_price: i64,
    /// Platform fee in kobo.
    pub service_fee: i64,
    /// Amount charged in kobo.
    pub total_amount: i64,
    /// Discount code used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,
    /// Referral code used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,
    /// Venue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_venue: Option<String>,
    /// Event date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    /// Event time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_time: Option<String>,
    /// How the ticket was paid for.
    pub payment_method: PaymentMethod,
    /// When the ticket was issued.
    pub created_at: DateTime<Utc>,
}

impl TicketRecord {
    /// Build a ticket from a reference snapshot and the attendee's profile.
    ///
    /// Free tickets have every monetary field pinned to zero regardless of
    /// what the snapshot carries. Profile name and email take precedence over
    /// the contact details given at checkout.
    #[must_use]
    pub fn issue(
        ticket_id: TicketId,
        record: &ReferenceRecord,
        user: &UserProfile,
        payment_method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> Self {
        let snapshot = match payment_method {
            PaymentMethod::Free => record.ticket.clone().without_charges(),
            PaymentMethod::Paystack => record.ticket.clone(),
        };

        let attendee_name = non_empty(&user.full_name)
            .or(snapshot.booker_name.as_deref())
            .unwrap_or_default()
            .to_string();
        let attendee_email = non_empty(&user.email)
            .or(snapshot.booker_email.as_deref())
            .unwrap_or_default()
            .to_string();

        Self {
            ticket_id,
            reference: record.reference.clone(),
            user_id: user.user_id.clone(),
            attendee_name,
            attendee_email,
            event_id: snapshot.event_id,
            event_name: snapshot.event_name,
            ticket_type: snapshot.ticket_type,
            ticket_price: snapshot.ticket_price,
            service_fee: snapshot.service_fee,
            total_amount: snapshot.total_amount,
            discount_code: snapshot.discount_code,
            referral_code: snapshot.referral_code,
            event_venue: snapshot.event_venue,
            event_date: snapshot.event_date,
            event_time: snapshot.event_time,
            payment_method,
            created_at: now,
        }
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::TicketSnapshot;

    fn record() -> ReferenceRecord {
        ReferenceRecord::pending(
            "SPTX-REF-abc".parse().unwrap(),
            TicketSnapshot {
                user_id: "u1".into(),
                event_id: "e1".into(),
                event_name: "Afrobeats Live".into(),
                ticket_type: "Regular".into(),
                ticket_price: 1_000_000,
                service_fee: 50_000,
                total_amount: 1_050_000,
                booker_name: Some("Checkout Name".into()),
                booker_email: Some("checkout@example.com".into()),
                ..TicketSnapshot::default()
            },
        )
    }

    #[test]
    fn paid_ticket_keeps_amounts() {
        let user = UserProfile::new("u1", "Ada Obi", "ada@example.com");
        let ticket = TicketRecord::issue(
            TicketId::generate(),
            &record(),
            &user,
            PaymentMethod::Paystack,
            Utc::now(),
        );

        assert_eq!(ticket.total_amount, 1_050_000);
        assert_eq!(ticket.attendee_name, "Ada Obi");
        assert_eq!(ticket.attendee_email, "ada@example.com");
        assert_eq!(ticket.reference.as_str(), "SPTX-REF-abc");
    }

    #[test]
    fn free_ticket_is_zeroed() {
        let user = UserProfile::new("u1", "Ada Obi", "ada@example.com");
        let ticket = TicketRecord::issue(
            TicketId::generate(),
            &record(),
            &user,
            PaymentMethod::Free,
            Utc::now(),
        );

        assert_eq!(ticket.ticket_price, 0);
        assert_eq!(ticket.service_fee, 0);
        assert_eq!(ticket.total_amount, 0);
        assert_eq!(ticket.payment_method, PaymentMethod::Free);
    }

    #[test]
    fn checkout_contact_fills_blank_profile() {
        let user = UserProfile::new("u1", "", " ");
        let ticket = TicketRecord::issue(
            TicketId::generate(),
            &record(),
            &user,
            PaymentMethod::Paystack,
            Utc::now(),
        );

        assert_eq!(ticket.attendee_name, "Checkout Name");
        assert_eq!(ticket.attendee_email, "checkout@example.com");
    }

    #[test]
    fn owner_keys_follow_location() {
        let user = UserProfile::new("u1", "Ada", "ada@example.com");
        let ticket = TicketRecord::issue(
            TicketId::generate(),
            &record(),
            &user,
            PaymentMethod::Paystack,
            Utc::now(),
        );

        assert_eq!(TicketLocation::UserHistory.owner_key(&ticket), "u1");
        assert_eq!(TicketLocation::EventAttendees.owner_key(&ticket), "e1");
        assert_eq!(TicketLocation::AdminLedger.owner_key(&ticket), "e1");
    }
}
