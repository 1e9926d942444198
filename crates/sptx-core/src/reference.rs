//! Reference records.
//!
//! One record exists per payment attempt or free-ticket reservation. It holds
//! the gating status, the immutable ticket snapshot copied at creation time,
//! and the ticket identifier once one has been assigned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};
use crate::ids::{Reference, TicketId};

/// Vendor marker carried by free-ticket references.
pub const FREE_TICKET_VENDOR: &str = "free ticket";

/// Transaction type carried in gateway metadata for ticket purchases.
pub const TICKET_PURCHASE: &str = "ticket purchase";

/// Lifecycle status of a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceStatus {
    /// Awaiting gateway confirmation.
    Pending,
    /// Gateway confirmed the charge.
    Successful,
    /// Gateway reported the charge failed.
    Failed,
    /// Settled without payment (free tickets).
    Settled,
}

impl ReferenceStatus {
    /// The wire name of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Successful => "successful",
            Self::Failed => "failed",
            Self::Settled => "settled",
        }
    }
}

impl fmt::Display for ReferenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event and booking attributes copied into a reference at creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketSnapshot {
    /// Booking user.
    pub user_id: String,
    /// Event being booked.
    pub event_id: String,
    /// Event display name.
    #[serde(default)]
    pub event_name: String,
    /// Ticket tier, e.g. "Regular" or "VIP".
    #[serde(default)]
    pub ticket_type: String,
    /// Ticket price in kobo.
    #[serde(default)]
    pub ticket_price: i64,
    /// Platform fee in kobo.
    #[serde(default)]
    pub service_fee: i64,
    /// Amount charged in kobo.
    #[serde(default)]
    pub total_amount: i64,
    /// Discount code applied at checkout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,
    /// Referral code applied at checkout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,
    /// Venue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_venue: Option<String>,
    /// Event date as displayed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    /// Event start time as displayed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_time: Option<String>,
    /// Contact email given at checkout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booker_email: Option<String>,
    /// Contact name given at checkout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booker_name: Option<String>,
}

impl TicketSnapshot {
    /// Check the fields every reference needs.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MissingField` for an empty user or event id and
    /// `CoreError::InvalidAmount` for negative amounts.
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(CoreError::MissingField("userId"));
        }
        if self.event_id.trim().is_empty() {
            return Err(CoreError::MissingField("eventId"));
        }
        if self.ticket_price < 0 || self.service_fee < 0 || self.total_amount < 0 {
            return Err(CoreError::InvalidAmount(
                "amounts must not be negative".into(),
            ));
        }
        Ok(())
    }

    /// Return a copy with every monetary field set to zero.
    #[must_use]
    pub fn without_charges(mut self) -> Self {
        self.ticket_price = 0;
        self.service_fee = 0;
        self.total_amount = 0;
        self
    }
}

/// Payment metadata reported by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    /// Amount charged in kobo.
    #[serde(default)]
    pub amount: i64,
    /// Currency code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Payment channel (card, bank, ussd...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// When the gateway recorded the payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<String>,
    /// Gateway response message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_response: Option<String>,
    /// Customer email known to the gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
}

/// A per-attempt reference record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceRecord {
    /// Primary key.
    pub reference: Reference,
    /// Gating status.
    pub status: ReferenceStatus,
    /// Snapshot copied at creation time.
    pub ticket: TicketSnapshot,
    /// Vendor marker; `"free ticket"` on the free path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    /// Transaction type from gateway metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<String>,
    /// Assigned at most once by the store.
    #[serde(default)]
    pub ticket_id: Option<TicketId>,
    /// When `ticket_id` was assigned.
    #[serde(default)]
    pub ticket_id_assigned_at: Option<DateTime<Utc>>,
    /// Gateway payment metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentDetails>,
    /// Completion marker set once issuance finishes.
    #[serde(default)]
    pub ticket_generated: bool,
    /// When issuance finished.
    #[serde(default)]
    pub ticket_generated_at: Option<DateTime<Utc>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last changed.
    pub updated_at: DateTime<Utc>,
}

impl ReferenceRecord {
    /// A paid reference awaiting gateway confirmation.
    #[must_use]
    pub fn pending(reference: Reference, ticket: TicketSnapshot) -> Self {
        let now = Utc::now();
        Self {
            reference,
            status: ReferenceStatus::Pending,
            ticket,
            vendor: None,
            transaction_type: Some(TICKET_PURCHASE.to_string()),
            ticket_id: None,
            ticket_id_assigned_at: None,
            payment: None,
            ticket_generated: false,
            ticket_generated_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A free reference, settled at creation with every charge zeroed.
    #[must_use]
    pub fn free(reference: Reference, ticket: TicketSnapshot) -> Self {
        Self {
            status: ReferenceStatus::Settled,
            vendor: Some(FREE_TICKET_VENDOR.to_string()),
            transaction_type: None,
            ..Self::pending(reference, ticket.without_charges())
        }
    }

    /// Whether this record carries the free-ticket vendor marker.
    #[must_use]
    pub fn is_free_ticket(&self) -> bool {
        self.vendor.as_deref() == Some(FREE_TICKET_VENDOR)
    }

    /// Apply a partial update.
    pub fn apply(&mut self, patch: &ReferencePatch, now: DateTime<Utc>) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(payment) = &patch.payment {
            self.payment = Some(payment.clone());
        }
        if let Some(at) = patch.ticket_generated_at {
            self.ticket_generated = true;
            self.ticket_generated_at = Some(at);
        }
        self.updated_at = now;
    }
}

/// A partial update to a reference record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferencePatch {
    /// New status.
    pub status: Option<ReferenceStatus>,
    /// Gateway payment metadata.
    pub payment: Option<PaymentDetails>,
    /// Marks issuance complete at the given time.
    pub ticket_generated_at: Option<DateTime<Utc>>,
}

impl ReferencePatch {
    /// A status transition.
    #[must_use]
    pub fn status(status: ReferenceStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Attach payment metadata.
    #[must_use]
    pub fn with_payment(mut self, payment: PaymentDetails) -> Self {
        self.payment = Some(payment);
        self
    }

    /// The completion marker.
    #[must_use]
    pub fn ticket_generated(at: DateTime<Utc>) -> Self {
        Self {
            ticket_generated_at: Some(at),
            ..Self::default()
        }
    }
}
