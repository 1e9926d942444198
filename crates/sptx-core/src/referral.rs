//! Referral codes and their usage ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{Reference, TicketId};

/// A referral code owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    /// The code itself; primary key.
    pub code: String,
    /// The user who owns the code.
    pub owner_user_id: String,
    /// Number of tickets issued with this code.
    #[serde(default)]
    pub usage_count: u64,
    /// One entry per ticket issued with this code.
    #[serde(default)]
    pub usages: Vec<ReferralUsage>,
}

/// A single use of a referral code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralUsage {
    /// Ticket issued with the code.
    pub ticket_id: TicketId,
    /// User the ticket was issued to.
    pub user_id: String,
    /// Reference the ticket was issued from.
    pub reference: Reference,
    /// When the usage was recorded.
    pub used_at: DateTime<Utc>,
}

impl Referral {
    /// Create an unused referral code.
    #[must_use]
    pub fn new(code: impl Into<String>, owner_user_id: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            owner_user_id: owner_user_id.into(),
            usage_count: 0,
            usages: Vec::new(),
        }
    }

    /// Append a usage and bump the counter.
    ///
    /// Returns `false` without changes when the ticket is already recorded,
    /// so a replayed issuance does not count twice.
    pub fn record(&mut self, usage: ReferralUsage) -> bool {
        if self.usages.iter().any(|u| u.ticket_id == usage.ticket_id) {
            return false;
        }
        self.usages.push(usage);
        self.usage_count += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(ticket: &str) -> ReferralUsage {
        ReferralUsage {
            ticket_id: ticket.parse().unwrap(),
            user_id: "u2".into(),
            reference: "SPTX-REF-1".parse().unwrap(),
            used_at: Utc::now(),
        }
    }

    #[test]
    fn record_counts_each_ticket_once() {
        let mut referral = Referral::new("AMAKA10", "u1");

        assert!(referral.record(usage("SPTX-TX-12A34B5678")));
        assert!(!referral.record(usage("SPTX-TX-12A34B5678")));
        assert!(referral.record(usage("SPTX-TX-98Z76Y5432")));

        assert_eq!(referral.usage_count, 2);
        assert_eq!(referral.usages.len(), 2);
    }
}
