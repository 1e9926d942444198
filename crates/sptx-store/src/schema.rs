//! Collection names.
//!
//! The in-memory backend keeps one map per collection and the `RocksDB`
//! backend one column family per collection.

use sptx_core::TicketLocation;

/// Collection names.
pub mod cf {
    /// Reference records, keyed by reference string.
    pub const REFERENCES: &str = "references";

    /// User profiles, keyed by user id.
    pub const USERS: &str = "users";

    /// Referral codes, keyed by code.
    pub const REFERRALS: &str = "referrals";
}

/// Returns all collection names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    let mut names = vec![cf::REFERENCES, cf::USERS, cf::REFERRALS];
    names.extend(TicketLocation::ALL.iter().map(|l| l.collection()));
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_names_are_unique() {
        let mut names = all_column_families();
        let before = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), before);
        assert_eq!(before, 6);
    }
}
