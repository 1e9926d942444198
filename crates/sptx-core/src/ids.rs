//! Identifier types for SPTX.
//!
//! References name one payment or free-ticket attempt and carry their kind in
//! the prefix. Ticket identifiers are short, human-readable strings minted from
//! randomness.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix of references created by payment initialization.
pub const PAID_REFERENCE_PREFIX: &str = "SPTX-REF-";

/// Prefix of references created by free-ticket reservation.
pub const FREE_REFERENCE_PREFIX: &str = "SPTX-FREE-";

/// Prefix of every generated ticket identifier.
pub const TICKET_ID_PREFIX: &str = "SPTX-TX-";

/// Number of decimal digits in a ticket identifier body.
const TICKET_ID_DIGITS: usize = 8;

/// Length of the random suffix appended to generated references.
const REFERENCE_SUFFIX_LEN: usize = 16;

/// Which issuance path a reference belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    /// Paid ticket, confirmed through the payment gateway.
    Paid,
    /// Free ticket, settled at reservation time.
    Free,
}

impl ReferenceKind {
    /// The string prefix carried by references of this kind.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Paid => PAID_REFERENCE_PREFIX,
            Self::Free => FREE_REFERENCE_PREFIX,
        }
    }
}

/// A payment/ticket reference such as `SPTX-REF-...` or `SPTX-FREE-...`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Reference(String);

impl Reference {
    /// Generate a fresh reference of the given kind.
    #[must_use]
    pub fn generate(kind: ReferenceKind) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
        Self(format!(
            "{}{}",
            kind.prefix(),
            &suffix[..REFERENCE_SUFFIX_LEN]
        ))
    }

    /// Parse a reference and require a specific kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or does not carry the prefix of
    /// `kind` followed by at least one character.
    pub fn parse_kind(value: &str, kind: ReferenceKind) -> Result<Self, IdError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(IdError::EmptyReference);
        }
        match value.strip_prefix(kind.prefix()) {
            Some(rest) if !rest.is_empty() => Ok(Self(value.to_string())),
            _ => Err(IdError::InvalidReference {
                expected: kind.prefix(),
            }),
        }
    }

    /// The kind of this reference, derived from its prefix.
    #[must_use]
    pub fn kind(&self) -> ReferenceKind {
        if self.0.starts_with(FREE_REFERENCE_PREFIX) {
            ReferenceKind::Free
        } else {
            ReferenceKind::Paid
        }
    }

    /// The reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Reference {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_kind(s, ReferenceKind::Paid)
            .or_else(|_| Self::parse_kind(s, ReferenceKind::Free))
            .map_err(|e| match e {
                IdError::EmptyReference => e,
                _ => IdError::InvalidReference { expected: "SPTX-" },
            })
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reference({})", self.0)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Reference {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Reference> for String {
    fn from(reference: Reference) -> Self {
        reference.0
    }
}

impl AsRef<[u8]> for Reference {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// A ticket identifier of the shape `SPTX-TX-<digits><L><digits><L><digits>`.
///
/// The body holds 8 random decimal digits with 2 random uppercase letters
/// inserted at two split points. The first run always has at least 2 digits.
/// Uniqueness across references is probabilistic only; uniqueness per
/// reference comes from the store's transactional assignment.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    /// Generate a ticket identifier using the thread-local RNG.
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Generate a ticket identifier from the given RNG.
    pub fn generate_with<R: Rng>(rng: &mut R) -> Self {
        let digits: String = (0..TICKET_ID_DIGITS)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        let first = char::from(rng.gen_range(b'A'..=b'Z'));
        let second = char::from(rng.gen_range(b'A'..=b'Z'));

        let split_a = rng.gen_range(2..=6);
        let split_b = rng.gen_range(split_a..=TICKET_ID_DIGITS);

        Self(format!(
            "{TICKET_ID_PREFIX}{}{first}{}{second}{}",
            &digits[..split_a],
            &digits[split_a..split_b],
            &digits[split_b..],
        ))
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `value` has the shape of a generated ticket identifier.
    #[must_use]
    pub fn is_well_formed(value: &str) -> bool {
        let Some(body) = value.strip_prefix(TICKET_ID_PREFIX) else {
            return false;
        };
        let bytes = body.as_bytes();
        let digits = bytes.iter().filter(|b| b.is_ascii_digit()).count();
        let letters = bytes.iter().filter(|b| b.is_ascii_uppercase()).count();

        bytes.len() == TICKET_ID_DIGITS + 2
            && digits == TICKET_ID_DIGITS
            && letters == 2
            && bytes[..2].iter().all(u8::is_ascii_digit)
    }
}

impl FromStr for TicketId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if Self::is_well_formed(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(IdError::InvalidTicketId(s.to_string()))
        }
    }
}

impl fmt::Debug for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TicketId({})", self.0)
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The reference is empty.
    #[error("reference is required")]
    EmptyReference,

    /// The reference does not carry the expected prefix.
    #[error("Invalid reference format. Expected a reference starting with {expected}")]
    InvalidReference {
        /// The expected prefix.
        expected: &'static str,
    },

    /// The ticket identifier is malformed.
    #[error("invalid ticket identifier: {0}")]
    InvalidTicketId(String),
}
