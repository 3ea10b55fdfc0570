use std::{fmt, ops::Deref, str::FromStr};

use borsh::BorshSerialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Number of hex characters in a minted identifier.
pub const ID_LENGTH: usize = 8;

/// A short, opaque identifier for a requisition.
///
/// Freshly minted ids are the first eight hex characters of a random v4 UUID.
/// Ids read back from the log are accepted verbatim, as long as they are not
/// blank.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequisitionId(String);

impl RequisitionId {
    /// Mint a new random identifier.
    #[must_use]
    pub fn generate() -> Self {
        let mut simple = Uuid::new_v4().simple().to_string();
        simple.truncate(ID_LENGTH);
        Self(simple)
    }

    /// Creates an identifier from existing text.
    ///
    /// Surrounding whitespace is removed.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidIdError`] if the text is empty or only whitespace.
    pub fn new(s: impl Into<String>) -> Result<Self, InvalidIdError> {
        let s = s.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidIdError(s));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Derive a stable identifier for a record that was stored without one.
    ///
    /// The same position, requester and date always produce the same id, so
    /// reloading an unchanged log yields identical requisitions.
    ///
    /// # Panics
    ///
    /// Panics if borsh serialization fails (which should never happen for this
    /// data structure).
    #[must_use]
    pub fn synthesize(position: usize, requester: &str, date: &str) -> Self {
        #[derive(BorshSerialize)]
        struct LegacyKey<'a> {
            position: u64,
            requester: &'a str,
            date: &'a str,
        }

        let key = LegacyKey {
            position: position as u64,
            requester,
            date,
        };

        let encoded = borsh::to_vec(&key).expect("this should never fail");
        let mut hex = format!("{:x}", Sha256::digest(encoded));
        hex.truncate(ID_LENGTH);
        Self(hex)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for RequisitionId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for RequisitionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequisitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RequisitionId {
    type Err = InvalidIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RequisitionId {
    type Error = InvalidIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Error returned when an identifier is blank.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid requisition id '{0}': must not be blank")]
pub struct InvalidIdError(String);

/// The identifier a requisition is shown with, and where it came from.
///
/// Only [`RecordId::Stored`] ids are used to match records when updating the
/// log. A [`RecordId::Synthesized`] id exists for display and lookup only and
/// is never written back.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordId {
    /// The id was read from, or written to, the log.
    Stored(RequisitionId),
    /// The record has no id on disk; this one was derived when loading.
    Synthesized(RequisitionId),
}

impl RecordId {
    /// The id to show to users, regardless of origin.
    #[must_use]
    pub const fn display(&self) -> &RequisitionId {
        match self {
            Self::Stored(id) | Self::Synthesized(id) => id,
        }
    }

    /// The persisted id, if there is one.
    #[must_use]
    pub const fn stored(&self) -> Option<&RequisitionId> {
        match self {
            Self::Stored(id) => Some(id),
            Self::Synthesized(_) => None,
        }
    }

    /// Whether this id was derived rather than read from the log.
    #[must_use]
    pub const fn is_synthesized(&self) -> bool {
        matches!(self, Self::Synthesized(_))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_short_hex() {
        let id = RequisitionId::generate();
        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(RequisitionId::generate(), RequisitionId::generate());
    }

    #[test]
    fn blank_id_is_rejected() {
        assert!(RequisitionId::new("   ").is_err());
        assert!("".parse::<RequisitionId>().is_err());
    }

    #[test]
    fn stored_id_is_trimmed() {
        let id = RequisitionId::new(" abc123 ").unwrap();
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn synthesized_ids_are_stable() {
        let a = RequisitionId::synthesize(0, "Jane", "2024-05-01 09:30");
        let b = RequisitionId::synthesize(0, "Jane", "2024-05-01 09:30");
        assert_eq!(a, b);
        assert_eq!(a.len(), ID_LENGTH);
    }

    #[test]
    fn synthesized_ids_depend_on_position() {
        let a = RequisitionId::synthesize(0, "Jane", "2024-05-01 09:30");
        let b = RequisitionId::synthesize(1, "Jane", "2024-05-01 09:30");
        assert_ne!(a, b);
    }

    #[test]
    fn only_stored_ids_are_match_keys() {
        let id = RequisitionId::new("abc").unwrap();
        assert_eq!(RecordId::Stored(id.clone()).stored(), Some(&id));
        assert_eq!(RecordId::Synthesized(id.clone()).stored(), None);
        assert_eq!(RecordId::Synthesized(id.clone()).display(), &id);
    }
}
