use std::{fmt, str::FromStr};

use serde::Serialize;

/// Progress of a requisition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    /// Requested but not yet fulfilled.
    #[default]
    Pending,
    /// Fulfilled.
    Completed,
}

impl Status {
    /// The other status.
    ///
    /// Requisitions only ever move between the two states.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Pending => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }

    /// The text written to the log.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseStatusError;

    /// Parses the persisted form, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("pending") {
            Ok(Self::Pending)
        } else if trimmed.eq_ignore_ascii_case("completed") {
            Ok(Self::Completed)
        } else {
            Err(ParseStatusError(s.to_string()))
        }
    }
}

/// Error returned when text is not a known status.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown status '{0}': expected 'Pending' or 'Completed'")]
pub struct ParseStatusError(String);

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("Pending", Status::Pending; "canonical pending")]
    #[test_case("Completed", Status::Completed; "canonical completed")]
    #[test_case(" pending ", Status::Pending; "padded lowercase")]
    #[test_case("COMPLETED", Status::Completed; "uppercase")]
    fn parses(input: &str, expected: Status) {
        assert_eq!(input.parse::<Status>().unwrap(), expected);
    }

    #[test_case(""; "empty")]
    #[test_case("Done"; "unknown word")]
    fn rejects(input: &str) {
        assert!(input.parse::<Status>().is_err());
    }

    #[test]
    fn toggling_twice_is_identity() {
        assert_eq!(Status::Pending.toggled(), Status::Completed);
        assert_eq!(Status::Pending.toggled().toggled(), Status::Pending);
    }

    #[test]
    fn display_matches_persisted_form() {
        assert_eq!(Status::Completed.to_string(), "Completed");
        assert_eq!(Status::default(), Status::Pending);
    }
}
