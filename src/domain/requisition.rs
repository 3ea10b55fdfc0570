use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use non_empty_string::NonEmptyString;
use nonempty::NonEmpty;

use crate::domain::{RecordId, RequisitionId, Status};

/// Format of the `date` field, e.g. `2024-05-01 09:30`.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Render a timestamp the way requisition dates are stored.
#[must_use]
pub fn format_date<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    timestamp.format(DATE_FORMAT).to_string()
}

/// A single requested line: what, and how many.
///
/// The quantity is free text; it is never validated as a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Name of the stock item.
    pub name: String,
    /// Requested quantity, as entered.
    pub quantity: String,
}

impl Item {
    /// Creates a new line.
    pub fn new(name: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
        }
    }
}

/// A request for stock items by a named requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requisition {
    pub(crate) id: RecordId,
    pub(crate) requester: NonEmptyString,
    pub(crate) date: String,
    pub(crate) status: Status,
    pub(crate) department: String,
    pub(crate) items: Vec<Item>,
}

impl Requisition {
    /// Construct a new, pending [`Requisition`] created at `created`.
    ///
    /// A new id is generated. Note that the store mints its own id when the
    /// requisition is appended; use the value it returns from then on.
    #[must_use]
    pub fn new<Tz>(
        requester: NonEmptyString,
        department: String,
        items: NonEmpty<Item>,
        created: &DateTime<Tz>,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Self {
            id: RecordId::Stored(RequisitionId::generate()),
            requester,
            date: format_date(created),
            status: Status::Pending,
            department,
            items: items.into(),
        }
    }

    /// Construct a new, pending [`Requisition`] stamped with the local time.
    #[must_use]
    pub fn new_now(requester: NonEmptyString, department: String, items: NonEmpty<Item>) -> Self {
        Self::new(requester, department, items, &Local::now())
    }

    /// Reassemble a requisition read back from storage.
    pub(crate) fn from_parts(
        id: RecordId,
        requester: NonEmptyString,
        date: String,
        status: Status,
        department: String,
        items: Vec<Item>,
    ) -> Self {
        Self {
            id,
            requester,
            date,
            status,
            department,
            items,
        }
    }

    /// The requisition's identifier.
    #[must_use]
    pub const fn id(&self) -> &RecordId {
        &self.id
    }

    /// Who asked for the items.
    #[must_use]
    pub fn requester(&self) -> &str {
        self.requester.as_str()
    }

    /// When the requisition was created, as stored.
    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    /// The creation date parsed as a timestamp.
    ///
    /// Returns `None` for legacy records whose date is not in [`DATE_FORMAT`].
    #[must_use]
    pub fn created(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(self.date.trim(), DATE_FORMAT).ok()
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Set the status.
    pub const fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    /// Flip between pending and completed, returning the new status.
    pub const fn toggle_status(&mut self) -> Status {
        self.status = self.status.toggled();
        self.status
    }

    /// The requesting department, empty for legacy records.
    #[must_use]
    pub fn department(&self) -> &str {
        &self.department
    }

    /// Requested lines, in the order they were entered.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Case-insensitive substring match against the requester and item names.
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.requester().to_lowercase().contains(&needle)
            || self
                .items
                .iter()
                .any(|item| item.name.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;

    fn sample() -> Requisition {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 45).unwrap();
        Requisition::new(
            NonEmptyString::new("Jane".to_string()).unwrap(),
            "Stores".to_string(),
            NonEmpty::new(Item::new("Gloves", "10")),
            &created,
        )
    }

    #[test]
    fn new_requisitions_are_pending() {
        let requisition = sample();
        assert_eq!(requisition.status(), Status::Pending);
        assert!(!requisition.id().is_synthesized());
    }

    #[test]
    fn date_is_truncated_to_minutes() {
        assert_eq!(sample().date(), "2024-05-01 09:30");
    }

    #[test]
    fn created_parses_stored_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(sample().created(), Some(expected));
    }

    #[test]
    fn created_is_none_for_free_form_dates() {
        let mut requisition = sample();
        requisition.date = "last tuesday".to_string();
        assert_eq!(requisition.created(), None);
    }

    #[test]
    fn toggle_flips_status() {
        let mut requisition = sample();
        assert_eq!(requisition.toggle_status(), Status::Completed);
        assert_eq!(requisition.toggle_status(), Status::Pending);
    }

    #[test]
    fn mentions_searches_requester_and_items() {
        let requisition = sample();
        assert!(requisition.mentions("jan"));
        assert!(requisition.mentions("GLOVE"));
        assert!(!requisition.mentions("boots"));
    }
}
