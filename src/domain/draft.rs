//! Assembling a new requisition from user input.

use chrono::{DateTime, TimeZone};
use non_empty_string::NonEmptyString;
use nonempty::NonEmpty;

use crate::domain::{Catalog, Item, Requisition, catalog::OTHER};

/// Supplies a free-text item name when a selection is not in the catalog.
pub trait CustomItemSource {
    /// Ask for the real name of an item the user typed as `typed`.
    ///
    /// `typed` is [`OTHER`] when the user explicitly picked "Other". Returning
    /// `None` (or a blank name) drops the line.
    fn custom_item(&mut self, typed: &str) -> Option<String>;
}

impl<F> CustomItemSource for F
where
    F: FnMut(&str) -> Option<String>,
{
    fn custom_item(&mut self, typed: &str) -> Option<String> {
        self(typed)
    }
}

/// One line of the requisition form, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// The chosen or typed item name.
    pub item: String,
    /// The quantity, as entered.
    pub quantity: String,
}

/// Unvalidated form input for a new requisition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    requester: String,
    department: String,
    selections: Vec<Selection>,
}

impl Draft {
    /// Start a draft for `requester` in `department`.
    pub fn new(requester: impl Into<String>, department: impl Into<String>) -> Self {
        Self {
            requester: requester.into(),
            department: department.into(),
            selections: Vec::new(),
        }
    }

    /// Add a line to the draft.
    #[must_use]
    pub fn with_item(mut self, item: impl Into<String>, quantity: impl Into<String>) -> Self {
        self.push(item, quantity);
        self
    }

    /// Add a line to the draft.
    pub fn push(&mut self, item: impl Into<String>, quantity: impl Into<String>) {
        self.selections.push(Selection {
            item: item.into(),
            quantity: quantity.into(),
        });
    }

    /// The lines entered so far.
    #[must_use]
    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    /// Validate the draft and build a pending [`Requisition`] created at
    /// `created`.
    ///
    /// Selections that are [`OTHER`] or not in `catalog` are resolved through
    /// `custom`. Lines left without a name or a quantity are dropped.
    ///
    /// # Errors
    ///
    /// - [`DraftError::MissingRequester`] if the requester is blank. This is
    ///   checked before any item is resolved.
    /// - [`DraftError::NoItems`] if no complete line remains.
    pub fn assemble<C, Tz>(
        self,
        catalog: &Catalog,
        custom: &mut C,
        created: &DateTime<Tz>,
    ) -> Result<Requisition, DraftError>
    where
        C: CustomItemSource + ?Sized,
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let requester = NonEmptyString::new(self.requester.trim().to_string())
            .map_err(|_| DraftError::MissingRequester)?;

        let mut items = Vec::with_capacity(self.selections.len());
        for Selection { item, quantity } in self.selections {
            let item = item.trim();
            let quantity = quantity.trim();

            if item.is_empty() && quantity.is_empty() {
                continue;
            }

            let name = if item == OTHER || !catalog.contains(item) {
                match custom.custom_item(if item.is_empty() { OTHER } else { item }) {
                    Some(name) => name.trim().to_string(),
                    None => continue,
                }
            } else {
                item.to_string()
            };

            if name.is_empty() || quantity.is_empty() {
                tracing::debug!("Dropping incomplete line '{name}' x '{quantity}'");
                continue;
            }

            items.push(Item::new(name, quantity));
        }

        let items = NonEmpty::from_vec(items).ok_or(DraftError::NoItems)?;

        Ok(Requisition::new(
            requester,
            self.department.trim().to_string(),
            items,
            created,
        ))
    }
}

/// Reasons a draft cannot become a requisition.
///
/// The messages are written for the person filling in the form.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DraftError {
    /// No requester was given.
    #[error("Please enter the requester's name.")]
    MissingRequester,
    /// No complete item line was given.
    #[error("Please add at least one item to the requisition.")]
    NoItems,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::domain::Status;

    fn catalog() -> Catalog {
        Catalog::new(vec!["Gloves".to_string(), "Boots".to_string()])
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    fn no_custom(_: &str) -> Option<String> {
        panic!("no custom item expected")
    }

    #[test]
    fn assembles_pending_requisition() {
        let requisition = Draft::new("Jane", "Stores")
            .with_item("Gloves", "10")
            .assemble(&catalog(), &mut no_custom, &now())
            .unwrap();

        assert_eq!(requisition.requester(), "Jane");
        assert_eq!(requisition.department(), "Stores");
        assert_eq!(requisition.status(), Status::Pending);
        assert_eq!(requisition.date(), "2024-05-01 09:30");
        assert_eq!(requisition.items(), &[Item::new("Gloves", "10")]);
    }

    #[test]
    fn blank_requester_is_rejected_before_prompting() {
        let error = Draft::new("  ", "Stores")
            .with_item("Mystery", "1")
            .assemble(&catalog(), &mut no_custom, &now())
            .unwrap_err();
        assert_eq!(error, DraftError::MissingRequester);
    }

    #[test]
    fn empty_item_list_is_rejected() {
        let error = Draft::new("Jane", "Stores")
            .assemble(&catalog(), &mut no_custom, &now())
            .unwrap_err();
        assert_eq!(error, DraftError::NoItems);
    }

    #[test]
    fn lines_without_quantity_are_dropped() {
        let error = Draft::new("Jane", "Stores")
            .with_item("Gloves", "")
            .assemble(&catalog(), &mut no_custom, &now())
            .unwrap_err();
        assert_eq!(error, DraftError::NoItems);
    }

    #[test]
    fn other_is_replaced_with_free_text() {
        let mut asked = Vec::new();
        let mut custom = |typed: &str| {
            asked.push(typed.to_string());
            Some("Ear Plugs".to_string())
        };

        let requisition = Draft::new("Jane", "Stores")
            .with_item(OTHER, "5")
            .with_item("Gloves", "2")
            .assemble(&catalog(), &mut custom, &now())
            .unwrap();

        assert_eq!(asked, vec![OTHER.to_string()]);
        assert_eq!(
            requisition.items(),
            &[Item::new("Ear Plugs", "5"), Item::new("Gloves", "2")]
        );
    }

    #[test]
    fn unknown_items_are_confirmed_through_the_prompt() {
        let mut custom = |typed: &str| Some(format!("{typed} (large)"));

        let requisition = Draft::new("Jane", "")
            .with_item("Overalls", "1")
            .assemble(&catalog(), &mut custom, &now())
            .unwrap();

        assert_eq!(requisition.items(), &[Item::new("Overalls (large)", "1")]);
    }

    #[test]
    fn declined_prompt_drops_the_line() {
        let mut custom = |_: &str| None;

        let error = Draft::new("Jane", "Stores")
            .with_item(OTHER, "5")
            .assemble(&catalog(), &mut custom, &now())
            .unwrap_err();

        assert_eq!(error, DraftError::NoItems);
    }

    #[test]
    fn fully_blank_lines_are_ignored_silently() {
        let requisition = Draft::new("Jane", "Stores")
            .with_item("", "")
            .with_item("Boots", "1")
            .assemble(&catalog(), &mut no_custom, &now())
            .unwrap();

        assert_eq!(requisition.items().len(), 1);
    }
}
