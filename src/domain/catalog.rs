/// Catalog entry that asks for a free-text item name instead.
pub const OTHER: &str = "Other";

/// The stock items a requisition can be raised for.
///
/// Names are kept in file order and are not deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<String>,
}

impl Catalog {
    /// Creates a catalog from item names.
    #[must_use]
    pub const fn new(items: Vec<String>) -> Self {
        Self { items }
    }

    /// All item names.
    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether `name` is exactly one of the catalog items.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|item| item == name)
    }

    /// Items containing `query` (ignoring case), followed by [`OTHER`] if it
    /// matches too.
    ///
    /// An empty query matches everything.
    #[must_use]
    pub fn suggest(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();
        self.items
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(OTHER))
            .filter(|item| item.to_lowercase().contains(&query))
            .collect()
    }
}

/// The departments a requisition can be raised for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Departments {
    names: Vec<String>,
}

impl Departments {
    /// Creates a department list.
    #[must_use]
    pub const fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// All department names.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Use `default` as the only department when the list is empty.
    #[must_use]
    pub fn or_default_department(self, default: &str) -> Self {
        if self.names.is_empty() {
            Self::new(vec![default.to_string()])
        } else {
            self
        }
    }

    /// Departments starting with `prefix`, ignoring case.
    #[must_use]
    pub fn filter_by_prefix(&self, prefix: &str) -> Vec<&str> {
        let prefix = prefix.to_lowercase();
        self.names
            .iter()
            .filter(|name| name.to_lowercase().starts_with(&prefix))
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            "Gloves".to_string(),
            "Safety Glasses".to_string(),
            "Hard Hat".to_string(),
        ])
    }

    #[test]
    fn suggest_matches_substrings_case_insensitively() {
        assert_eq!(catalog().suggest("gla"), vec!["Safety Glasses"]);
        assert_eq!(catalog().suggest("HAT"), vec!["Hard Hat"]);
    }

    #[test]
    fn suggest_offers_other() {
        assert_eq!(catalog().suggest("oth"), vec![OTHER]);
        assert_eq!(catalog().suggest("").last(), Some(&OTHER));
    }

    #[test]
    fn contains_is_exact() {
        assert!(catalog().contains("Gloves"));
        assert!(!catalog().contains("gloves"));
    }

    #[test]
    fn departments_filter_by_prefix() {
        let departments = Departments::new(vec![
            "Stores".to_string(),
            "Maintenance".to_string(),
            "Marketing".to_string(),
        ]);
        assert_eq!(
            departments.filter_by_prefix("ma"),
            vec!["Maintenance", "Marketing"]
        );
        assert!(departments.filter_by_prefix("x").is_empty());
    }

    #[test]
    fn empty_departments_fall_back_to_default() {
        let departments = Departments::default().or_default_department("General");
        assert_eq!(departments.names(), &["General".to_string()]);

        let kept = Departments::new(vec!["Stores".to_string()]).or_default_department("General");
        assert_eq!(kept.names(), &["Stores".to_string()]);
    }
}
