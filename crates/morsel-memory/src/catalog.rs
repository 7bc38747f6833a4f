//! The three fixed constraint taxonomies.
//!
//! Every catalog pairs a shared dictionary table (canonical names, unique
//! case-insensitively) with a per-user link table holding one boolean flag
//! per (user, entry) key. The enum carries the table and column names so the
//! resolver and upsert code is written once and fanned out.

/// One of the three constraint taxonomies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Catalog {
    /// Foods, flagged safe/unsafe per user.
    Food,
    /// Sensory attributes (texture, smell, ...), flagged problematic per user.
    Sensory,
    /// Health conditions, flagged present per user.
    Condition,
}

impl Catalog {
    /// All catalogs in summary order.
    pub const ALL: [Catalog; 3] = [Catalog::Food, Catalog::Sensory, Catalog::Condition];

    /// Dictionary table holding canonical names.
    pub fn table(&self) -> &'static str {
        match self {
            Catalog::Food => "foods",
            Catalog::Sensory => "sensory_attributes",
            Catalog::Condition => "conditions",
        }
    }

    /// Per-user link table.
    pub fn link_table(&self) -> &'static str {
        match self {
            Catalog::Food => "user_food_preferences",
            Catalog::Sensory => "user_sensory_triggers",
            Catalog::Condition => "user_conditions",
        }
    }

    /// Foreign-key column in the link table pointing at the dictionary.
    pub fn link_column(&self) -> &'static str {
        match self {
            Catalog::Food => "food_id",
            Catalog::Sensory => "attribute_id",
            Catalog::Condition => "condition_id",
        }
    }

    /// Boolean flag column in the link table.
    pub fn flag_column(&self) -> &'static str {
        match self {
            Catalog::Food => "is_safe",
            Catalog::Sensory => "is_problematic",
            Catalog::Condition => "has_condition",
        }
    }

    /// Short name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Catalog::Food => "food",
            Catalog::Sensory => "sensory",
            Catalog::Condition => "condition",
        }
    }
}

impl std::fmt::Display for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_table_names() {
        assert_eq!(Catalog::Food.table(), "foods");
        assert_eq!(Catalog::Sensory.table(), "sensory_attributes");
        assert_eq!(Catalog::Condition.table(), "conditions");
    }

    #[test]
    fn test_catalog_link_shape() {
        for catalog in Catalog::ALL {
            assert!(catalog.link_table().starts_with("user_"));
            assert!(catalog.link_column().ends_with("_id"));
            assert!(!catalog.flag_column().is_empty());
        }
    }

    #[test]
    fn test_catalog_display() {
        assert_eq!(Catalog::Food.to_string(), "food");
    }
}
