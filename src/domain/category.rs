//! The fixed set of expense categories.

use std::{fmt, str::FromStr};

use serde::{de::Deserializer, Deserialize, Serialize, Serializer};

/// Labels every expense is filed under. Declaration order is the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    FoodAndDining,
    Transportation,
    Shopping,
    Entertainment,
    BillsAndUtilities,
    Healthcare,
    Travel,
    Education,
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::FoodAndDining,
        Category::Transportation,
        Category::Shopping,
        Category::Entertainment,
        Category::BillsAndUtilities,
        Category::Healthcare,
        Category::Travel,
        Category::Education,
        Category::Other,
    ];

    /// Human-facing label, also used as the persisted value.
    pub fn label(&self) -> &'static str {
        match self {
            Category::FoodAndDining => "Food & Dining",
            Category::Transportation => "Transportation",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::BillsAndUtilities => "Bills & Utilities",
            Category::Healthcare => "Healthcare",
            Category::Travel => "Travel",
            Category::Education => "Education",
            Category::Other => "Other",
        }
    }

    /// Short alias accepted on the command line.
    pub fn slug(&self) -> &'static str {
        match self {
            Category::FoodAndDining => "food",
            Category::Transportation => "transport",
            Category::Shopping => "shopping",
            Category::Entertainment => "entertainment",
            Category::BillsAndUtilities => "bills",
            Category::Healthcare => "health",
            Category::Travel => "travel",
            Category::Education => "education",
            Category::Other => "other",
        }
    }

    fn from_value(value: &str) -> Option<Self> {
        let needle = value.trim();
        Category::ALL.into_iter().find(|category| {
            category.label().eq_ignore_ascii_case(needle)
                || category.slug().eq_ignore_ascii_case(needle)
        })
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::ALL[0]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category `{}`", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Category::from_value(value).ok_or_else(|| UnknownCategory(value.trim().to_string()))
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

// Persisted labels outside the known set land in `Other` so one bad row
// cannot fail the whole snapshot.
impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value
            .as_deref()
            .and_then(Category::from_value)
            .unwrap_or(Category::Other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_and_slugs_case_insensitively() {
        assert_eq!(
            "food & dining".parse::<Category>().unwrap(),
            Category::FoodAndDining
        );
        assert_eq!("BILLS".parse::<Category>().unwrap(), Category::BillsAndUtilities);
        assert!("groceries".parse::<Category>().is_err());
    }

    #[test]
    fn serializes_as_label_and_tolerates_unknown_values() {
        let json = serde_json::to_string(&Category::BillsAndUtilities).unwrap();
        assert_eq!(json, "\"Bills & Utilities\"");

        let parsed: Category = serde_json::from_str("\"Pets\"").unwrap();
        assert_eq!(parsed, Category::Other);
    }

    #[test]
    fn default_is_first_category() {
        assert_eq!(Category::default(), Category::FoodAndDining);
    }
}
