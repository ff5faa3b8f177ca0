//! Category model
//!
//! Categories classify transactions as income or expense. Two categories may
//! share a name only when their types differ.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;
use crate::error::ValidationError;

/// Maximum category name length in characters
pub const MAX_CATEGORY_NAME_LEN: usize = 50;

/// Whether a category collects income or expenses
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Income,
    Expense,
}

impl CategoryType {
    /// Parse a category type, ignoring case and surrounding whitespace
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transaction category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,

    /// Category name
    pub name: String,

    /// Income or expense
    #[serde(rename = "type")]
    pub kind: CategoryType,

    /// Sort order within its type
    #[serde(default)]
    pub sort_order: i32,

    /// When the category was created
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Create a new category
    pub fn new(name: impl Into<String>, kind: CategoryType) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
            kind,
            sort_order: 0,
            created_at: Utc::now(),
        }
    }

    /// Create a new category with a specific sort order
    pub fn with_sort_order(name: impl Into<String>, kind: CategoryType, sort_order: i32) -> Self {
        let mut category = Self::new(name, kind);
        category.sort_order = sort_order;
        category
    }

    /// Validate the category
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName("Category"));
        }

        let len = self.name.chars().count();
        if len > MAX_CATEGORY_NAME_LEN {
            return Err(ValidationError::NameTooLong {
                entity: "Category",
                len,
                max: MAX_CATEGORY_NAME_LEN,
            });
        }

        Ok(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Categories created for a fresh data directory, in display order
pub const SEED_EXPENSE_CATEGORIES: &[&str] = &[
    "อาหาร",
    "ของใช้",
    "การจราจร",
    "เดท",
    "ทางการแพทย์",
    "ครอบครัว",
    "นันทนาการ",
    "ทางสังคม",
    "ที่อยู่อาศัย",
    "สื่อสาร",
    "อื่นๆ",
];

pub const SEED_INCOME_CATEGORIES: &[&str] =
    &["เงินเดือน", "โบนัส", "ค่าคอมมิชชั่น", "ดอกเบี้ย", "รายได้เสริม"];

/// Build the seed category set
pub fn seed_categories() -> Vec<Category> {
    let expense = SEED_EXPENSE_CATEGORIES
        .iter()
        .enumerate()
        .map(|(i, name)| Category::with_sort_order(*name, CategoryType::Expense, i as i32));
    let income = SEED_INCOME_CATEGORIES
        .iter()
        .enumerate()
        .map(|(i, name)| Category::with_sort_order(*name, CategoryType::Income, i as i32));
    expense.chain(income).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_category() {
        let category = Category::new("อาหาร", CategoryType::Expense);
        assert_eq!(category.name, "อาหาร");
        assert_eq!(category.kind, CategoryType::Expense);
        assert_eq!(category.sort_order, 0);
    }

    #[test]
    fn test_validation() {
        let mut category = Category::new("Food", CategoryType::Expense);
        assert!(category.validate().is_ok());

        category.name = String::new();
        assert_eq!(
            category.validate(),
            Err(ValidationError::EmptyName("Category"))
        );

        // Thai names are measured in characters, not bytes
        category.name = "อ".repeat(50);
        assert!(category.validate().is_ok());
        category.name = "อ".repeat(51);
        assert!(category.validate().is_err());
    }

    #[test]
    fn test_type_parse() {
        assert_eq!(CategoryType::parse(" Income "), Some(CategoryType::Income));
        assert_eq!(CategoryType::parse("EXPENSE"), Some(CategoryType::Expense));
        assert_eq!(CategoryType::parse("transfer"), None);
    }

    #[test]
    fn test_seed_categories() {
        let seeds = seed_categories();
        assert_eq!(seeds.len(), 16);
        assert_eq!(seeds[0].name, "อาหาร");
        assert_eq!(seeds[0].kind, CategoryType::Expense);
        let salary = seeds.iter().find(|c| c.name == "เงินเดือน").unwrap();
        assert_eq!(salary.kind, CategoryType::Income);
        assert_eq!(salary.sort_order, 0);
    }

    #[test]
    fn test_serialization() {
        let category = Category::new("โบนัส", CategoryType::Income);
        let json = serde_json::to_string(&category).unwrap();
        assert!(json.contains(r#""type":"income""#));
        let deserialized: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(category, deserialized);
    }
}
