//! Derived reports. Never persisted; recomputed from the record list on every read.

use serde::{Serialize, Serializer};

use crate::domain::category::Category;

/// Label rendered when a month has no spending to rank.
pub const NO_TOP_CATEGORY: &str = "None";

/// Summary shown on the home view for the reference month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    pub total_spent: f64,
    pub expense_count: usize,
    #[serde(serialize_with = "serialize_top_category")]
    pub top_category: Option<Category>,
    pub average_per_day: f64,
}

impl MonthlyStats {
    pub fn top_category_label(&self) -> &'static str {
        self.top_category
            .map(|category| category.label())
            .unwrap_or(NO_TOP_CATEGORY)
    }
}

fn serialize_top_category<S>(value: &Option<Category>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.map(|category| category.label()).unwrap_or(NO_TOP_CATEGORY))
}

/// Spending attributed to one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub amount: f64,
    /// Share of the breakdown total, 0–100.
    pub percentage: f64,
}

/// Per-category sums ordered by amount, largest first.
///
/// Equal sums keep the order in which their categories were first seen.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CategoryBreakdown {
    pub totals: Vec<CategoryTotal>,
    pub total: f64,
}

impl CategoryBreakdown {
    pub fn get(&self, category: Category) -> Option<&CategoryTotal> {
        self.totals.iter().find(|entry| entry.category == category)
    }

    pub fn amount_for(&self, category: Category) -> f64 {
        self.get(category).map(|entry| entry.amount).unwrap_or(0.0)
    }

    /// The highest-spend category, if any spending exists.
    pub fn top(&self) -> Option<Category> {
        self.totals.first().map(|entry| entry.category)
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

/// Everything the analytics view renders for the reference month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub stats: MonthlyStats,
    pub breakdown: CategoryBreakdown,
    pub categories_used: usize,
    pub highest_expense: f64,
}
