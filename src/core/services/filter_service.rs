//! Month scoping and history list queries.

use std::cmp::Ordering;

use chrono::{Datelike, NaiveDate};

use crate::domain::{Category, Expense};

/// Number of records shown in the "recent" slice when not configured.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Ordering applied to the history list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Newest `date` first; records with unparseable dates go last.
    #[default]
    Date,
    /// Largest amount first.
    Amount,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "date" => Some(SortOrder::Date),
            "amount" => Some(SortOrder::Amount),
            _ => None,
        }
    }
}

/// History list options. `category: None` shows every category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryFilter {
    pub category: Option<Category>,
    pub sort: SortOrder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryView<'a> {
    pub expenses: Vec<&'a Expense>,
    pub total: f64,
}

pub struct FilterService;

impl FilterService {
    /// Records dated in the same calendar month and year as `reference`.
    pub fn current_month(expenses: &[Expense], reference: NaiveDate) -> Vec<&Expense> {
        Self::in_month(expenses, reference.year(), reference.month())
    }

    /// Records dated in `year`/`month`. Malformed dates never match.
    pub fn in_month(expenses: &[Expense], year: i32, month: u32) -> Vec<&Expense> {
        expenses
            .iter()
            .filter(|expense| expense.falls_in_month(year, month))
            .collect()
    }

    /// The first `limit` records of the reference month, in list order.
    pub fn recent(expenses: &[Expense], reference: NaiveDate, limit: usize) -> Vec<&Expense> {
        let mut month = Self::current_month(expenses, reference);
        month.truncate(limit);
        month
    }

    /// Applies the category filter and ordering to the full list.
    pub fn history<'a>(expenses: &'a [Expense], filter: &HistoryFilter) -> HistoryView<'a> {
        let mut rows: Vec<&Expense> = expenses
            .iter()
            .filter(|expense| filter.category.map_or(true, |c| expense.category == c))
            .collect();
        match filter.sort {
            SortOrder::Date => rows.sort_by(|a, b| newest_first(a.parsed_date(), b.parsed_date())),
            SortOrder::Amount => rows.sort_by(|a, b| b.amount.total_cmp(&a.amount)),
        }
        let total = rows.iter().map(|expense| expense.amount).sum();
        HistoryView {
            expenses: rows,
            total,
        }
    }
}

fn newest_first(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn expense(id: &str, amount: f64, date: &str, category: Category) -> Expense {
        Expense {
            id: id.into(),
            amount,
            date: date.into(),
            category,
            merchant: None,
            notes: None,
            source: Default::default(),
            created_at: Utc::now(),
        }
    }

    fn sample() -> Vec<Expense> {
        vec![
            expense("a", 12.0, "2024-03-02", Category::Shopping),
            expense("b", 40.0, "2024-02-28", Category::Travel),
            expense("c", 7.5, "bogus", Category::Shopping),
            expense("d", 3.0, "2024-03-10", Category::FoodAndDining),
            expense("e", 9.0, "2023-03-10", Category::FoodAndDining),
        ]
    }

    fn ids(rows: &[&Expense]) -> Vec<String> {
        rows.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn current_month_matches_year_and_month_only() {
        let list = sample();
        let reference = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(ids(&FilterService::current_month(&list, reference)), vec!["a", "d"]);
    }

    #[test]
    fn recent_truncates_in_list_order() {
        let list = sample();
        let reference = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(ids(&FilterService::recent(&list, reference, 1)), vec!["a"]);
    }

    #[test]
    fn history_sorts_by_date_with_malformed_last() {
        let list = sample();
        let view = FilterService::history(&list, &HistoryFilter::default());
        assert_eq!(ids(&view.expenses), vec!["d", "a", "b", "e", "c"]);
        assert!((view.total - 71.5).abs() < 1e-9);
    }

    #[test]
    fn history_filters_category_and_sorts_by_amount() {
        let list = sample();
        let filter = HistoryFilter {
            category: Some(Category::Shopping),
            sort: SortOrder::Amount,
        };
        let view = FilterService::history(&list, &filter);
        assert_eq!(ids(&view.expenses), vec!["a", "c"]);
        assert!((view.total - 19.5).abs() < 1e-9);
    }
}
