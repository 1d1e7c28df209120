use chrono::{Datelike, NaiveDate};

use crate::domain::{AnalyticsReport, CategoryBreakdown, Expense, MonthlyStats};

use super::{CategoryService, FilterService};

pub struct SummaryService;

impl SummaryService {
    /// Statistics for the calendar month containing `reference`.
    pub fn monthly_stats(expenses: &[Expense], reference: NaiveDate) -> MonthlyStats {
        let month = FilterService::current_month(expenses, reference);
        Self::summarize(&month, reference)
    }

    /// Statistics over an already month-filtered set.
    ///
    /// `average_per_day` divides by the days elapsed so far (the day of month
    /// of `reference`), not by the length of the month.
    pub fn summarize(month: &[&Expense], reference: NaiveDate) -> MonthlyStats {
        let breakdown = CategoryService::aggregate(month.iter().copied());
        Self::stats_from(month, &breakdown, reference)
    }

    /// Statistics plus the category breakdown and quick facts for the month.
    pub fn analytics(expenses: &[Expense], reference: NaiveDate) -> AnalyticsReport {
        let month = FilterService::current_month(expenses, reference);
        let breakdown = CategoryService::aggregate(month.iter().copied());
        let stats = Self::stats_from(&month, &breakdown, reference);
        let highest_expense = month
            .iter()
            .map(|expense| expense.amount)
            .fold(0.0, f64::max);
        AnalyticsReport {
            stats,
            categories_used: breakdown.len(),
            breakdown,
            highest_expense,
        }
    }

    fn stats_from(
        month: &[&Expense],
        breakdown: &CategoryBreakdown,
        reference: NaiveDate,
    ) -> MonthlyStats {
        let total_spent: f64 = month.iter().map(|expense| expense.amount).sum();
        MonthlyStats {
            total_spent,
            expense_count: month.len(),
            top_category: breakdown.top(),
            average_per_day: total_spent / f64::from(reference.day()),
        }
    }
}
