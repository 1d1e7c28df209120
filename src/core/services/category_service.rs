use crate::domain::{Category, CategoryBreakdown, CategoryTotal, Expense};

pub struct CategoryService;

impl CategoryService {
    /// Sums amounts per category.
    ///
    /// Categories are collected in first-encounter order and then stably
    /// sorted by amount, so among equal sums the category seen first ranks
    /// higher. That ordering is what decides the top category on ties.
    pub fn aggregate<'a, I>(expenses: I) -> CategoryBreakdown
    where
        I: IntoIterator<Item = &'a Expense>,
    {
        let mut sums: Vec<(Category, f64)> = Vec::new();
        for expense in expenses {
            match sums.iter_mut().find(|(category, _)| *category == expense.category) {
                Some((_, amount)) => *amount += expense.amount,
                None => sums.push((expense.category, expense.amount)),
            }
        }

        let total: f64 = sums.iter().map(|(_, amount)| amount).sum();
        sums.sort_by(|a, b| b.1.total_cmp(&a.1));

        let totals = sums
            .into_iter()
            .map(|(category, amount)| CategoryTotal {
                category,
                amount,
                percentage: percentage_of(amount, total),
            })
            .collect();
        CategoryBreakdown { totals, total }
    }

    /// Categories in display order, for pickers and help output.
    pub fn all() -> &'static [Category] {
        &Category::ALL
    }
}

fn percentage_of(amount: f64, total: f64) -> f64 {
    if total > 0.0 {
        amount / total * 100.0
    } else {
        0.0
    }
}
