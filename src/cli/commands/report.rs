use crate::cli::commands::CommandDefinition;
use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::output;
use crate::core::services::{CategoryService, FilterService, SummaryService};
use crate::domain::MonthlyStats;
use crate::utils::format::{format_percentage, month_title, progress_bar};

const BAR_WIDTH: usize = 20;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "stats",
            "Summarize this month's spending",
            "stats",
            cmd_stats,
        ),
        CommandDefinition::new(
            "analytics",
            "Break this month's spending down by category",
            "analytics",
            cmd_analytics,
        ),
        CommandDefinition::new(
            "categories",
            "List expense categories",
            "categories",
            cmd_categories,
        ),
    ]
}

fn cmd_stats(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let today = context.today();
    let stats = SummaryService::monthly_stats(context.store.list(), today);
    output::section(format!("{} Summary", month_title(today)));
    print_stats(context, &stats);
    Ok(())
}

fn cmd_analytics(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.store.is_empty() {
        output::section("No Data Yet");
        output::info("Start adding expenses to see your spending analytics.");
        return Ok(());
    }

    let today = context.today();
    let report = SummaryService::analytics(context.store.list(), today);
    output::section(format!("Analytics for {}", month_title(today)));
    print_stats(context, &report.stats);

    output::section("Spending by Category");
    if report.breakdown.is_empty() {
        output::info("No expenses this month.");
    }
    for entry in &report.breakdown.totals {
        output::line(format!(
            "  {:<20} {:>10}  {} {:>6}",
            entry.category.label(),
            context.money(entry.amount),
            progress_bar(entry.percentage, BAR_WIDTH),
            format_percentage(entry.percentage)
        ));
    }

    output::section("Quick Stats");
    output::line(format!("  Categories used : {}", report.categories_used));
    output::line(format!(
        "  Highest expense : {}",
        context.money(report.highest_expense)
    ));
    Ok(())
}

fn cmd_categories(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let today = context.today();
    let breakdown =
        CategoryService::aggregate(FilterService::current_month(context.store.list(), today));
    output::section("Categories");
    for category in CategoryService::all() {
        output::line(format!(
            "  {:<10} {:<20} {:>10}",
            category.slug(),
            category.label(),
            context.money(breakdown.amount_for(*category))
        ));
    }
    output::hint("Use the short name with `add --category <name>`.");
    Ok(())
}

fn print_stats(context: &ShellContext, stats: &MonthlyStats) {
    output::line(format!("  Total spent     : {}", context.money(stats.total_spent)));
    output::line(format!("  Transactions    : {}", stats.expense_count));
    output::line(format!(
        "  Daily average   : {}",
        context.money(stats.average_per_day)
    ));
    output::line(format!("  Top category    : {}", stats.top_category_label()));
}
