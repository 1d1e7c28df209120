use std::str::FromStr;

use crate::cli::commands::{usage_error, CommandDefinition, ParsedArgs};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::core::services::{
    FilterService, HistoryFilter, ImageRef, ScanOutcome, ScanService, SortOrder,
};
use crate::domain::expense::parse_expense_date;
use crate::domain::{Category, Displayable, Expense, ExpenseDraft};
use crate::utils::format::{month_title, short_date};

const ADD_USAGE: &str =
    "add <amount> [--category <name>] [--date <YYYY-MM-DD>] [--merchant <text>] [--notes <text>]";
const SCAN_USAGE: &str = "scan <image> [--category <name>] [--amount <value>] [--merchant <text>] [--notes <text>]";
const LIST_USAGE: &str = "list [--category <name>|all] [--sort date|amount]";
const DELETE_USAGE: &str = "delete <id> [--yes]";

const SCAN_FAILED: &str = "Could not extract data from the image. Please try again or add manually.";
const SHORT_ID_LEN: usize = 8;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("add", "Record an expense", ADD_USAGE, cmd_add),
        CommandDefinition::new(
            "scan",
            "Scan a receipt image and record it",
            SCAN_USAGE,
            cmd_scan,
        ),
        CommandDefinition::new("list", "Show expense history", LIST_USAGE, cmd_list),
        CommandDefinition::new("history", "Alias for `list`", LIST_USAGE, cmd_list),
        CommandDefinition::new(
            "recent",
            "Show this month's latest expenses",
            "recent",
            cmd_recent,
        ),
        CommandDefinition::new("delete", "Delete an expense", DELETE_USAGE, cmd_delete),
        CommandDefinition::new(
            "clear",
            "Delete every expense",
            "clear [--yes]",
            cmd_clear,
        ),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["category", "date", "merchant", "notes"], ADD_USAGE)?;
    let amount = parsed.positional(0).ok_or_else(|| usage_error(ADD_USAGE))?;

    let mut draft = ExpenseDraft::manual(amount);
    if let Some(category) = parsed.option("category") {
        draft = draft.with_category(parse_category(category)?);
    }
    if let Some(date) = parsed.option("date") {
        if parse_expense_date(date).is_none() {
            return Err(CommandError::InvalidArguments(format!(
                "Invalid date `{date}`. Use YYYY-MM-DD."
            )));
        }
        draft = draft.with_date(date);
    }
    if let Some(merchant) = parsed.option("merchant") {
        draft = draft.with_merchant(merchant);
    }
    if let Some(notes) = parsed.option("notes") {
        draft = draft.with_notes(notes);
    }

    let expense = context.store.add(draft)?;
    announce_added(context, &expense);
    Ok(())
}

fn cmd_scan(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["category", "amount", "merchant", "notes"], SCAN_USAGE)?;
    let image = parsed.positional(0).ok_or_else(|| usage_error(SCAN_USAGE))?;

    output::info("Processing receipt...");
    let outcome = context.scanner.scan(&ImageRef::new(image));
    if let ScanOutcome::Failed { reason } = &outcome {
        tracing::warn!(%reason, "receipt scan failed");
    }
    let Some(mut draft) = ScanService::prefill(&outcome, context.today()) else {
        output::warning(SCAN_FAILED);
        return Ok(());
    };

    if let Some(amount) = parsed.option("amount") {
        draft.amount = amount.to_string();
    }
    if let Some(merchant) = parsed.option("merchant") {
        draft = draft.with_merchant(merchant);
    }
    if let Some(category) = parsed.option("category") {
        draft = draft.with_category(parse_category(category)?);
    }
    if let Some(notes) = parsed.option("notes") {
        draft = draft.with_notes(notes);
    }

    let expense = context.store.add(draft)?;
    announce_added(context, &expense);
    Ok(())
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["category", "sort"], LIST_USAGE)?;
    let mut filter = HistoryFilter::default();
    if let Some(category) = parsed.option("category") {
        if !category.eq_ignore_ascii_case("all") {
            filter.category = Some(parse_category(category)?);
        }
    }
    if let Some(sort) = parsed.option("sort") {
        filter.sort = SortOrder::parse(sort).ok_or_else(|| {
            CommandError::InvalidArguments(format!("Unknown sort `{sort}`. Use `date` or `amount`."))
        })?;
    }

    let view = FilterService::history(context.store.list(), &filter);
    output::section("Expense History");
    if view.expenses.is_empty() {
        output::info("No expenses found.");
        if filter.category.is_some() {
            output::hint("Try `list --category all`.");
        } else {
            output::hint("Start tracking with `add <amount>` or `scan <image>`.");
        }
        return Ok(());
    }

    output::line(format!(
        "{} expense{}  |  Total {}",
        view.expenses.len(),
        if view.expenses.len() == 1 { "" } else { "s" },
        context.money(view.total)
    ));
    print_rows(context, &view.expenses);
    Ok(())
}

fn cmd_recent(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let today = context.today();
    let rows = FilterService::recent(context.store.list(), today, context.config.recent_limit);
    output::section(format!("Recent Expenses ({})", month_title(today)));
    if rows.is_empty() {
        output::info("No expenses this month yet.");
        return Ok(());
    }
    print_rows(context, &rows);
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[], DELETE_USAGE)?;
    let needle = parsed.positional(0).ok_or_else(|| usage_error(DELETE_USAGE))?;

    let id = match resolve_id(context.store.list(), needle)? {
        Some(id) => id,
        None => {
            // Unknown ids are a no-op for the store, so run it anyway.
            context.store.delete(needle)?;
            output::info(format!("No expense matches `{needle}`."));
            return Ok(());
        }
    };

    let prompt = match context.store.get(&id) {
        Some(expense) => format!("Delete {}?", expense.display_label()),
        None => "Are you sure you want to delete this expense?".to_string(),
    };
    if !context.confirm(&prompt, args)? {
        output::info("Delete cancelled.");
        return Ok(());
    }
    if context.store.delete(&id)? {
        output::success("Expense deleted.");
    }
    Ok(())
}

fn cmd_clear(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if context.store.is_empty() {
        output::info("There are no expenses to clear.");
        return Ok(());
    }
    let prompt = format!(
        "This will permanently delete all {} expenses. Continue?",
        context.store.len()
    );
    if !context.confirm(&prompt, args)? {
        output::info("Clear cancelled.");
        return Ok(());
    }
    context.store.clear()?;
    output::success("All expense data has been cleared.");
    Ok(())
}

fn announce_added(context: &ShellContext, expense: &Expense) {
    output::success(format!(
        "Expense added: {} at {} ({}) [{}]",
        context.money(expense.amount),
        expense.merchant_label(),
        expense.category,
        short_id(&expense.id)
    ));
}

fn print_rows(context: &ShellContext, rows: &[&Expense]) {
    for expense in rows {
        let mut row = format!(
            "  {:<8}  {:<8}  {:<22}  {:<20}  {:>10}  {}",
            short_id(&expense.id),
            short_date(&expense.date, expense.parsed_date()),
            expense.merchant_label(),
            expense.category.label(),
            context.money(expense.amount),
            expense.source
        );
        if let Some(notes) = &expense.notes {
            row.push_str(&format!("  ({notes})"));
        }
        output::line(row);
    }
}

fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

fn parse_category(value: &str) -> Result<Category, CommandError> {
    Category::from_str(value).map_err(|err| {
        let known: Vec<_> = Category::ALL.iter().map(|category| category.slug()).collect();
        CommandError::InvalidArguments(format!("{err}. Known: {}", known.join(", ")))
    })
}

/// Exact id, or an unambiguous prefix of one as shown by `list`.
fn resolve_id(expenses: &[Expense], needle: &str) -> Result<Option<String>, CommandError> {
    if needle.trim().is_empty() {
        return Err(usage_error(DELETE_USAGE));
    }
    if expenses.iter().any(|expense| expense.id == needle) {
        return Ok(Some(needle.to_string()));
    }
    let mut matches = expenses.iter().filter(|expense| expense.id.starts_with(needle));
    match (matches.next(), matches.next()) {
        (Some(only), None) => Ok(Some(only.id.clone())),
        (Some(_), Some(_)) => Err(CommandError::InvalidArguments(format!(
            "`{needle}` matches more than one expense. Use a longer id."
        ))),
        (None, _) => Ok(None),
    }
}
