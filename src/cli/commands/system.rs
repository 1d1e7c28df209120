use crate::cli::commands::{CommandDefinition, CommandRegistry};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::utils::build_info;

const APP_TITLE: &str = "Monthly Spend Tracker";
const APP_TAGLINE: &str = "Track daily expenses, scan receipts, and see where the month's money went.";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandDefinition::new("version", "Show build metadata", "version", cmd_version),
        CommandDefinition::new("about", "Describe the application", "about", cmd_about),
        CommandDefinition::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output::section(format!("Expense Core {}", meta.version));
    output::info(format!(
        "  Build hash   : {} ({})",
        meta.git_hash, meta.git_status
    ));
    output::info(format!("  Built at     : {}", meta.timestamp));
    output::info(format!("  Target       : {}", meta.target));
    output::info(format!("  Profile      : {}", meta.profile));
    output::info(format!("  Rustc        : {}", meta.rustc));
    Ok(())
}

fn cmd_about(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::section(format!("{APP_TITLE} v{}", build_info::current().version));
    output::line(APP_TAGLINE);
    output::line(format!(
        "  Currency: {}   Locale: {}",
        context.config.currency, context.config.locale
    ));
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first().map(|name| name.to_lowercase()) {
        match context.command(&name) {
            Some(command) => print_command(command),
            None => context.suggest_command(args[0]),
        }
        return Ok(());
    }

    print_overview(&context.registry);
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}

fn print_overview(registry: &CommandRegistry) {
    output::section("Commands");
    let width = registry.names().map(str::len).max().unwrap_or(0);
    for command in registry.iter() {
        output::line(format!(
            "  {:<width$}  {}",
            command.name, command.description
        ));
    }
    output::hint("Type `help <command>` for usage details.");
}

fn print_command(command: &CommandDefinition) {
    output::section(command.name);
    output::line(command.description);
    output::line(format!("  Usage: {}", command.usage));
}
