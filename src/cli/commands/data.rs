use crate::cli::commands::CommandDefinition;
use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::output;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "export",
            "Export expenses (not available yet)",
            "export",
            cmd_export,
        ),
        CommandDefinition::new(
            "backup",
            "Back up expenses (not available yet)",
            "backup",
            cmd_backup,
        ),
    ]
}

fn cmd_export(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::info("Export feature coming soon!");
    Ok(())
}

fn cmd_backup(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::info("Backup feature coming soon!");
    Ok(())
}
