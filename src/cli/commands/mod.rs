use std::collections::HashMap;

pub mod account;
pub mod data;
pub mod expense;
pub mod report;
pub mod system;

use crate::cli::core::{CommandError, CommandResult, ShellContext, ASSUME_YES_FLAG};

pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    let mut commands = Vec::new();
    commands.extend(system::definitions());
    commands.extend(expense::definitions());
    commands.extend(report::definitions());
    commands.extend(account::definitions());
    commands.extend(data::definitions());
    commands
}

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            commands.insert(definition.name, definition);
        }
        Self { commands, order }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn handler(&self, name: &str) -> Option<CommandHandler> {
        self.commands.get(name).map(|definition| definition.handler)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }
}

/// Positional arguments plus `--flag value` options.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct ParsedArgs<'a> {
    pub positionals: Vec<&'a str>,
    options: Vec<(&'a str, &'a str)>,
}

impl<'a> ParsedArgs<'a> {
    /// Splits `args`, accepting only the flags listed in `allowed` (names
    /// without the leading dashes). `--yes` is always accepted and skipped.
    pub fn parse(args: &[&'a str], allowed: &[&str], usage: &str) -> Result<Self, CommandError> {
        let mut parsed = ParsedArgs::default();
        let mut iter = args.iter().copied();
        while let Some(arg) = iter.next() {
            if arg == ASSUME_YES_FLAG {
                continue;
            }
            let Some(name) = arg.strip_prefix("--") else {
                parsed.positionals.push(arg);
                continue;
            };
            if !allowed.contains(&name) {
                return Err(CommandError::InvalidArguments(format!(
                    "Unknown option `{arg}`. Usage: {usage}"
                )));
            }
            let value = iter.next().ok_or_else(|| {
                CommandError::InvalidArguments(format!("Option `{arg}` needs a value."))
            })?;
            parsed.options.push((name, value));
        }
        Ok(parsed)
    }

    /// Last value given for `name`.
    pub fn option(&self, name: &str) -> Option<&'a str> {
        self.options
            .iter()
            .rev()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    pub fn positional(&self, index: usize) -> Option<&'a str> {
        self.positionals.get(index).copied()
    }
}

pub(crate) fn usage_error(usage: &str) -> CommandError {
    CommandError::InvalidArguments(format!("Usage: {usage}"))
}
