use std::io;

use chrono::NaiveDate;
use dialoguer::{theme::ColorfulTheme, Confirm};
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use thiserror::Error;

use crate::cli::commands::{all_definitions, CommandDefinition, CommandRegistry};
use crate::cli::output;
use crate::config::{Config, ConfigManager};
use crate::core::services::{
    AuthSession, ExpenseStore, MockCredentialService, MockReceiptScanner, ReceiptScanner,
    ServiceError,
};
use crate::core::SystemClock;
use crate::errors::StorageError;
use crate::storage::JsonFileStore;
use crate::utils::format::format_amount;

/// Flag that answers confirmation prompts in script mode.
pub const ASSUME_YES_FLAG: &str = "--yes";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<ServiceError> for CommandError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Storage(err) => CommandError::Storage(err),
            ServiceError::Invalid(message) => CommandError::InvalidArguments(message),
            ServiceError::Auth(message) => CommandError::Message(message),
        }
    }
}

pub type CommandResult = Result<(), CommandError>;

/// Everything a command handler can reach: the expense list, the signed-in
/// profile, the receipt scanner, and user preferences.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub store: ExpenseStore,
    pub auth: AuthSession,
    pub scanner: Box<dyn ReceiptScanner>,
    pub config: Config,
    pub running: bool,
}

impl ShellContext {
    /// Builds a context backed by JSON files under the application directory.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let manager = ConfigManager::new()?;
        let mut config = match manager.load() {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %err, path = %manager.path().display(), "config unreadable, using defaults");
                Config::default()
            }
        };
        config.apply_env_overrides();

        let data_dir = config.resolve_data_dir(manager.base_dir());
        tracing::debug!(path = %data_dir.display(), "opening data directory");
        let storage = JsonFileStore::new(data_dir)?;

        let store = ExpenseStore::open(Box::new(storage.clone()), Box::new(SystemClock));
        let auth = AuthSession::open(
            Box::new(storage),
            Box::new(MockCredentialService::new(
                config.auth_delay(),
                config.federated_auth_delay(),
            )),
        );
        let scanner = Box::new(MockReceiptScanner::new(config.scan_delay()));

        Ok(Self::with_services(mode, config, store, auth, scanner))
    }

    pub fn with_services(
        mode: CliMode,
        config: Config,
        store: ExpenseStore,
        auth: AuthSession,
        scanner: Box<dyn ReceiptScanner>,
    ) -> Self {
        Self {
            mode,
            registry: CommandRegistry::new(all_definitions()),
            store,
            auth,
            scanner,
            config,
            running: true,
        }
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub fn command(&self, name: &str) -> Option<&CommandDefinition> {
        self.registry.get(name)
    }

    pub fn prompt(&self) -> String {
        match self.auth.current_user() {
            Some(user) => format!("{}@expenses> ", user.display_name()),
            None => "expenses> ".to_string(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.store.today()
    }

    pub fn money(&self, amount: f64) -> String {
        format_amount(amount, &self.config.currency)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let best = self
            .registry
            .names()
            .map(|key| (levenshtein(key, input), key))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = best {
            if distance <= 3 {
                output::info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    /// Asks before a destructive action. Script runs answer through
    /// [`ASSUME_YES_FLAG`] since there is no terminal to prompt on.
    pub(crate) fn confirm(&self, prompt: &str, args: &[&str]) -> Result<bool, CommandError> {
        if args.contains(&ASSUME_YES_FLAG) {
            return Ok(true);
        }
        match self.mode {
            CliMode::Script => {
                output::warning(format!("{prompt} Re-run with `{ASSUME_YES_FLAG}` to confirm."));
                Ok(false)
            }
            CliMode::Interactive => Ok(Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt)
                .default(false)
                .interact()?),
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Exit shell?")
            .default(true)
            .interact()?)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(&message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            other => {
                output::error(other.to_string());
                Ok(())
            }
        }
    }
}
