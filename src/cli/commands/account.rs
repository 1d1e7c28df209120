use dialoguer::{theme::ColorfulTheme, Password};

use crate::cli::commands::{usage_error, CommandDefinition, ParsedArgs};
use crate::cli::core::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::domain::{Displayable, User};

const SIGNIN_USAGE: &str = "signin <email> [password]";
const SIGNUP_USAGE: &str = "signup <email> [password] [--name <name>]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("signin", "Sign in with email", SIGNIN_USAGE, cmd_signin),
        CommandDefinition::new("signup", "Create an account", SIGNUP_USAGE, cmd_signup),
        CommandDefinition::new(
            "google",
            "Continue with Google",
            "google",
            cmd_google,
        ),
        CommandDefinition::new("signout", "Sign out", "signout", cmd_signout),
        CommandDefinition::new(
            "whoami",
            "Show the signed-in profile",
            "whoami",
            cmd_whoami,
        ),
    ]
}

fn cmd_signin(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[], SIGNIN_USAGE)?;
    let email = parsed.positional(0).ok_or_else(|| usage_error(SIGNIN_USAGE))?;
    let password = password_arg(context, parsed.positional(1), SIGNIN_USAGE)?;

    let user = context.auth.sign_in(email, &password)?;
    welcome(user);
    Ok(())
}

fn cmd_signup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["name"], SIGNUP_USAGE)?;
    let email = parsed.positional(0).ok_or_else(|| usage_error(SIGNUP_USAGE))?;
    let password = password_arg(context, parsed.positional(1), SIGNUP_USAGE)?;

    let user = context
        .auth
        .sign_up(email, &password, parsed.option("name"))?;
    welcome(user);
    Ok(())
}

fn cmd_google(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::info("Contacting Google...");
    let user = context.auth.sign_in_with_google()?;
    welcome(user);
    Ok(())
}

fn cmd_signout(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if !context.auth.is_signed_in() {
        output::info("Nobody is signed in.");
        return Ok(());
    }
    context.auth.sign_out()?;
    output::success("Signed out.");
    Ok(())
}

fn cmd_whoami(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    match context.auth.current_user() {
        Some(user) => {
            output::section("Profile");
            output::line(format!("  {}", user.display_label()));
            output::line(format!("  id: {}", user.id));
            if let Some(avatar) = &user.avatar {
                output::line(format!("  avatar: {avatar}"));
            }
        }
        None => output::info("Not signed in. Use `signin`, `signup`, or `google`."),
    }
    Ok(())
}

/// Password from the command line, or a hidden prompt when interactive.
fn password_arg(
    context: &ShellContext,
    given: Option<&str>,
    usage: &str,
) -> Result<String, CommandError> {
    if let Some(password) = given {
        return Ok(password.to_string());
    }
    match context.mode {
        CliMode::Script => Err(usage_error(usage)),
        CliMode::Interactive => Ok(Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Password")
            .interact()?),
    }
}

fn welcome(user: &User) {
    output::success(format!("Welcome, {}!", user.display_name()));
}
