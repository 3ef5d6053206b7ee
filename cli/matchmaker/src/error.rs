//! Error handling and display for the CLI.

use colored::Colorize;
use matchmaker_plan::LoadError;
use matchmaker_remote::RemoteError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration has {count} error(s); nothing was sent to the remote service")]
    Validation { count: usize },

    #[error("Could not process account(s): {}", .accounts.join(", "))]
    AccountsFailed { accounts: Vec<String> },

    #[error("Could not load the game catalog: {0}")]
    Catalog(#[source] RemoteError),

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);

    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        match cli_err {
            CliError::Validation { .. } => {
                eprintln!(
                    "\n{}",
                    "Hint: Fix the errors above, or run with --validate to inspect the plan."
                        .yellow()
                );
            }
            CliError::AccountsFailed { .. } => {
                eprintln!(
                    "\n{}",
                    "Hint: Check the passwords in the users file. Other accounts were processed."
                        .yellow()
                );
            }
            CliError::Catalog(RemoteError::Http(_)) => {
                eprintln!(
                    "\n{}",
                    "Hint: Check your network connection and MATCHMAKER_BASE_URL.".yellow()
                );
            }
            CliError::Load(LoadError::Json { .. }) => {
                eprintln!("\n{}", "Hint: Configuration files must be UTF-8 JSON.".yellow());
            }
            _ => {}
        }
    }
}
