//! jira-export - export JIRA project issues from the terminal.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use jira_export::api::KeyringStore;
use jira_export::cli::{self, Cli, Context, TerminalPrompter};
use jira_export::config;
use jira_export::error::AppError;
use jira_export::logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("warning: failed to initialize logging: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(error = ?e, "Command failed");
            eprintln!("Error: {}", e.user_message());
            if let Some(action) = e.suggested_action() {
                eprintln!("{}", action);
            }
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config_path = match cli.config_file {
        Some(path) => path,
        None => config::default_config_path()?,
    };

    let secrets = KeyringStore;
    let prompter = TerminalPrompter;
    let ctx = Context {
        config_path,
        secrets: &secrets,
        prompter: &prompter,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    cli::run(cli.command, &ctx, &mut out).await
}
