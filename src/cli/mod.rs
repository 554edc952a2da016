//! Command-line interface for jira-export.
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Resolving which project profile a command acts on
//! - Dispatching to the `projects` and `export` commands

mod export;
mod projects;
mod prompt;

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::api::SecretStore;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::export::OutputFormat;

pub use prompt::{Prompter, TerminalPrompter};

/// Export JIRA project issues to TOML or JSON
#[derive(Parser, Debug)]
#[command(
    name = "jira-export",
    version,
    about = "Export JIRA project issues to TOML or JSON",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file
    #[arg(short = 'c', long = "config-file", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage project profiles
    #[command(subcommand)]
    #[command(alias = "project")]
    Projects(ProjectsCommand),

    /// Export the issues of a project
    Export(ExportArgs),
}

/// `projects` subcommands.
#[derive(Subcommand, Debug)]
pub enum ProjectsCommand {
    /// List configured projects
    List,

    /// Add or replace a project profile
    Add(AddArgs),

    /// Remove a project profile and its stored API key
    Remove(RemoveArgs),

    /// Check that a project's domain and credentials work
    Ping(ProfileArg),
}

/// Selects a configured project profile.
#[derive(Args, Debug, Default)]
pub struct ProfileArg {
    /// Unique project ID (prompted for when omitted)
    #[arg(short = 'p', long = "project-id", value_name = "ID")]
    pub project_id: Option<String>,
}

/// Arguments of `projects add`.
#[derive(Args, Debug, Default)]
pub struct AddArgs {
    /// Unique project ID
    #[arg(short = 'p', long = "project-id", value_name = "ID")]
    pub project_id: Option<String>,

    /// JIRA username/email
    #[arg(short = 'u', long)]
    pub user: Option<String>,

    /// JIRA domain (e.g., example.atlassian.net)
    #[arg(short = 'd', long)]
    pub domain: Option<String>,

    /// JIRA project key (e.g., PROJ)
    #[arg(short = 'P', long)]
    pub project: Option<String>,

    /// JIRA API token (will be stored securely)
    #[arg(short = 'k', long = "api-key", value_name = "TOKEN")]
    pub api_key: Option<String>,

    /// Overwrite an existing project without asking
    #[arg(long)]
    pub force: bool,
}

/// Arguments of `projects remove`.
#[derive(Args, Debug, Default)]
pub struct RemoveArgs {
    #[command(flatten)]
    pub profile: ProfileArg,

    /// Remove without asking for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments of `export`.
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    #[command(flatten)]
    pub profile: ProfileArg,

    /// Jira Query Language (JQL) query to filter issues
    #[arg(short = 'j', long)]
    pub jql: Option<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, ignore_case = true, default_value_t = OutputFormat::Toml)]
    pub format: OutputFormat,
}

/// Everything a command needs besides its arguments.
pub struct Context<'a> {
    /// Path of the TOML profile configuration.
    pub config_path: PathBuf,
    /// Where API keys are stored.
    pub secrets: &'a dyn SecretStore,
    /// Answers interactive questions.
    pub prompter: &'a dyn Prompter,
}

impl Context<'_> {
    /// Load the configuration file.
    pub fn load_config(&self) -> Result<Config> {
        Ok(Config::load(&self.config_path)?)
    }

    /// Save the configuration file.
    pub fn save_config(&self, config: &Config) -> Result<()> {
        Ok(config.save(&self.config_path)?)
    }

    /// Use the given project id, or ask the user to pick a configured one.
    pub fn resolve_project_id(&self, config: &Config, project_id: Option<String>) -> Result<String> {
        if let Some(id) = project_id {
            return Ok(id);
        }

        let choices = config.profile_ids();
        if choices.is_empty() {
            return Err(AppError::usage(
                "No projects configured. Run 'jira-export projects add' first.",
            ));
        }

        self.prompter
            .select("Select a project", &choices)?
            .ok_or(AppError::Aborted)
    }
}

/// Run a parsed command, writing its output to `out`.
pub async fn run(command: Commands, ctx: &Context<'_>, out: &mut dyn Write) -> Result<()> {
    match command {
        Commands::Projects(ProjectsCommand::List) => projects::list(ctx, out),
        Commands::Projects(ProjectsCommand::Add(args)) => projects::add(ctx, args, out),
        Commands::Projects(ProjectsCommand::Remove(args)) => projects::remove(ctx, args, out),
        Commands::Projects(ProjectsCommand::Ping(args)) => projects::ping(ctx, args, out).await,
        Commands::Export(args) => export::run(ctx, args, out).await,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use clap::CommandFactory;
    use tempfile::TempDir;

    use super::prompt::tests::ScriptedPrompter;
    use super::*;
    use crate::api::MemoryStore;
    use crate::config::Profile;

    pub(crate) fn write_config(dir: &TempDir, ids: &[&str]) -> PathBuf {
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        for id in ids {
            config.projects.insert(
                id.to_string(),
                Profile::new(
                    format!("{}@example.com", id),
                    format!("{}.atlassian.net", id),
                    id.to_uppercase(),
                ),
            );
        }
        config.save(&path).unwrap();
        path
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_export_defaults_to_toml() {
        let cli = Cli::try_parse_from(["jira-export", "export", "-p", "alpha"]).unwrap();
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.profile.project_id.as_deref(), Some("alpha"));
                assert_eq!(args.format, OutputFormat::Toml);
                assert!(args.jql.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_export_format_case_insensitive() {
        let cli = Cli::try_parse_from([
            "jira-export",
            "export",
            "--format",
            "JSON",
            "--jql",
            "status=Open",
        ])
        .unwrap();
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.format, OutputFormat::Json);
                assert_eq!(args.jql.as_deref(), Some("status=Open"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_format() {
        let err = Cli::try_parse_from(["jira-export", "export", "-f", "yaml"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_parse_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "jira-export",
            "projects",
            "list",
            "--config-file",
            "/tmp/c.toml",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config_file, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn test_project_alias() {
        let cli = Cli::try_parse_from(["jira-export", "project", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Projects(ProjectsCommand::List)
        ));
    }

    #[test]
    fn test_resolve_project_id_uses_given_value() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::default();
        let prompter = ScriptedPrompter::default();
        let ctx = Context {
            config_path: write_config(&dir, &["alpha"]),
            secrets: &store,
            prompter: &prompter,
        };

        let config = ctx.load_config().unwrap();
        let id = ctx
            .resolve_project_id(&config, Some("alpha".to_string()))
            .unwrap();
        assert_eq!(id, "alpha");
        assert!(prompter.asked.borrow().is_empty());
    }

    #[test]
    fn test_resolve_project_id_prompts_with_choices() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::default();
        let prompter = ScriptedPrompter::selecting(Some("bravo"));
        let ctx = Context {
            config_path: write_config(&dir, &["alpha", "bravo"]),
            secrets: &store,
            prompter: &prompter,
        };

        let config = ctx.load_config().unwrap();
        let id = ctx.resolve_project_id(&config, None).unwrap();
        assert_eq!(id, "bravo");
        assert_eq!(
            prompter.asked.borrow()[0],
            "Select a project [\"alpha\", \"bravo\"]"
        );
    }

    #[test]
    fn test_resolve_project_id_without_projects() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::default();
        let prompter = ScriptedPrompter::default();
        let ctx = Context {
            config_path: dir.path().join("config.toml"),
            secrets: &store,
            prompter: &prompter,
        };

        let config = ctx.load_config().unwrap();
        let err = ctx.resolve_project_id(&config, None).unwrap_err();
        assert!(matches!(err, AppError::Usage(_)));
        assert!(err.user_message().contains("No projects configured"));
    }

    #[test]
    fn test_resolve_project_id_cancelled() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::default();
        let prompter = ScriptedPrompter::selecting(None);
        let ctx = Context {
            config_path: write_config(&dir, &["alpha"]),
            secrets: &store,
            prompter: &prompter,
        };

        let config = ctx.load_config().unwrap();
        assert!(matches!(
            ctx.resolve_project_id(&config, None),
            Err(AppError::Aborted)
        ));
    }
}
