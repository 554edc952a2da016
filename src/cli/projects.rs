//! `projects` commands: list, add, remove and ping profiles.

use std::io::Write;

use tabled::builder::Builder;
use tabled::settings::{Panel, Style};
use tracing::{debug, info};

use super::{AddArgs, Context, ProfileArg, RemoveArgs};
use crate::config::{validate_profile_id, Profile};
use crate::error::{AppError, Result};

/// Print a table of every configured profile.
pub fn list(ctx: &Context<'_>, out: &mut dyn Write) -> Result<()> {
    let config = ctx.load_config()?;

    let mut builder = Builder::default();
    builder.push_record(["ID", "User", "Domain", "Project"]);
    for (id, profile) in &config.projects {
        builder.push_record([
            id.as_str(),
            profile.user.as_str(),
            profile.domain.as_str(),
            profile.project.as_str(),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::rounded()).with(Panel::header("Projects"));
    writeln!(out, "{}", table)?;
    Ok(())
}

/// Add a profile, prompting for anything not given on the command line.
pub fn add(ctx: &Context<'_>, args: AddArgs, out: &mut dyn Write) -> Result<()> {
    let prompter = ctx.prompter;
    let ask = |value: Option<String>, message: &str| match value {
        Some(v) => Ok(v),
        None => prompter.input(message),
    };

    let project_id = ask(args.project_id, "Project id")?;
    validate_profile_id(&project_id)?;

    let user = ask(args.user, "User")?;
    let domain = ask(args.domain, "Domain")?;
    let project = ask(args.project, "Project")?;
    let profile = Profile::new(user, domain, project);
    profile.validate()?;

    let api_key = match args.api_key {
        Some(key) => key,
        None => prompter.secret("Api key")?,
    };

    let mut config = ctx.load_config()?;
    if config.projects.contains_key(&project_id)
        && !args.force
        && !prompter.confirm(&format!(
            "Project ID '{}' already exists. Overwrite?",
            project_id
        ))?
    {
        return Err(AppError::Aborted);
    }

    let previous = config.projects.insert(project_id.clone(), profile.clone());
    ctx.save_config(&config)?;
    profile.set_api_key(ctx.secrets, &api_key)?;

    // Drop the replaced profile's key when it lives under another entry.
    if let Some(old) = previous {
        if old.keyring_service() != profile.keyring_service() || old.user != profile.user {
            old.delete_api_key(ctx.secrets)?;
        }
    }

    info!(project_id = %project_id, "Project added");
    writeln!(out, "Success: Project '{}' added.", project_id)?;
    Ok(())
}

/// Remove a profile and delete its API key.
pub fn remove(ctx: &Context<'_>, args: RemoveArgs, out: &mut dyn Write) -> Result<()> {
    let mut config = ctx.load_config()?;
    let project_id = ctx.resolve_project_id(&config, args.profile.project_id)?;
    config.get_profile(&project_id)?;

    if !args.yes
        && !ctx.prompter.confirm(&format!(
            "Are you sure you want to remove project '{}'?",
            project_id
        ))?
    {
        return Err(AppError::Aborted);
    }

    let profile = config.remove_profile(&project_id)?;
    profile.delete_api_key(ctx.secrets)?;
    ctx.save_config(&config)?;

    info!(project_id = %project_id, "Project removed");
    writeln!(out, "Success: Project '{}' removed.", project_id)?;
    Ok(())
}

/// Authenticate against a profile's domain and report who we are.
pub async fn ping(ctx: &Context<'_>, args: ProfileArg, out: &mut dyn Write) -> Result<()> {
    let config = ctx.load_config()?;
    let project_id = ctx.resolve_project_id(&config, args.project_id)?;
    let profile = config.get_profile(&project_id)?;

    let loaded = profile.load(ctx.secrets)?;
    let client = loaded.client()?;
    debug!(base_url = %client.base_url(), "Pinging");

    let user = client.myself().await.map_err(|e| {
        debug!(project_id = %project_id, error = %e, "Ping failed");
        AppError::Api(e)
    })?;

    writeln!(
        out,
        "Success: Authenticated as '{}' on {}.",
        user.display_name, profile.domain
    )?;
    Ok(())
}
