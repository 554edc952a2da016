//! `export` command.

use std::io::Write;

use tracing::debug;

use super::{Context, ExportArgs};
use crate::error::Result;
use crate::export;
use crate::progress::ProgressBarSink;

/// Export a project's issues to `out`.
///
/// The document is written in one piece after every page has been fetched;
/// progress goes to stderr.
pub async fn run(ctx: &Context<'_>, args: ExportArgs, out: &mut dyn Write) -> Result<()> {
    let config = ctx.load_config()?;
    let project_id = ctx.resolve_project_id(&config, args.profile.project_id)?;
    let profile = config.get_profile(&project_id)?;
    debug!(project_id = %project_id, project = %profile.project, "Resolved project");

    let loaded = profile.load(ctx.secrets)?;
    let client = loaded.client()?;

    let progress = ProgressBarSink::stderr();
    let document = export::export(
        &client,
        &progress,
        &profile.project,
        args.jql.as_deref(),
        args.format,
    )
    .await?;

    writeln!(out, "{}", document)?;
    out.flush()?;
    Ok(())
}
