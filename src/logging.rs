//! Logging configuration using the tracing ecosystem.
//!
//! This module configures structured logging with:
//! - Human-readable output on stderr (stdout is reserved for export documents)
//! - A daily rotating debug log file
//! - Environment-based log level configuration

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Default stderr filter if RUST_LOG is not set.
const DEFAULT_LOG_FILTER: &str = "jira_export=info,warn";

/// Stderr filter used with `--verbose`.
const VERBOSE_LOG_FILTER: &str = "jira_export=debug,info";

/// Filter for the log file.
const FILE_LOG_FILTER: &str = "jira_export=debug,warn";

/// Pick the stderr filter directive for the given verbosity.
fn stderr_filter_directive(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    }
}

/// Initialize the logging system.
///
/// Sets up tracing with:
/// - A compact stderr layer at `info` (`debug` when `verbose`), overridable
///   through `RUST_LOG`
/// - A daily rotating file in the user's local data directory at `debug`
///
/// The file layer is skipped when the log directory cannot be created, so a
/// read-only home directory never prevents an export.
///
/// # Log Directory
///
/// - Linux: `~/.local/share/jira-export/logs/`
/// - macOS: `~/Library/Application Support/jira-export/logs/`
/// - Windows: `C:\Users\<User>\AppData\Local\jira-export\logs\`
///
/// # Errors
///
/// Returns an error if the tracing subscriber cannot be set.
pub fn init(verbose: bool) -> anyhow::Result<()> {
    let stderr_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(stderr_filter_directive(verbose)));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time()
        .with_filter(stderr_filter);

    let log_dir = get_log_directory()
        .ok()
        .filter(|dir| std::fs::create_dir_all(dir).is_ok());

    let file_layer = log_dir.as_ref().map(|dir| {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "jira-export.log");
        fmt::layer()
            .with_writer(file_appender)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(EnvFilter::new(FILE_LOG_FILTER))
    });

    let subscriber = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "jira-export starting up");
    if let Some(dir) = &log_dir {
        tracing::debug!(log_dir = %dir.display(), "Log directory");
    }

    Ok(())
}

/// Get the log directory path.
fn get_log_directory() -> anyhow::Result<PathBuf> {
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(base_dir.join("jira-export").join("logs"))
}

/// Get the path where logs are stored.
pub fn log_directory() -> Option<PathBuf> {
    get_log_directory().ok()
}
