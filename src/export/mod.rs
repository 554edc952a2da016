//! Issue export pipeline.
//!
//! Builds the JQL query for a project, pages through the search results,
//! normalizes every issue into an [`ExportItem`] and renders the collected
//! items as a single TOML or JSON document.

mod paginator;

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::api::{ApiError, Issue};

pub use paginator::{IssueSource, NoProgress, Paginator, ProgressSink, PAGE_SIZE};

/// Errors produced by an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The JIRA API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The collected items could not be serialized.
    #[error("failed to serialize issues: {0}")]
    Serialize(String),
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Serialization format of the export document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Toml,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Toml => write!(f, "toml"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// One exported issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportItem {
    pub key: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&Issue> for ExportItem {
    fn from(issue: &Issue) -> Self {
        let fields = &issue.fields;
        Self {
            key: issue.key.clone(),
            summary: fields.summary.clone(),
            status: fields.status.as_ref().map(|s| s.name.clone()),
            assignee: fields.assignee.as_ref().map(|u| u.display_name.clone()),
            reporter: fields.reporter.as_ref().map(|u| u.display_name.clone()),
            description: fields.description.clone(),
        }
    }
}

/// The serialized document: a single `issues` list.
#[derive(Debug, Serialize, Deserialize)]
struct ExportDocument<T> {
    issues: T,
}

/// Build the JQL query for a project, optionally narrowed by `extra_filter`.
///
/// The filter is inserted verbatim inside parentheses; it must already be
/// valid JQL.
pub fn build_query(project_key: &str, extra_filter: Option<&str>) -> String {
    let query = format!("project=\"{}\"", project_key);
    match extra_filter {
        Some(filter) if !filter.is_empty() => format!("{} and ({})", query, filter),
        _ => query,
    }
}

/// Render items as an export document in `format`.
///
/// JSON output is pretty-printed. The result carries no leading or trailing
/// whitespace.
pub fn render(items: &[ExportItem], format: OutputFormat) -> Result<String> {
    let document = ExportDocument { issues: items };

    let output = match format {
        OutputFormat::Toml => {
            toml::to_string(&document).map_err(|e| ExportError::Serialize(e.to_string()))?
        }
        OutputFormat::Json => serde_json::to_string_pretty(&document)
            .map_err(|e| ExportError::Serialize(e.to_string()))?,
    };

    Ok(output.trim().to_string())
}

/// Export every issue of `project_key` matching `extra_filter`.
///
/// Nothing is rendered until the last page has been fetched; any API failure,
/// including the initial count estimate, aborts the export.
#[instrument(skip(source, progress))]
pub async fn export<S: IssueSource + ?Sized>(
    source: &S,
    progress: &dyn ProgressSink,
    project_key: &str,
    extra_filter: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    let jql = build_query(project_key, extra_filter);
    debug!(jql = %jql, "Exporting issues");

    let paginator = Paginator::new(source, progress);
    let estimate = paginator.estimate_total(&jql).await?;
    debug!("Expecting about {} issues", estimate);

    let issues = paginator.fetch_all(&jql, PAGE_SIZE).await?;
    progress.finish();

    let items: Vec<ExportItem> = issues.iter().map(ExportItem::from).collect();
    debug!("Exported {} issues as {}", items.len(), format);
    render(&items, format)
}
