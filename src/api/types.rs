//! JIRA API request and response types.
//!
//! These types model the subset of the JIRA REST API v2 used for exporting:
//! the enhanced JQL search, the approximate issue count and `myself`.

use serde::{Deserialize, Serialize};

/// Issue fields requested from the search endpoint.
pub const EXPORT_FIELDS: [&str; 5] = ["summary", "status", "assignee", "reporter", "description"];

/// The current authenticated user.
///
/// Returned by `GET /rest/api/2/myself`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    /// The user's display name.
    pub display_name: String,
    /// The user's email address (may be hidden).
    #[serde(default)]
    pub email_address: Option<String>,
}

/// Request body for `POST /rest/api/2/search/jql`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest<'a> {
    pub jql: &'a str,
    pub max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<&'a str>,
    pub fields: &'a [&'a str],
}

/// One page of the enhanced JQL search.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    /// Issues on this page, in server order.
    #[serde(default)]
    pub issues: Vec<Issue>,
    /// Continuation token for the following page.
    #[serde(default)]
    pub next_page_token: Option<String>,
    /// Set by the server on the final page.
    #[serde(default)]
    pub is_last: Option<bool>,
}

/// Request body for `POST /rest/api/2/search/approximate-count`.
#[derive(Debug, Clone, Serialize)]
pub struct CountRequest<'a> {
    pub jql: &'a str,
}

/// Response of the approximate count endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApproximateCount {
    pub count: u64,
}

/// A JIRA issue as returned by the search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    /// The issue key (e.g., "PROJ-123").
    pub key: String,
    /// The requested issue fields.
    pub fields: IssueFields,
}

/// The fields carried by an exported issue.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueFields {
    /// The issue summary/title.
    pub summary: String,
    /// The issue status.
    #[serde(default)]
    pub status: Option<Status>,
    /// The issue assignee.
    #[serde(default)]
    pub assignee: Option<User>,
    /// The issue reporter.
    #[serde(default)]
    pub reporter: Option<User>,
    /// The description as plain wiki text.
    #[serde(default)]
    pub description: Option<String>,
}

/// Issue status.
#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    /// The status name (e.g., "To Do", "In Progress", "Done").
    pub name: String,
}

/// A JIRA user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub display_name: String,
}
