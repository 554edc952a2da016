//! jira-export - export JIRA project issues to TOML or JSON.
//!
//! Profiles bind a user, a JIRA domain and a project key; their API keys are
//! kept in the OS keyring. The [`export`] module pages through a project's
//! issues and renders them as a single document.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod progress;
