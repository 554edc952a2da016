//! Centralized error types for jira-export.
//!
//! This module provides a unified error hierarchy for the command-line
//! layer with user-friendly messages and exit codes.

use thiserror::Error;

use crate::api::error::ApiError;
use crate::config::ConfigError;
use crate::export::ExportError;

/// Exit status for runtime failures and declined confirmations.
pub const EXIT_FAILURE: i32 = 1;

/// Exit status for usage and configuration errors.
pub const EXIT_USAGE: i32 = 2;

/// The main application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// API-related errors.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Export failures.
    #[error("{0}")]
    Export(#[from] ExportError),

    /// IO errors (terminal, stdout).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The command line was used incorrectly.
    #[error("{0}")]
    Usage(String),

    /// The user cancelled a prompt or declined a confirmation.
    #[error("Aborted.")]
    Aborted,
}

impl AppError {
    /// Create a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        AppError::Usage(msg.into())
    }

    /// Get a user-friendly message for display.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find configuration directory. Pass --config-file explicitly."
                        .to_string()
                }
                ConfigError::CreateDirError(_) => {
                    "Could not create configuration directory. Check file permissions.".to_string()
                }
                ConfigError::ReadError(_) => {
                    "Could not read configuration file. Please check the file is readable."
                        .to_string()
                }
                ConfigError::WriteError(_) => {
                    "Could not save configuration. Please check file permissions.".to_string()
                }
                ConfigError::ParseError(e) => {
                    format!("Configuration file is invalid: {}", e)
                }
                ConfigError::SerializeError(_) => {
                    "Could not save configuration. Internal error.".to_string()
                }
                ConfigError::ValidationError(msg) => msg.clone(),
                ConfigError::ProfileNotFound { .. } => e.to_string(),
            },
            AppError::Api(e) => api_message(e),
            AppError::Export(ExportError::Api(e)) => api_message(e),
            AppError::Export(e) => e.to_string(),
            AppError::Io(e) => format!("A terminal or file operation failed: {}", e),
            AppError::Usage(msg) => msg.clone(),
            AppError::Aborted => "Aborted.".to_string(),
        }
    }

    /// Get a suggested action for the user.
    pub fn suggested_action(&self) -> Option<String> {
        match self {
            AppError::Config(ConfigError::ProfileNotFound { id, .. }) => Some(format!(
                "Use \"jira-export projects add -p {}\" to add it.",
                id
            )),
            AppError::Api(ApiError::Unauthorized)
            | AppError::Export(ExportError::Api(ApiError::Unauthorized)) => Some(
                "Check your API token at https://id.atlassian.com/manage-profile/security/api-tokens"
                    .to_string(),
            ),
            AppError::Api(ApiError::Keyring(_)) => Some(
                "Re-add the project with \"jira-export projects add\" to store its API key."
                    .to_string(),
            ),
            AppError::Api(ApiError::Network(_))
            | AppError::Export(ExportError::Api(ApiError::Network(_))) => {
                Some("Check your internet connection and the project's domain.".to_string())
            }
            _ => None,
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Usage(_)
            | AppError::Config(ConfigError::ValidationError(_))
            | AppError::Config(ConfigError::ProfileNotFound { .. }) => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }
}

fn api_message(e: &ApiError) -> String {
    match e {
        ApiError::Unauthorized => {
            "Authentication failed. Please check your user and API token.".to_string()
        }
        ApiError::Forbidden => {
            "Access denied. You don't have permission to access this project.".to_string()
        }
        ApiError::RateLimited => {
            "Too many requests. Please wait a moment and try again.".to_string()
        }
        ApiError::Network(err) => format!("Connection failed: {}", err),
        other => other.to_string(),
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
