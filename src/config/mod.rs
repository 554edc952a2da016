//! Configuration management for jira-export.
//!
//! This module handles loading, saving, and managing the profile
//! configuration file. Only non-secret data is written here; API keys are
//! kept in the OS keyring (see [`crate::api::SecretStore`]).

mod profile;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use profile::{LoadedProfile, Profile};

/// Directory name used under the platform config directory.
pub const APP_NAME: &str = "jira-export";

/// Errors raised while reading or writing the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform configuration directory could not be determined.
    #[error("could not determine configuration directory")]
    NoConfigDir,

    /// The configuration directory could not be created.
    #[error("failed to create configuration directory: {0}")]
    CreateDirError(#[source] std::io::Error),

    /// The configuration file exists but could not be read.
    #[error("failed to read configuration file: {0}")]
    ReadError(#[source] std::io::Error),

    /// The configuration file could not be written.
    #[error("failed to write configuration file: {0}")]
    WriteError(#[source] std::io::Error),

    /// The configuration file is not valid TOML or has the wrong shape.
    #[error("failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// A profile failed validation.
    #[error("{0}")]
    ValidationError(String),

    /// No profile with the given id exists.
    #[error("Project with ID '{id}' not found in config. Available projects: {}", available_list(.available))]
    ProfileNotFound {
        /// The id that was looked up.
        id: String,
        /// Ids that do exist.
        available: Vec<String>,
    },
}

fn available_list(available: &[String]) -> String {
    if available.is_empty() {
        "(none)".to_string()
    } else {
        available.join(", ")
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The persisted configuration: named project profiles.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Profiles keyed by their user-chosen id.
    #[serde(default)]
    pub projects: BTreeMap<String, Profile>,
}

impl Config {
    /// Load the configuration from `path`.
    ///
    /// A missing file yields an empty configuration.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(
                "Config file {} does not exist. Returning empty config.",
                path.display()
            );
            return Ok(Self::default());
        }

        debug!("Loading config file {}", path.display());
        let contents = fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::CreateDirError)?;
        }

        debug!("Saving config file {}", path.display());
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(ConfigError::WriteError)
    }

    /// Look up a profile by id.
    pub fn get_profile(&self, id: &str) -> Result<&Profile> {
        self.projects
            .get(id)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                id: id.to_string(),
                available: self.profile_ids(),
            })
    }

    /// Remove a profile by id, returning it.
    pub fn remove_profile(&mut self, id: &str) -> Result<Profile> {
        self.projects
            .remove(id)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                id: id.to_string(),
                available: self.profile_ids(),
            })
    }

    /// Ids of all configured profiles, in sorted order.
    pub fn profile_ids(&self) -> Vec<String> {
        self.projects.keys().cloned().collect()
    }
}

/// Validate a profile id chosen by the user.
pub fn validate_profile_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(ConfigError::ValidationError(
            "project ID cannot be empty".to_string(),
        ));
    }

    if id.contains(char::is_whitespace) {
        return Err(ConfigError::ValidationError(format!(
            "project ID '{}' cannot contain whitespace",
            id
        )));
    }

    Ok(())
}

/// Default location of the configuration file.
///
/// - Linux: `~/.config/jira-export/config.toml`
/// - macOS: `~/Library/Application Support/jira-export/config.toml`
/// - Windows: `C:\Users\<User>\AppData\Roaming\jira-export\config.toml`
pub fn default_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(base.join(APP_NAME).join("config.toml"))
}
