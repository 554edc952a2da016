//! JIRA project profiles.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ConfigError, Result};
use crate::api::{self, ApiError, Auth, JiraClient, SecretStore};

/// Prefix of every keyring service name written by this tool.
const KEYRING_PREFIX: &str = "jira-export";

/// A stored JIRA project profile.
///
/// Profiles hold the connection details for one project on a JIRA instance.
/// API keys are never written to the config file; they live in the OS
/// keychain and are attached by [`Profile::load`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// The user's email address, used for Basic Auth.
    pub user: String,

    /// The JIRA domain without scheme (e.g., "company.atlassian.net").
    pub domain: String,

    /// The JIRA project key (e.g., "PROJ").
    pub project: String,
}

impl Profile {
    /// Create a new profile.
    pub fn new(user: String, domain: String, project: String) -> Self {
        Self {
            user,
            domain,
            project,
        }
    }

    /// Validate this profile.
    ///
    /// Checks that every field is non-empty and that the domain is a bare
    /// host name rather than a URL.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` with details if validation fails.
    pub fn validate(&self) -> Result<()> {
        if self.user.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "user cannot be empty".to_string(),
            ));
        }

        if self.domain.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "domain cannot be empty".to_string(),
            ));
        }

        if self.domain.starts_with("http://") || self.domain.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "Domain should not include http:// or https:// (got '{}')",
                self.domain
            )));
        }

        if self.domain.contains('/') || self.domain.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "'{}' is not a valid domain name",
                self.domain
            )));
        }

        if self.project.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "project key cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the keyring service name for this profile's API key.
    pub fn keyring_service(&self) -> String {
        format!("{}-{}-{}", KEYRING_PREFIX, self.domain, self.project)
    }

    /// Store an API key for this profile.
    pub fn set_api_key(&self, store: &dyn SecretStore, api_key: &str) -> api::error::Result<()> {
        store.set(&self.keyring_service(), &self.user, api_key)
    }

    /// Remove this profile's API key. A missing key is not an error.
    pub fn delete_api_key(&self, store: &dyn SecretStore) -> api::error::Result<()> {
        if !store.delete(&self.keyring_service(), &self.user)? {
            debug!(
                service = %self.keyring_service(),
                "No API key stored during deletion"
            );
        }
        Ok(())
    }

    /// Attach the stored API key, producing a profile that can talk to JIRA.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Keyring` if no key is stored for this profile.
    pub fn load(&self, store: &dyn SecretStore) -> api::error::Result<LoadedProfile> {
        let api_key = store
            .get(&self.keyring_service(), &self.user)?
            .ok_or_else(|| {
                ApiError::Keyring(format!(
                    "API key for '{}' not found in keyring",
                    self.keyring_service()
                ))
            })?;

        Ok(LoadedProfile::new(self.clone(), &api_key))
    }
}

/// A profile with its credentials attached.
///
/// Only a loaded profile can create a [`JiraClient`].
#[derive(Debug, Clone)]
pub struct LoadedProfile {
    profile: Profile,
    auth: Auth,
}

impl LoadedProfile {
    /// Attach an API key to a profile.
    pub fn new(profile: Profile, api_key: &str) -> Self {
        let auth = Auth::new(&profile.user, api_key);
        Self { profile, auth }
    }

    /// The underlying stored profile.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Create an authenticated client for this profile's domain.
    pub fn client(&self) -> api::error::Result<JiraClient> {
        debug!(project = %self.profile.project, "Creating JIRA client for project");
        JiraClient::for_domain(&self.profile.domain, self.auth.clone())
    }

    /// Drop the credentials, returning the storable profile.
    pub fn unload(self) -> Profile {
        self.profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryStore;

    fn sample() -> Profile {
        Profile::new(
            "test@example.com".to_string(),
            "test.atlassian.net".to_string(),
            "TEST".to_string(),
        )
    }

    #[test]
    fn test_valid_profile() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_domain_with_scheme_rejected() {
        let mut profile = sample();
        profile.domain = "https://test.atlassian.net".to_string();

        let result = profile.validate();
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Domain should not include"));
    }

    #[test]
    fn test_domain_with_path_rejected() {
        let mut profile = sample();
        profile.domain = "test.atlassian.net/jira".to_string();
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_empty_user_rejected() {
        let mut profile = sample();
        profile.user = "".to_string();
        assert!(profile
            .validate()
            .unwrap_err()
            .to_string()
            .contains("user cannot be empty"));
    }

    #[test]
    fn test_empty_project_rejected() {
        let mut profile = sample();
        profile.project = " ".to_string();
        assert!(profile
            .validate()
            .unwrap_err()
            .to_string()
            .contains("project key cannot be empty"));
    }

    #[test]
    fn test_keyring_service() {
        assert_eq!(
            sample().keyring_service(),
            "jira-export-test.atlassian.net-TEST"
        );
    }

    #[test]
    fn test_set_api_key_uses_service_and_user() {
        let store = MemoryStore::default();
        sample().set_api_key(&store, "secret").unwrap();

        let secrets = store.secrets.borrow();
        let key = (
            "jira-export-test.atlassian.net-TEST".to_string(),
            "test@example.com".to_string(),
        );
        assert_eq!(secrets.get(&key).map(String::as_str), Some("secret"));
    }

    #[test]
    fn test_load_attaches_api_key() {
        let store = MemoryStore::default();
        let profile = sample();
        profile.set_api_key(&store, "secret").unwrap();

        let loaded = profile.load(&store).unwrap();
        assert_eq!(loaded.profile(), &profile);
        let client = loaded.client().unwrap();
        assert_eq!(client.base_url(), "https://test.atlassian.net");
    }

    #[test]
    fn test_load_without_api_key_fails() {
        let store = MemoryStore::default();
        let err = sample().load(&store).unwrap_err();
        assert!(matches!(err, ApiError::Keyring(_)));
        assert!(err.to_string().contains("not found in keyring"));
    }

    #[test]
    fn test_delete_missing_api_key_is_ok() {
        let store = MemoryStore::default();
        assert!(sample().delete_api_key(&store).is_ok());
    }

    #[test]
    fn test_unload_returns_profile() {
        let loaded = LoadedProfile::new(sample(), "secret");
        let debug_output = format!("{:?}", loaded);
        assert!(!debug_output.contains("secret"));
        assert_eq!(loaded.unload(), sample());
    }

    #[test]
    fn test_profile_serialization() {
        let profile = sample();
        let toml_str = toml::to_string(&profile).unwrap();
        let parsed: Profile = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed, profile);
        assert!(!toml_str.contains("api_key"));
    }
}
