//! Authentication handling for JIRA API.
//!
//! This module handles authentication with JIRA using Basic Auth
//! (user + API token) and secure token storage via the OS keyring.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use super::error::{ApiError, Result};

/// Authentication credentials for JIRA.
#[derive(Clone)]
pub struct Auth {
    /// The user's email address or username.
    user: String,
    /// The Base64-encoded authorization header value.
    auth_header: String,
}

impl Auth {
    /// Create new authentication credentials from user and token.
    ///
    /// The token is immediately encoded and the raw token is not stored.
    pub fn new(user: &str, token: &str) -> Self {
        let auth_header = build_auth_header(user, token);
        Self {
            user: user.to_string(),
            auth_header,
        }
    }

    /// Get the authorization header value for HTTP requests.
    ///
    /// Returns the complete "Basic ..." header value.
    pub fn header_value(&self) -> &str {
        &self.auth_header
    }

    /// Get the user the credentials belong to.
    pub fn user(&self) -> &str {
        &self.user
    }
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("user", &self.user)
            .field("auth_header", &"<redacted>")
            .finish()
    }
}

/// Build the Basic Auth header value.
///
/// Encodes "user:token" in Base64 and prepends "Basic ".
fn build_auth_header(user: &str, token: &str) -> String {
    let credentials = format!("{}:{}", user, token);
    let encoded = BASE64.encode(credentials.as_bytes());
    format!("Basic {}", encoded)
}

/// Storage for API tokens, keyed by service name and user.
///
/// The production implementation is [`KeyringStore`]; tests substitute an
/// in-memory store so they never touch the real platform keychain.
pub trait SecretStore {
    /// Store a secret, replacing any existing value.
    fn set(&self, service: &str, user: &str, secret: &str) -> Result<()>;

    /// Retrieve a secret. Returns `Ok(None)` when nothing is stored.
    fn get(&self, service: &str, user: &str) -> Result<Option<String>>;

    /// Delete a secret. Returns `Ok(false)` when nothing was stored.
    fn delete(&self, service: &str, user: &str) -> Result<bool>;
}

/// Secret store backed by the OS keyring.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringStore;

impl KeyringStore {
    fn entry(service: &str, user: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(service, user)
            .map_err(|e| ApiError::Keyring(format!("failed to access keyring: {}", e)))
    }
}

impl SecretStore for KeyringStore {
    fn set(&self, service: &str, user: &str, secret: &str) -> Result<()> {
        Self::entry(service, user)?
            .set_password(secret)
            .map_err(|e| ApiError::Keyring(format!("failed to store token: {}", e)))
    }

    fn get(&self, service: &str, user: &str) -> Result<Option<String>> {
        match Self::entry(service, user)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(ApiError::Keyring(format!("failed to retrieve token: {}", e))),
        }
    }

    fn delete(&self, service: &str, user: &str) -> Result<bool> {
        match Self::entry(service, user)?.delete_password() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(ApiError::Keyring(format!("failed to delete token: {}", e))),
        }
    }
}
