//! Prism Central connection credentials
//!
//! Assembled from the cluster metadata file, with the username and password
//! optionally overridden from the environment so secrets need not stay on
//! disk after install.

use std::fmt;

use crate::metadata::NutanixMetadata;

/// Environment variable overriding the Prism Central username
pub const USERNAME_ENV: &str = "NUTANIX_USERNAME";

/// Environment variable overriding the Prism Central password
pub const PASSWORD_ENV: &str = "NUTANIX_PASSWORD";

/// Connection parameters for a Prism Central endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct PrismCredentials {
    /// Prism Central address (hostname or IP, optionally with scheme)
    pub endpoint: String,
    /// Prism Central API port
    pub port: u16,
    /// API username
    pub username: String,
    /// API password
    pub password: String,
    /// Skip TLS certificate verification
    pub insecure: bool,
}

impl PrismCredentials {
    /// Build credentials from validated cluster metadata
    pub fn from_metadata(nutanix: &NutanixMetadata, port: u16) -> Self {
        Self {
            endpoint: nutanix.prism_central.clone(),
            port,
            username: nutanix.username.clone(),
            password: nutanix.password.clone(),
            insecure: nutanix.insecure,
        }
    }

    /// Replace username/password with `NUTANIX_USERNAME`/`NUTANIX_PASSWORD` when set
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(USERNAME_ENV).ok(),
            std::env::var(PASSWORD_ENV).ok(),
        )
    }

    /// Replace username/password with the given values when present and non-empty
    pub fn with_overrides(mut self, username: Option<String>, password: Option<String>) -> Self {
        if let Some(username) = username.filter(|u| !u.is_empty()) {
            self.username = username;
        }
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            self.password = password;
        }
        self
    }

    /// Base URL of the Prism Central API, defaulting to https
    pub fn base_url(&self) -> String {
        let endpoint = self.endpoint.trim_end_matches('/');
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            format!("{}:{}", endpoint, self.port)
        } else {
            format!("https://{}:{}", endpoint, self.port)
        }
    }
}

impl fmt::Debug for PrismCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrismCredentials")
            .field("endpoint", &self.endpoint)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("insecure", &self.insecure)
            .finish()
    }
}
