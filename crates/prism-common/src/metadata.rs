//! Cluster metadata written by the installer
//!
//! `metadata.json` is the only input teardown needs: the cluster and infra
//! IDs that derive the ownership tag, plus the Prism Central connection.
//!
//! ```json
//! {
//!   "clusterName": "ocp",
//!   "clusterID": "0f4c2b4e-...",
//!   "infraID": "ocp-x7k2p",
//!   "nutanix": {
//!     "prismCentral": "pc.example.com",
//!     "port": "9440",
//!     "username": "admin",
//!     "password": "...",
//!     "insecure": false
//!   }
//! }
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::credentials::PrismCredentials;
use crate::tagging::OwnershipTag;
use crate::{Error, Result, DEFAULT_PRISM_PORT};

/// Identifiers of the cluster being torn down
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterIdentity {
    /// Externally assigned cluster ID
    pub cluster_id: String,
    /// Per-installation infrastructure ID; scopes the ownership tag
    pub infra_id: String,
}

impl ClusterIdentity {
    /// Create an identity from its two IDs
    pub fn new(cluster_id: impl Into<String>, infra_id: impl Into<String>) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            infra_id: infra_id.into(),
        }
    }

    /// The ownership tag derived from the infra ID
    pub fn ownership_tag(&self) -> OwnershipTag {
        OwnershipTag::for_infra_id(&self.infra_id)
    }
}

impl fmt::Display for ClusterIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.infra_id, self.cluster_id)
    }
}

/// Top-level cluster metadata
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterMetadata {
    /// Human readable cluster name
    #[serde(default)]
    pub cluster_name: String,
    /// Cluster ID
    #[serde(rename = "clusterID")]
    pub cluster_id: String,
    /// Infrastructure ID
    #[serde(rename = "infraID")]
    pub infra_id: String,
    /// Nutanix platform section
    pub nutanix: NutanixMetadata,
}

/// Nutanix platform section of the cluster metadata
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutanixMetadata {
    /// Prism Central address
    pub prism_central: String,
    /// Prism Central port, accepted as a JSON string or number
    #[serde(default, deserialize_with = "port_from_string_or_number")]
    pub port: Option<String>,
    /// API username
    #[serde(default)]
    pub username: String,
    /// API password
    #[serde(default)]
    pub password: String,
    /// Skip TLS certificate verification
    #[serde(default)]
    pub insecure: bool,
}

fn port_from_string_or_number<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "port must be a string or number, got {}",
            other
        ))),
    }
}

impl ClusterMetadata {
    /// Read metadata from a file path
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read `metadata.json` from an installer asset directory
    pub fn from_dir(dir: &Path) -> Result<Self> {
        Self::from_file(&dir.join(crate::METADATA_FILE_NAME))
    }

    /// Cluster identity of this metadata
    pub fn identity(&self) -> ClusterIdentity {
        ClusterIdentity::new(&self.cluster_id, &self.infra_id)
    }

    /// Parsed Prism Central port, defaulting to 9440 when absent
    pub fn port(&self) -> Result<u16> {
        match self.nutanix.port.as_deref().map(str::trim) {
            None | Some("") => Ok(DEFAULT_PRISM_PORT),
            Some(raw) => match raw.parse::<u16>() {
                Ok(0) | Err(_) => Err(Error::validation(
                    "nutanix.port",
                    format!("'{}' is not a valid port", raw),
                )),
                Ok(port) => Ok(port),
            },
        }
    }

    /// Check that every field teardown depends on is present
    ///
    /// Credentials are checked after environment overrides are applied, so
    /// this only looks at the identity and endpoint.
    pub fn validate(&self) -> Result<()> {
        if self.infra_id.trim().is_empty() {
            return Err(Error::validation("infraID", "must not be empty"));
        }
        if self.nutanix.prism_central.trim().is_empty() {
            return Err(Error::validation("nutanix.prismCentral", "must not be empty"));
        }
        self.port()?;
        Ok(())
    }

    /// Connection credentials, with environment overrides applied
    pub fn credentials(&self) -> Result<PrismCredentials> {
        self.validate()?;
        let creds =
            PrismCredentials::from_metadata(&self.nutanix, self.port()?).with_env_overrides();
        validate_credentials(&creds)?;
        Ok(creds)
    }
}

/// Check that a username and password are present
pub fn validate_credentials(creds: &PrismCredentials) -> Result<()> {
    if creds.username.trim().is_empty() {
        return Err(Error::validation("nutanix.username", "must not be empty"));
    }
    if creds.password.is_empty() {
        return Err(Error::validation("nutanix.password", "must not be empty"));
    }
    Ok(())
}

impl fmt::Debug for ClusterMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterMetadata")
            .field("cluster_name", &self.cluster_name)
            .field("cluster_id", &self.cluster_id)
            .field("infra_id", &self.infra_id)
            .field("nutanix", &self.nutanix)
            .finish()
    }
}

impl fmt::Debug for NutanixMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NutanixMetadata")
            .field("prism_central", &self.prism_central)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("insecure", &self.insecure)
            .finish()
    }
}
