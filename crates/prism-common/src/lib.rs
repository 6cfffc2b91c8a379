//! Common types for Prism cluster teardown: ownership tags, cluster
//! metadata, credentials, errors, and telemetry setup.

#![deny(missing_docs)]

pub mod credentials;
pub mod error;
pub mod metadata;
pub mod tagging;
pub mod telemetry;

pub use credentials::PrismCredentials;
pub use error::Error;
pub use metadata::{ClusterIdentity, ClusterMetadata, NutanixMetadata};
pub use tagging::OwnershipTag;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Default Prism Central API port
pub const DEFAULT_PRISM_PORT: u16 = 9440;

/// File name of the cluster metadata written by the installer
pub const METADATA_FILE_NAME: &str = "metadata.json";
