//! Cluster ownership tagging convention
//!
//! Every resource the installer creates on Prism Central is tagged with the
//! category `kubernetes-io-cluster-<infraID>`. Teardown has no inventory of
//! what was created, so this tag is the only signal used to decide whether a
//! remote resource belongs to the cluster.

use std::collections::HashMap;

/// Prefix of the ownership category key; the infra ID is appended
pub const CLUSTER_CATEGORY_KEY_PREFIX: &str = "kubernetes-io-cluster-";

/// Category value for resources created exclusively for the cluster
pub const CATEGORY_VALUE_OWNED: &str = "owned";

/// Category value for resources the cluster shares with others
pub const CATEGORY_VALUE_SHARED: &str = "shared";

/// The category key and accepted values that mark a resource as cluster-owned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipTag {
    key: String,
    values: Vec<String>,
}

impl OwnershipTag {
    /// Derive the ownership tag for an infra ID
    pub fn for_infra_id(infra_id: &str) -> Self {
        Self {
            key: category_key(infra_id),
            values: vec![
                CATEGORY_VALUE_OWNED.to_string(),
                CATEGORY_VALUE_SHARED.to_string(),
            ],
        }
    }

    /// The category key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The accepted category values
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Returns true if the category map carries this key with an accepted value
    pub fn matches(&self, categories: &HashMap<String, String>) -> bool {
        categories
            .get(&self.key)
            .is_some_and(|value| self.values.iter().any(|v| v == value))
    }
}

/// Category key for an infra ID
pub fn category_key(infra_id: &str) -> String {
    format!("{}{}", CLUSTER_CATEGORY_KEY_PREFIX, infra_id)
}
