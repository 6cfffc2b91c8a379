use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ClientError;
use crate::models::{CategoryKey, ManagedResource, Task};

/// Operations teardown needs from Prism Central
///
/// Mutating calls return the UUID of the asynchronous task Prism created;
/// callers confirm completion through [`PrismApi::get_task`]. Implementations
/// must be safe to share across sequential stages and attempts.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PrismApi: Send + Sync {
    /// List every VM matching `filter` (empty for all)
    async fn list_vms(&self, filter: &str) -> Result<Vec<ManagedResource>, ClientError>;

    /// Delete a VM, returning the task UUID
    async fn delete_vm(&self, uuid: &str) -> Result<String, ClientError>;

    /// List every image matching `filter` (empty for all)
    async fn list_images(&self, filter: &str) -> Result<Vec<ManagedResource>, ClientError>;

    /// Delete an image, returning the task UUID
    async fn delete_image(&self, uuid: &str) -> Result<String, ClientError>;

    /// List every volume group matching `filter` (empty for all)
    async fn list_volume_groups(&self, filter: &str)
        -> Result<Vec<ManagedResource>, ClientError>;

    /// Delete a volume group, returning the task UUID
    async fn delete_volume_group(&self, uuid: &str) -> Result<String, ClientError>;

    /// Fetch a category key; `NotFound` if it does not exist
    async fn get_category_key(&self, key: &str) -> Result<CategoryKey, ClientError>;

    /// List every value defined under a category key
    async fn list_category_values(&self, key: &str) -> Result<Vec<String>, ClientError>;

    /// Delete one value of a category key
    async fn delete_category_value(&self, key: &str, value: &str) -> Result<(), ClientError>;

    /// Delete a category key; fails remotely while values remain
    async fn delete_category_key(&self, key: &str) -> Result<(), ClientError>;

    /// Fetch the current state of an asynchronous task
    async fn get_task(&self, task_uuid: &str) -> Result<Task, ClientError>;
}
