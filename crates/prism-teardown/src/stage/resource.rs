//! Cleanup of listable entities: VMs, images and volume groups

use async_trait::async_trait;
use prism_client::{ClientError, ManagedResource, PrismApi, EMPTY_FILTER};
use prism_common::OwnershipTag;
use tracing::{debug, info, warn};

use super::{CleanupStage, StageContext};
use crate::{Error, Result};

/// A kind of entity deleted through an asynchronous task
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    Vm,
    Image,
    VolumeGroup,
}

impl ResourceKind {
    pub fn stage_name(self) -> &'static str {
        match self {
            ResourceKind::Vm => "vms",
            ResourceKind::Image => "images",
            ResourceKind::VolumeGroup => "volume_groups",
        }
    }

    fn noun(self) -> &'static str {
        match self {
            ResourceKind::Vm => "VM",
            ResourceKind::Image => "image",
            ResourceKind::VolumeGroup => "volume group",
        }
    }

    async fn list(
        self,
        api: &dyn PrismApi,
    ) -> std::result::Result<Vec<ManagedResource>, ClientError> {
        match self {
            ResourceKind::Vm => api.list_vms(EMPTY_FILTER).await,
            ResourceKind::Image => api.list_images(EMPTY_FILTER).await,
            ResourceKind::VolumeGroup => api.list_volume_groups(EMPTY_FILTER).await,
        }
    }

    async fn delete(
        self,
        api: &dyn PrismApi,
        uuid: &str,
    ) -> std::result::Result<String, ClientError> {
        match self {
            ResourceKind::Vm => api.delete_vm(uuid).await,
            ResourceKind::Image => api.delete_image(uuid).await,
            ResourceKind::VolumeGroup => api.delete_volume_group(uuid).await,
        }
    }
}

/// Lists, filters, deletes and confirms one kind of entity
#[derive(Clone, Debug)]
pub struct ResourceCleanup {
    kind: ResourceKind,
    description_marker: Option<String>,
}

impl ResourceCleanup {
    pub fn vms() -> Self {
        Self {
            kind: ResourceKind::Vm,
            description_marker: None,
        }
    }

    pub fn images() -> Self {
        Self {
            kind: ResourceKind::Image,
            description_marker: None,
        }
    }

    /// Volume groups, optionally narrowed to those whose description
    /// contains `marker`
    pub fn volume_groups(marker: Option<String>) -> Self {
        Self {
            kind: ResourceKind::VolumeGroup,
            description_marker: marker,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Whether this stage deletes `resource`
    pub fn selects(&self, tag: &OwnershipTag, resource: &ManagedResource) -> bool {
        if !tag.matches(&resource.categories) {
            return false;
        }
        match &self.description_marker {
            Some(marker) => resource
                .description
                .as_deref()
                .is_some_and(|d| d.contains(marker.as_str())),
            None => true,
        }
    }
}

#[async_trait]
impl CleanupStage for ResourceCleanup {
    fn name(&self) -> &'static str {
        self.kind.stage_name()
    }

    async fn run(&self, ctx: &StageContext) -> Result<usize> {
        let stage = self.name();
        let noun = self.kind.noun();

        let listed = match ctx.call(self.kind.list(ctx.api.as_ref())).await? {
            Ok(listed) => listed,
            // Prism Central builds without the volumes API answer 404 here
            Err(e) if e.is_not_found() && self.kind == ResourceKind::VolumeGroup => {
                warn!(stage, error = %e, "Volume group listing unavailable, skipping");
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        };

        let owned: Vec<ManagedResource> = listed
            .into_iter()
            .filter(|r| self.selects(&ctx.tag, r))
            .collect();

        if owned.is_empty() {
            info!(stage, "No {}s to delete", noun);
            return Ok(0);
        }

        for resource in &owned {
            info!(
                stage,
                uuid = %resource.uuid,
                name = %resource.name,
                "{} scheduled to be deleted",
                noun
            );
        }

        let mut errors = Vec::new();
        let mut tasks = Vec::new();
        let mut deleted = 0;

        for resource in &owned {
            match ctx.call(self.kind.delete(ctx.api.as_ref(), &resource.uuid)).await? {
                Ok(task_uuid) => {
                    debug!(stage, uuid = %resource.uuid, task = %task_uuid, "Delete submitted");
                    tasks.push(task_uuid);
                }
                Err(e) if e.is_not_found() => {
                    debug!(stage, uuid = %resource.uuid, "Already deleted");
                    deleted += 1;
                }
                Err(e) => {
                    warn!(
                        stage,
                        uuid = %resource.uuid,
                        name = %resource.name,
                        error = %e,
                        "Failed to delete {}",
                        noun
                    );
                    errors.push(format!(
                        "failed to delete {} {} ({}): {}",
                        noun, resource.name, resource.uuid, e
                    ));
                }
            }
        }

        match ctx.waiter.wait_all(&tasks, &ctx.cancel).await {
            Ok(()) => deleted += tasks.len(),
            Err(Error::TaskBatch { failures, total }) => {
                deleted += total - failures.len();
                errors.extend(failures);
            }
            Err(e) => return Err(e),
        }

        if errors.is_empty() {
            info!(stage, deleted, "Deleted all {}s", noun);
            Ok(deleted)
        } else {
            Err(Error::stage(stage, errors))
        }
    }
}
