//! Cleanup of the cluster's ownership category
//!
//! Prism refuses to delete a category key that still has values, so every
//! value is deleted first and the key last. The key delete is still issued
//! when a value delete failed; both errors are reported.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{CleanupStage, StageContext};
use crate::{Error, Result};

/// Deletes the `kubernetes-io-cluster-<infraID>` category key and its values
#[derive(Clone, Copy, Debug, Default)]
pub struct CategoryCleanup;

#[async_trait]
impl CleanupStage for CategoryCleanup {
    fn name(&self) -> &'static str {
        "categories"
    }

    async fn run(&self, ctx: &StageContext) -> Result<usize> {
        let stage = self.name();
        let key = ctx.tag.key();

        match ctx.call(ctx.api.get_category_key(key)).await? {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                info!(stage, category = %key, "Category already deleted");
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        }

        let values = ctx.call(ctx.api.list_category_values(key)).await??;
        let mut errors = Vec::new();
        let mut deleted = 0;

        for value in &values {
            info!(stage, category = %key, value = %value, "Deleting category value");
            match ctx.call(ctx.api.delete_category_value(key, value)).await? {
                Ok(()) => deleted += 1,
                Err(e) if e.is_not_found() => {
                    debug!(
                        stage,
                        category = %key,
                        value = %value,
                        "Category value already deleted"
                    );
                    deleted += 1;
                }
                Err(e) => {
                    warn!(
                        stage,
                        category = %key,
                        value = %value,
                        error = %e,
                        "Failed to delete category value"
                    );
                    errors.push(format!("failed to delete category value {}: {}", value, e));
                }
            }
        }

        info!(stage, category = %key, "Deleting category key");
        match ctx.call(ctx.api.delete_category_key(key)).await? {
            Ok(()) => deleted += 1,
            Err(e) if e.is_not_found() => {
                debug!(stage, category = %key, "Category key already deleted");
            }
            Err(e) => {
                warn!(stage, category = %key, error = %e, "Failed to delete category key");
                errors.push(format!("failed to delete category key {}: {}", key, e));
            }
        }

        if errors.is_empty() {
            Ok(deleted)
        } else {
            Err(Error::stage(stage, errors))
        }
    }
}
