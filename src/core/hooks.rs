//! Entry points the host calls on entity lifecycle events.
//!
//! The hooks are created before the manager exists and wired afterwards: the store resolver the
//! manager depends on typically loads stores through the same entity loading path these hooks
//! intercept.

use super::entity::{ContentEntity, ContextId};
use super::manager::StoreOverrideManager;
use super::store_override::EntityType;
use crate::errors::{Error, Result};
use std::sync::{Arc, OnceLock};
use tracing::{instrument, warn};

/// Lifecycle hooks, wired once with the override manager.
#[derive(Default)]
pub struct EntityHooks {
    manager: OnceLock<Arc<StoreOverrideManager>>,
}

impl EntityHooks {
    /// Creates unwired hooks.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            manager: OnceLock::new(),
        }
    }

    /// Connects the hooks to the manager.
    ///
    /// # Errors
    /// Returns [`Error::AlreadyWired`] on a second call.
    pub fn wire(&self, manager: Arc<StoreOverrideManager>) -> Result<()> {
        self.manager.set(manager).map_err(|_| Error::AlreadyWired)
    }

    /// Whether [`EntityHooks::wire`] has been called.
    #[must_use]
    pub fn is_wired(&self) -> bool {
        self.manager.get().is_some()
    }

    fn manager(&self) -> Result<&StoreOverrideManager> {
        self.manager.get().map(Arc::as_ref).ok_or(Error::NotWired)
    }

    /// Called after `entity` was loaded for display.
    ///
    /// Applies the current store's override when the manager allows it. A failure to load the
    /// override is logged and the entity is shown with its master values.
    ///
    /// # Errors
    /// Returns [`Error::NotWired`] if called before [`EntityHooks::wire`].
    #[instrument(skip(self, entity), fields(entity_type = entity.entity_type_id(), entity_id = entity.id()))]
    pub async fn on_display_load<E: ContentEntity + ?Sized>(&self, entity: &mut E) -> Result<bool> {
        let manager = self.manager()?;
        if !manager.should_override(&*entity) {
            return Ok(false);
        }

        match manager.apply_override(entity).await {
            Ok(applied) => Ok(applied),
            Err(e) => {
                warn!("Failed to apply store override: {}", e);
                Ok(false)
            }
        }
    }

    /// Called after `entity` (or one of its translations) was deleted.
    ///
    /// Returns the number of overrides removed.
    ///
    /// # Errors
    /// Returns an error if unwired or if the delete fails.
    #[instrument(skip(self, entity), fields(entity_type = entity.entity_type_id(), entity_id = entity.id()))]
    pub async fn on_entity_delete<E: ContentEntity + ?Sized>(&self, entity: &E) -> Result<u64> {
        let manager = self.manager()?;
        if !EntityType::is_supported(entity.entity_type_id()) {
            return Ok(0);
        }
        manager.repository().delete_by_entity(entity).await
    }

    /// Called after a store was deleted.
    ///
    /// # Errors
    /// Returns an error if unwired or if the delete fails.
    #[instrument(skip(self))]
    pub async fn on_store_delete(&self, context_id: ContextId) -> Result<u64> {
        self.manager()?
            .repository()
            .delete_by_store(context_id)
            .await
    }
}
