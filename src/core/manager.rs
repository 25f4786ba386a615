//! Override resolution.
//!
//! The manager decides whether a loaded record should show store-specific values, applies the
//! active store's override, and reports which fields a bundle allows and enables for
//! overriding. Administrative routes always see master data.

use super::context::{CurrentContext, CurrentRoute};
use super::entity::ContentEntity;
use super::repository::StoreOverrideRepository;
use super::schema::{self, AllowedField, BundleDefinition, FieldSchema, OverrideFieldConfig};
use super::store_override::EntityType;
use crate::errors::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

/// Decides when and how store overrides apply.
pub struct StoreOverrideManager {
    current_store: Arc<dyn CurrentContext>,
    route_match: Arc<dyn CurrentRoute>,
    repository: StoreOverrideRepository,
    field_schema: Arc<dyn FieldSchema>,
    field_config: Arc<dyn OverrideFieldConfig>,
    allowed_fields_cache: RwLock<HashMap<(String, String), Vec<AllowedField>>>,
}

impl StoreOverrideManager {
    /// Creates a manager from its collaborators.
    pub fn new(
        current_store: Arc<dyn CurrentContext>,
        route_match: Arc<dyn CurrentRoute>,
        repository: StoreOverrideRepository,
        field_schema: Arc<dyn FieldSchema>,
        field_config: Arc<dyn OverrideFieldConfig>,
    ) -> Self {
        Self {
            current_store,
            route_match,
            repository,
            field_schema,
            field_config,
            allowed_fields_cache: RwLock::new(HashMap::new()),
        }
    }

    /// The repository overrides are loaded from.
    #[must_use]
    pub const fn repository(&self) -> &StoreOverrideRepository {
        &self.repository
    }

    /// Whether `entity` should have the current store's override applied.
    ///
    /// Never true for unsupported entity types, before a route is known, or on
    /// administrative routes.
    pub fn should_override<E: ContentEntity + ?Sized>(&self, entity: &E) -> bool {
        if !EntityType::is_supported(entity.entity_type_id()) {
            return false;
        }
        let Some(route) = self.route_match.current_route() else {
            // Routing has not completed yet.
            trace!("No current route, not overriding.");
            return false;
        };
        if route.admin {
            // Admin routes edit data and must show the master values.
            trace!("Route {} is administrative, not overriding.", route.name);
            return false;
        }
        true
    }

    /// Applies the current store's active override to `entity`.
    ///
    /// Returns whether an override was applied. A missing or inactive override, or no
    /// resolvable store, leaves the entity untouched.
    ///
    /// # Errors
    /// Returns an error if loading the override fails or it does not match the entity type.
    #[instrument(skip(self, entity), fields(entity_type = entity.entity_type_id(), entity_id = entity.id()))]
    pub async fn apply_override<E: ContentEntity + ?Sized>(&self, entity: &mut E) -> Result<bool> {
        let Some(context_id) = self.current_store.current_context() else {
            debug!("No current store, skipping override.");
            return Ok(false);
        };

        match self.repository.load(context_id, &*entity).await? {
            Some(store_override) if store_override.is_active() => {
                store_override.apply(entity)?;
                debug!(
                    "Applied override of store {} ({} fields)",
                    context_id,
                    store_override.data().len()
                );
                Ok(true)
            }
            Some(_) => {
                debug!("Override of store {} is inactive.", context_id);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    /// Fields of the bundle that can be overridden, keyed by name with their labels.
    ///
    /// The result is computed from the host schema once per bundle and cached.
    pub async fn allowed_fields(&self, bundle: &BundleDefinition) -> Vec<AllowedField> {
        let key = (bundle.entity_type.clone(), bundle.id.clone());
        if let Some(fields) = self.allowed_fields_cache.read().await.get(&key) {
            return fields.clone();
        }

        let fields = schema::allowed_fields(self.field_schema.as_ref(), bundle);
        debug!(
            "Computed {} allowed fields for {}.{}",
            fields.len(),
            bundle.entity_type,
            bundle.id
        );
        self.allowed_fields_cache
            .write()
            .await
            .insert(key, fields.clone());
        fields
    }

    /// Fields enabled for overriding in the bundle configuration, empty if unset.
    pub fn enabled_fields(&self, bundle: &BundleDefinition) -> Vec<String> {
        self.field_config.override_fields(bundle).unwrap_or_default()
    }

    /// Allowed fields that are also enabled, in schema order.
    pub async fn editable_fields(&self, bundle: &BundleDefinition) -> Vec<AllowedField> {
        let enabled = self.enabled_fields(bundle);
        self.allowed_fields(bundle)
            .await
            .into_iter()
            .filter(|field| enabled.contains(&field.name))
            .collect()
    }

    /// Drops cached allowed fields, e.g. after the host schema changed.
    pub async fn clear_field_cache(&self) {
        self.allowed_fields_cache.write().await.clear();
    }
}
