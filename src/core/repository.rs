//! Store override persistence.
//!
//! Overrides live in a single table keyed on (store, entity type, entity id, translation).
//! Saving is a single `INSERT ... ON CONFLICT DO UPDATE` statement so concurrent writers to the
//! same key resolve to last-writer-wins at the database. Lookups that find nothing return
//! `None` or an empty list, and deletes that match nothing are not errors.

use super::entity::{ContentEntity, ContextId};
use super::store_override::{OverrideDefinition, StoreOverride};
use super::value::FieldPatch;
use crate::{
    entities::{StoreOverrideColumn, StoreOverrideEntity, StoreOverrideModel, store_override},
    errors::Result,
};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Reads and writes store overrides.
///
/// Clones share the same connection.
#[derive(Debug, Clone)]
pub struct StoreOverrideRepository {
    db: Arc<DatabaseConnection>,
}

impl StoreOverrideRepository {
    /// Creates a repository that owns an open connection.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self::shared(Arc::new(db))
    }

    /// Creates a repository on a connection shared with other components.
    #[must_use]
    pub const fn shared(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Loads the override of `entity` for the given store.
    ///
    /// The translation is taken from the entity: the default sentinel for a default
    /// translation, otherwise the entity's language.
    ///
    /// # Errors
    /// Returns an error if the query fails or the stored row cannot be decoded.
    #[instrument(skip(self, entity), fields(entity_type = entity.entity_type_id(), entity_id = entity.id()))]
    pub async fn load<E: ContentEntity + ?Sized>(
        &self,
        context_id: ContextId,
        entity: &E,
    ) -> Result<Option<StoreOverride>> {
        let row = StoreOverrideEntity::find()
            .filter(store_override::Column::ContextId.eq(context_id))
            .filter(store_override::Column::EntityId.eq(entity.id()))
            .filter(store_override::Column::EntityType.eq(entity.entity_type_id()))
            .filter(store_override::Column::Translation.eq(entity.override_translation()))
            .one(&*self.db)
            .await?;

        debug!("Override lookup found a row: {}", row.is_some());
        row.map(from_row).transpose()
    }

    /// Loads the overrides of `entity` across all stores, ordered by store id.
    ///
    /// # Errors
    /// Returns an error if the query fails or a stored row cannot be decoded.
    #[instrument(skip(self, entity), fields(entity_type = entity.entity_type_id(), entity_id = entity.id()))]
    pub async fn load_multiple_by_entity<E: ContentEntity + ?Sized>(
        &self,
        entity: &E,
    ) -> Result<Vec<StoreOverride>> {
        let rows = StoreOverrideEntity::find()
            .filter(store_override::Column::EntityId.eq(entity.id()))
            .filter(store_override::Column::EntityType.eq(entity.entity_type_id()))
            .filter(store_override::Column::Translation.eq(entity.override_translation()))
            .order_by_asc(store_override::Column::ContextId)
            .all(&*self.db)
            .await?;

        debug!("Fetched {} overrides.", rows.len());
        rows.into_iter().map(from_row).collect()
    }

    /// Inserts the override, or replaces the stored one with the same natural key.
    ///
    /// A new row without a creation time is stamped with the current time. When a row already
    /// exists its creation time is only replaced if `store_override` carries one explicitly.
    ///
    /// # Errors
    /// Returns an error if the data cannot be encoded or the statement fails.
    #[instrument(skip(self, store_override), fields(
        context_id = store_override.context_id(),
        entity_id = store_override.entity_id(),
        translation = store_override.translation(),
    ))]
    pub async fn save(&self, store_override: &StoreOverride) -> Result<()> {
        let created = store_override
            .created()
            .unwrap_or_else(|| chrono::Utc::now().timestamp());

        let row = store_override::ActiveModel {
            context_id: Set(store_override.context_id()),
            entity_id: Set(store_override.entity_id()),
            entity_type: Set(store_override.entity_type().as_str().to_string()),
            translation: Set(store_override.translation().to_string()),
            data: Set(store_override.data().encode()?),
            status: Set(store_override.status()),
            created: Set(created),
        };

        let mut update_columns = vec![StoreOverrideColumn::Data, StoreOverrideColumn::Status];
        if store_override.created().is_some() {
            update_columns.push(StoreOverrideColumn::Created);
        }

        StoreOverrideEntity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    StoreOverrideColumn::ContextId,
                    StoreOverrideColumn::EntityId,
                    StoreOverrideColumn::EntityType,
                    StoreOverrideColumn::Translation,
                ])
                .update_columns(update_columns)
                .to_owned(),
            )
            .exec_without_returning(&*self.db)
            .await?;

        info!(
            "Saved override of store {} for {} {} ({} fields, active: {})",
            store_override.context_id(),
            store_override.entity_type(),
            store_override.entity_id(),
            store_override.data().len(),
            store_override.status()
        );
        Ok(())
    }

    /// Deletes the stored row matching the override's natural key.
    ///
    /// Returns the number of rows removed (0 if none existed).
    ///
    /// # Errors
    /// Returns an error if the statement fails.
    #[instrument(skip(self, store_override), fields(
        context_id = store_override.context_id(),
        entity_id = store_override.entity_id(),
    ))]
    pub async fn delete(&self, store_override: &StoreOverride) -> Result<u64> {
        let result = StoreOverrideEntity::delete_many()
            .filter(store_override::Column::ContextId.eq(store_override.context_id()))
            .filter(store_override::Column::EntityId.eq(store_override.entity_id()))
            .filter(store_override::Column::EntityType.eq(store_override.entity_type().as_str()))
            .filter(store_override::Column::Translation.eq(store_override.translation()))
            .exec(&*self.db)
            .await?;

        debug!("Deleted {} override rows.", result.rows_affected);
        Ok(result.rows_affected)
    }

    /// Deletes every override belonging to a store.
    ///
    /// # Errors
    /// Returns an error if the statement fails.
    #[instrument(skip(self))]
    pub async fn delete_by_store(&self, context_id: ContextId) -> Result<u64> {
        let result = StoreOverrideEntity::delete_many()
            .filter(store_override::Column::ContextId.eq(context_id))
            .exec(&*self.db)
            .await?;

        info!(
            "Deleted {} overrides of store {}",
            result.rows_affected, context_id
        );
        Ok(result.rows_affected)
    }

    /// Deletes the overrides of `entity` in every store.
    ///
    /// For a non-default translation only that translation's overrides are removed; for the
    /// default translation all translations are removed.
    ///
    /// # Errors
    /// Returns an error if the statement fails.
    #[instrument(skip(self, entity), fields(entity_type = entity.entity_type_id(), entity_id = entity.id()))]
    pub async fn delete_by_entity<E: ContentEntity + ?Sized>(&self, entity: &E) -> Result<u64> {
        let mut query = StoreOverrideEntity::delete_many()
            .filter(store_override::Column::EntityId.eq(entity.id()))
            .filter(store_override::Column::EntityType.eq(entity.entity_type_id()));
        if !entity.is_default_translation() {
            query = query.filter(store_override::Column::Translation.eq(entity.language()));
        }
        let result = query.exec(&*self.db).await?;

        info!(
            "Deleted {} overrides of {} {}",
            result.rows_affected,
            entity.entity_type_id(),
            entity.id()
        );
        Ok(result.rows_affected)
    }
}

fn from_row(row: StoreOverrideModel) -> Result<StoreOverride> {
    let data = FieldPatch::decode(&row.data)?;
    let store_override = StoreOverride::new(OverrideDefinition {
        context_id: Some(row.context_id),
        entity_id: Some(row.entity_id),
        entity_type: Some(row.entity_type),
        translation: Some(row.translation),
        data: Some(data.into()),
        status: Some(row.status),
        created: Some(row.created),
    })?;
    Ok(store_override)
}
