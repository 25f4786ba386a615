//! Editing a store's override of one record.
//!
//! An edit session works on a copy of the record with the stored override already applied, so
//! editors start from what the store currently shows. Submitted values are limited to the
//! bundle's editable fields and compacted before they are stored.

use super::entity::{ContentEntity, ContextId};
use super::manager::StoreOverrideManager;
use super::repository::StoreOverrideRepository;
use super::schema::{AllowedField, BundleDefinition};
use super::store_override::{OverrideDefinition, StoreOverride};
use super::value::{FieldPatch, FieldValue};
use crate::errors::Result;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// One store's in-progress edit of a record's override.
#[derive(Debug, Clone)]
pub struct OverrideEditSession<E> {
    context_id: ContextId,
    entity: E,
    stored: Option<StoreOverride>,
    editable_fields: Vec<AllowedField>,
    submitted: Option<StoreOverride>,
    repository: StoreOverrideRepository,
}

/// Starts editing the override of `entity` for a store.
///
/// The stored override is loaded directly, regardless of status or route, and applied to a
/// working copy of the entity.
///
/// # Errors
/// Returns an error if the stored override cannot be loaded or applied.
#[instrument(skip(manager, bundle, entity), fields(entity_id = entity.id()))]
pub async fn begin_edit<E: ContentEntity + Clone>(
    manager: &StoreOverrideManager,
    bundle: &BundleDefinition,
    context_id: ContextId,
    entity: &E,
) -> Result<OverrideEditSession<E>> {
    let repository = manager.repository().clone();
    let stored = repository.load(context_id, entity).await?;

    let mut working_copy = entity.clone();
    if let Some(store_override) = &stored {
        store_override.apply(&mut working_copy)?;
    }

    Ok(OverrideEditSession {
        context_id,
        entity: working_copy,
        stored,
        editable_fields: manager.editable_fields(bundle).await,
        submitted: None,
        repository,
    })
}

impl<E: ContentEntity> OverrideEditSession<E> {
    /// The working copy, showing the stored or submitted override.
    pub const fn entity(&self) -> &E {
        &self.entity
    }

    /// The store being edited.
    pub const fn context_id(&self) -> ContextId {
        self.context_id
    }

    /// The override stored when the session began.
    pub const fn stored(&self) -> Option<&StoreOverride> {
        self.stored.as_ref()
    }

    /// The override built by the last [`OverrideEditSession::submit`].
    pub const fn submitted(&self) -> Option<&StoreOverride> {
        self.submitted.as_ref()
    }

    /// Fields the editor may change.
    pub fn editable_fields(&self) -> &[AllowedField] {
        &self.editable_fields
    }

    /// Initial value of the "active" checkbox.
    pub fn default_status(&self) -> bool {
        self.stored.as_ref().is_none_or(StoreOverride::status)
    }

    /// Builds the override from submitted field values.
    ///
    /// Values for fields that are not editable are dropped. The result is applied to the
    /// working copy but not persisted until [`OverrideEditSession::save`].
    ///
    /// # Errors
    /// Returns an error if the override cannot be built or applied.
    pub fn submit(&mut self, values: FieldPatch, status: bool) -> Result<&StoreOverride> {
        let mut data = FieldPatch::new();
        for (field_name, value) in values {
            if self.editable_fields.iter().any(|f| f.name == field_name) {
                data.insert(field_name, compact(value));
            } else {
                debug!("Ignoring submitted value for {}", field_name);
            }
        }

        let store_override = StoreOverride::from_entity(
            self.context_id,
            &self.entity,
            OverrideDefinition {
                data: Some(data.into()),
                status: Some(status),
                ..OverrideDefinition::default()
            },
        )?;
        store_override.apply(&mut self.entity)?;

        Ok(self.submitted.insert(store_override))
    }

    /// Persists the submitted override.
    ///
    /// Returns `false` if nothing was submitted.
    ///
    /// # Errors
    /// Returns an error if the save fails.
    pub async fn save(&self) -> Result<bool> {
        let Some(store_override) = &self.submitted else {
            warn!("Nothing submitted, not saving.");
            return Ok(false);
        };
        self.repository.save(store_override).await?;
        info!(
            "Saved override of {} {} for store {}",
            self.entity.entity_type_id(),
            self.entity.id(),
            self.context_id
        );
        Ok(true)
    }
}

fn without_blank_properties(properties: BTreeMap<String, FieldValue>) -> FieldValue {
    FieldValue::Map(
        properties
            .into_iter()
            .filter(|(_, value)| !value.is_blank())
            .collect(),
    )
}

/// Drops blank properties from each delta and unwraps single-delta lists.
fn compact(value: FieldValue) -> FieldValue {
    match value {
        FieldValue::List(deltas) => {
            let mut deltas: Vec<FieldValue> = deltas
                .into_iter()
                .map(|delta| match delta {
                    FieldValue::Map(properties) => without_blank_properties(properties),
                    other => other,
                })
                .collect();
            if deltas.len() == 1 {
                deltas.remove(0)
            } else {
                FieldValue::List(deltas)
            }
        }
        FieldValue::Map(properties) => without_blank_properties(properties),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::DatabaseConnection;
    use std::sync::Arc;

    fn editable_manager(db: Arc<DatabaseConnection>) -> (StoreOverrideManager, BundleDefinition) {
        let schema = with_override_fields(test_schema(), "product", "default", &["title", "body"]);
        let bundle = schema.bundle_definition("product", "default").unwrap();
        (
            test_manager_with_schema(db, Some(1), Some(canonical_route()), schema),
            bundle,
        )
    }

    #[tokio::test]
    async fn test_begin_edit_without_stored_override() -> Result<()> {
        let (manager, bundle) = editable_manager(setup_shared_test_db().await?);
        let product = test_product(1, "Test");

        let session = begin_edit(&manager, &bundle, 1, &product).await?;
        assert!(session.stored().is_none());
        assert!(session.default_status());
        assert_eq!(session.entity(), &product);
        let names: Vec<&str> = session.editable_fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["title", "body"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_begin_edit_prefills_inactive_override() -> Result<()> {
        let (manager, bundle) = editable_manager(setup_shared_test_db().await?);
        let product = test_product(1, "Test");
        manager
            .repository()
            .save(&StoreOverride::from_entity(
                1,
                &product,
                OverrideDefinition {
                    data: Some([("title", title_value("Draft"))].into_iter().collect()),
                    status: Some(false),
                    ..OverrideDefinition::default()
                },
            )?)
            .await?;

        let session = begin_edit(&manager, &bundle, 1, &product).await?;
        assert!(!session.default_status());
        assert_eq!(session.entity().get("title"), Some(&title_value("Draft")));
        // The caller's entity is untouched
        assert_eq!(product.get("title"), Some(&FieldValue::from("Test")));
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_and_save() -> Result<()> {
        init_test_tracing();
        let (manager, bundle) = editable_manager(setup_shared_test_db().await?);
        let product = test_product(1, "Test").with_field("body", body_value("Body"));

        let mut session = begin_edit(&manager, &bundle, 1, &product).await?;
        assert!(!session.save().await?);

        let values: FieldPatch = [
            (
                "title",
                FieldValue::List(vec![
                    [("value", FieldValue::from("Store title")), ("summary", FieldValue::from(""))]
                        .into_iter()
                        .collect(),
                ]),
            ),
            ("langcode", FieldValue::from("fr")),
        ]
        .into_iter()
        .collect();
        let submitted = session.submit(values, true)?;
        assert!(!submitted.data().contains("langcode"));
        assert_eq!(submitted.data().get("title"), Some(&title_value("Store title")));
        assert_eq!(session.entity().get("title"), Some(&title_value("Store title")));

        assert!(session.save().await?);
        let stored = manager.repository().load(1, &product).await?.unwrap();
        assert!(stored.is_active());
        assert_eq!(stored.data().len(), 1);
        assert_eq!(stored.data().get("title"), Some(&title_value("Store title")));
        Ok(())
    }

    #[test]
    fn test_compact() {
        let deltas = FieldValue::List(vec![
            [("target_id", FieldValue::from(3_i64)), ("label", FieldValue::Null)]
                .into_iter()
                .collect(),
            [("target_id", FieldValue::from(0_i64)), ("hidden", FieldValue::from(false))]
                .into_iter()
                .collect(),
        ]);
        assert_eq!(
            compact(deltas),
            FieldValue::List(vec![
                [("target_id", 3_i64)].into_iter().collect(),
                [("target_id", 0_i64)].into_iter().collect(),
            ])
        );

        let single = FieldValue::List(vec![
            [("value", FieldValue::from("Body")), ("format", FieldValue::from("basic_html"))]
                .into_iter()
                .collect(),
        ]);
        assert_eq!(compact(single), body_value("Body"));
        assert_eq!(compact(FieldValue::from("plain")), FieldValue::from("plain"));
        assert_eq!(compact(FieldValue::List(vec![])), FieldValue::List(vec![]));
    }
}
