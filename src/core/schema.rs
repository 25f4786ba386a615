//! Host schema metadata and the field-eligibility rules built on it.
//!
//! The host owns field definitions and bundle configuration. The override system only reads
//! them through [`FieldSchema`] and [`OverrideFieldConfig`] to work out which fields may vary
//! per store.

use std::collections::HashMap;

/// Storage provider of fields owned by the translation subsystem.
pub const TRANSLATION_PROVIDER: &str = "content_translation";

/// Revision field tracking which translation a revision affected.
pub const TRANSLATION_AFFECTED_FIELD: &str = "revision_translation_affected";

/// A field as attached to a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    /// Machine name
    pub name: String,
    /// Human-readable label
    pub label: String,
}

/// How a field is stored for an entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldStorageDefinition {
    /// Machine name
    pub name: String,
    /// Module/subsystem providing the storage
    pub provider: String,
}

/// Entity keys naming the language-control fields of an entity type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityKeys {
    /// Field holding the language code
    pub langcode: Option<String>,
    /// Field flagging the default translation
    pub default_langcode: Option<String>,
}

/// A bundle (content type) of some entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleDefinition {
    /// Bundle id, e.g. `"default"`
    pub id: String,
    /// Entity type the bundle belongs to, e.g. `"product"`
    pub entity_type: String,
    /// Entity keys of that entity type
    pub keys: EntityKeys,
}

/// A field that may be overridden, with its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedField {
    /// Machine name
    pub name: String,
    /// Human-readable label
    pub label: String,
}

/// Read access to the host's field definitions.
pub trait FieldSchema: Send + Sync {
    /// Fields of a bundle, in declared order.
    fn field_definitions(&self, entity_type: &str, bundle: &str) -> Vec<FieldDefinition>;

    /// Storage definitions of an entity type, keyed by field name.
    ///
    /// Computed fields have no storage and are absent from the map.
    fn field_storage_definitions(&self, entity_type: &str) -> HashMap<String, FieldStorageDefinition>;
}

/// Read access to per-bundle override settings.
pub trait OverrideFieldConfig: Send + Sync {
    /// Fields enabled for overriding on the bundle, if configured.
    fn override_fields(&self, bundle: &BundleDefinition) -> Option<Vec<String>>;
}

fn field_is_allowed(keys: &EntityKeys, storage: &FieldStorageDefinition) -> bool {
    if storage.provider == TRANSLATION_PROVIDER {
        return false;
    }
    let structural = [
        keys.langcode.as_deref(),
        keys.default_langcode.as_deref(),
        Some(TRANSLATION_AFFECTED_FIELD),
    ];
    !structural.contains(&Some(storage.name.as_str()))
}

/// Fields of `bundle` that are structurally able to vary per store, in schema order.
///
/// Excludes fields without storage, fields stored by the translation subsystem, the
/// language-control keys and the translation-affected revision field.
pub fn allowed_fields(schema: &dyn FieldSchema, bundle: &BundleDefinition) -> Vec<AllowedField> {
    let storage = schema.field_storage_definitions(&bundle.entity_type);

    schema
        .field_definitions(&bundle.entity_type, &bundle.id)
        .into_iter()
        .filter(|definition| {
            storage
                .get(&definition.name)
                .is_some_and(|storage| field_is_allowed(&bundle.keys, storage))
        })
        .map(|definition| AllowedField {
            name: definition.name,
            label: definition.label,
        })
        .collect()
}

/// Enabled fields that are not in the allowed set.
#[must_use]
pub fn unknown_enabled_fields(allowed: &[AllowedField], enabled: &[String]) -> Vec<String> {
    enabled
        .iter()
        .filter(|name| !allowed.iter().any(|field| &field.name == *name))
        .cloned()
        .collect()
}
