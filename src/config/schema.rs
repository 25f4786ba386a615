//! Entity type and bundle definitions loaded from config.toml
//!
//! Hosts without their own schema registry describe their content types here. The same
//! structure answers both field-definition lookups and per-bundle override settings.

use crate::core::schema::{
    BundleDefinition, EntityKeys, FieldDefinition, FieldSchema, FieldStorageDefinition,
    OverrideFieldConfig,
};
use serde::Deserialize;
use std::collections::HashMap;

/// Schema section of config.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaConfig {
    /// Entity types with their base fields
    #[serde(default)]
    pub entity_types: Vec<EntityTypeConfig>,
    /// Bundles with their bundle-specific fields and override settings
    #[serde(default)]
    pub bundles: Vec<BundleConfig>,
}

/// Configuration for a single entity type
#[derive(Debug, Clone, Deserialize)]
pub struct EntityTypeConfig {
    /// Entity type id, e.g. `product`
    pub id: String,
    /// Field holding the language code
    #[serde(default)]
    pub langcode_key: Option<String>,
    /// Field flagging the default translation
    #[serde(default)]
    pub default_langcode_key: Option<String>,
    /// Base fields shared by every bundle, in display order
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

/// Configuration for a single bundle
#[derive(Debug, Clone, Deserialize)]
pub struct BundleConfig {
    /// Bundle id
    pub id: String,
    /// Entity type the bundle belongs to
    pub entity_type: String,
    /// Fields attached to this bundle only
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
    /// Fields enabled for store overrides
    #[serde(default)]
    pub override_fields: Option<Vec<String>>,
}

/// Configuration for a single field
#[derive(Debug, Clone, Deserialize)]
pub struct FieldConfig {
    /// Machine name
    pub name: String,
    /// Label, defaults to the machine name
    #[serde(default)]
    pub label: Option<String>,
    /// Storage provider, defaults to the entity type id
    #[serde(default)]
    pub provider: Option<String>,
    /// Computed fields have no storage
    #[serde(default)]
    pub computed: bool,
}

impl FieldConfig {
    fn definition(&self) -> FieldDefinition {
        FieldDefinition {
            name: self.name.clone(),
            label: self.label.clone().unwrap_or_else(|| self.name.clone()),
        }
    }
}

impl SchemaConfig {
    fn entity_type(&self, entity_type: &str) -> Option<&EntityTypeConfig> {
        self.entity_types.iter().find(|t| t.id == entity_type)
    }

    fn bundle(&self, entity_type: &str, bundle: &str) -> Option<&BundleConfig> {
        self.bundles
            .iter()
            .find(|b| b.entity_type == entity_type && b.id == bundle)
    }

    fn keys(&self, entity_type: &str) -> EntityKeys {
        self.entity_type(entity_type)
            .map(|t| EntityKeys {
                langcode: t.langcode_key.clone(),
                default_langcode: t.default_langcode_key.clone(),
            })
            .unwrap_or_default()
    }

    /// Looks up a bundle of a configured entity type.
    #[must_use]
    pub fn bundle_definition(&self, entity_type: &str, bundle: &str) -> Option<BundleDefinition> {
        self.entity_type(entity_type)?;
        let bundle = self.bundle(entity_type, bundle)?;
        Some(BundleDefinition {
            id: bundle.id.clone(),
            entity_type: bundle.entity_type.clone(),
            keys: self.keys(entity_type),
        })
    }

    /// Every bundle whose entity type is configured, in file order.
    #[must_use]
    pub fn bundle_definitions(&self) -> Vec<BundleDefinition> {
        self.bundles
            .iter()
            .filter_map(|b| self.bundle_definition(&b.entity_type, &b.id))
            .collect()
    }
}

impl FieldSchema for SchemaConfig {
    fn field_definitions(&self, entity_type: &str, bundle: &str) -> Vec<FieldDefinition> {
        let base = self
            .entity_type(entity_type)
            .map(|t| t.fields.as_slice())
            .unwrap_or_default();
        let bundle_fields = self
            .bundle(entity_type, bundle)
            .map(|b| b.fields.as_slice())
            .unwrap_or_default();

        base.iter()
            .chain(bundle_fields)
            .map(FieldConfig::definition)
            .collect()
    }

    fn field_storage_definitions(&self, entity_type: &str) -> HashMap<String, FieldStorageDefinition> {
        let base = self
            .entity_type(entity_type)
            .map(|t| t.fields.iter())
            .into_iter()
            .flatten();
        let bundle_fields = self
            .bundles
            .iter()
            .filter(|b| b.entity_type == entity_type)
            .flat_map(|b| b.fields.iter());

        base.chain(bundle_fields)
            .filter(|field| !field.computed)
            .map(|field| {
                (
                    field.name.clone(),
                    FieldStorageDefinition {
                        name: field.name.clone(),
                        provider: field
                            .provider
                            .clone()
                            .unwrap_or_else(|| entity_type.to_string()),
                    },
                )
            })
            .collect()
    }
}

impl OverrideFieldConfig for SchemaConfig {
    fn override_fields(&self, bundle: &BundleDefinition) -> Option<Vec<String>> {
        self.bundle(&bundle.entity_type, &bundle.id)?
            .override_fields
            .clone()
    }
}
