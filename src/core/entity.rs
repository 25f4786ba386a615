//! The capability surface the override system needs from a host content record.
//!
//! The host platform owns entity storage; overrides only read identity and translation
//! metadata and swap field values in memory. [`ContentRecord`] is a self-contained
//! implementation for hosts that hand over plain field maps.

use super::value::FieldValue;
use std::collections::BTreeMap;

/// Identifier of an overriding context (a store).
pub type ContextId = i64;

/// Identifier of a content record within its entity type.
pub type EntityId = i64;

/// Language tag used when a record is its own default translation.
pub const DEFAULT_TRANSLATION: &str = "x-default";

/// A loaded content record that overrides can be applied to.
pub trait ContentEntity {
    /// Entity type id, e.g. `"product"`.
    fn entity_type_id(&self) -> &str;

    /// Record id within its entity type.
    fn id(&self) -> EntityId;

    /// Bundle (content type) the record belongs to.
    fn bundle(&self) -> &str;

    /// Whether the record structurally has the named field.
    fn has_field(&self, name: &str) -> bool;

    /// Current in-memory value of a field.
    fn get(&self, name: &str) -> Option<&FieldValue>;

    /// Replaces the in-memory value of a field.
    fn set(&mut self, name: &str, value: FieldValue);

    /// Whether this is the record's default translation.
    fn is_default_translation(&self) -> bool;

    /// Language code of this translation.
    fn language(&self) -> &str;

    /// The translation tag overrides for this record are keyed on.
    fn override_translation(&self) -> &str {
        if self.is_default_translation() {
            DEFAULT_TRANSLATION
        } else {
            self.language()
        }
    }
}

/// In-memory content record backed by a field map.
///
/// The set of fields is fixed at construction: [`ContentEntity::set`] on an unknown field is
/// ignored, matching how a host record rejects fields outside its schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRecord {
    entity_type: String,
    id: EntityId,
    bundle: String,
    language: String,
    default_translation: bool,
    fields: BTreeMap<String, FieldValue>,
}

impl ContentRecord {
    /// Creates a default-translation record with no fields.
    pub fn new(entity_type: impl Into<String>, id: EntityId, bundle: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id,
            bundle: bundle.into(),
            language: "en".to_string(),
            default_translation: true,
            fields: BTreeMap::new(),
        }
    }

    /// Adds a field with its initial value.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Sets the language of the default translation.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Returns a copy of this record as a non-default translation in `language`.
    #[must_use]
    pub fn translation(&self, language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            default_translation: false,
            ..self.clone()
        }
    }

    /// Names of all fields on the record.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl ContentEntity for ContentRecord {
    fn entity_type_id(&self) -> &str {
        &self.entity_type
    }

    fn id(&self) -> EntityId {
        self.id
    }

    fn bundle(&self) -> &str {
        &self.bundle
    }

    fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    fn set(&mut self, name: &str, value: FieldValue) {
        if let Some(slot) = self.fields.get_mut(name) {
            *slot = value;
        }
    }

    fn is_default_translation(&self) -> bool {
        self.default_translation
    }

    fn language(&self) -> &str {
        &self.language
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_translation() {
        let product = ContentRecord::new("product", 1, "default")
            .with_language("en")
            .with_field("title", "Test");
        assert_eq!(product.override_translation(), DEFAULT_TRANSLATION);

        let french = product.translation("fr");
        assert!(!french.is_default_translation());
        assert_eq!(french.override_translation(), "fr");
        assert_eq!(french.get("title"), Some(&FieldValue::from("Test")));
    }

    #[test]
    fn test_set_ignores_unknown_fields() {
        let mut product = ContentRecord::new("product", 1, "default").with_field("title", "Test");
        product.set("title", "Changed".into());
        product.set("missing", "Ignored".into());

        assert_eq!(product.get("title"), Some(&FieldValue::from("Changed")));
        assert!(!product.has_field("missing"));
        assert_eq!(product.field_names().collect::<Vec<_>>(), vec!["title"]);
    }
}
