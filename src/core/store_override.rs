//! The store override record.
//!
//! A [`StoreOverride`] holds the sparse field patch one store applies on top of one content
//! record translation. Records are validated on construction and immutable afterwards; the
//! repository is the only place that assigns the creation time.

use super::entity::{ContentEntity, ContextId, DEFAULT_TRANSLATION, EntityId};
use super::value::{FieldPatch, FieldValue};
use crate::errors::{Error, Result, ValidationError};
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Entity types that can carry store overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    /// Catalog products
    Product,
}

impl EntityType {
    /// Every supported entity type.
    pub const ALL: &'static [Self] = &[Self::Product];

    /// The entity type id as used by the host and the `entity_type` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
        }
    }

    /// Whether the given entity type id is supported.
    #[must_use]
    pub fn is_supported(entity_type_id: &str) -> bool {
        entity_type_id.parse::<Self>().is_ok()
    }
}

impl FromStr for EntityType {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::UnsupportedEntityType {
                entity_type: s.to_string(),
            })
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loose, unvalidated description of a store override.
///
/// This is the shape submitted by editors or read back from storage. Every property is
/// optional here; [`StoreOverride::new`] decides what is required.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideDefinition {
    /// Owning store
    pub context_id: Option<ContextId>,
    /// Overridden record id
    pub entity_id: Option<EntityId>,
    /// Overridden record's entity type id
    pub entity_type: Option<String>,
    /// Translation language tag
    pub translation: Option<String>,
    /// Field patch; must be a mapping when present
    pub data: Option<FieldValue>,
    /// Active flag
    pub status: Option<bool>,
    /// Creation time in epoch seconds
    pub created: Option<i64>,
}

impl OverrideDefinition {
    /// Fills every property missing here from `base`.
    #[must_use]
    pub fn or(self, base: Self) -> Self {
        Self {
            context_id: self.context_id.or(base.context_id),
            entity_id: self.entity_id.or(base.entity_id),
            entity_type: self.entity_type.or(base.entity_type),
            translation: self.translation.or(base.translation),
            data: self.data.or(base.data),
            status: self.status.or(base.status),
            created: self.created.or(base.created),
        }
    }
}

/// A validated override of one record translation for one store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreOverride {
    context_id: ContextId,
    entity_id: EntityId,
    entity_type: EntityType,
    translation: String,
    data: FieldPatch,
    status: bool,
    created: Option<i64>,
}

fn required_id(value: Option<i64>, property: &'static str) -> std::result::Result<i64, ValidationError> {
    value
        .filter(|id| *id != 0)
        .ok_or(ValidationError::MissingProperty { property })
}

impl StoreOverride {
    /// Validates a definition and builds the override.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] if `context_id`, `entity_id` or `entity_type` is missing,
    /// if the entity type is unsupported, or if `data` is not a mapping.
    pub fn new(definition: OverrideDefinition) -> std::result::Result<Self, ValidationError> {
        let context_id = required_id(definition.context_id, "context_id")?;
        let entity_id = required_id(definition.entity_id, "entity_id")?;
        let entity_type = definition
            .entity_type
            .filter(|t| !t.is_empty())
            .ok_or(ValidationError::MissingProperty {
                property: "entity_type",
            })?
            .parse::<EntityType>()?;

        let data = match definition.data {
            None | Some(FieldValue::Null) => FieldPatch::new(),
            Some(FieldValue::Map(map)) => FieldPatch::from(map),
            Some(_) => return Err(ValidationError::InvalidData),
        };

        Ok(Self {
            context_id,
            entity_id,
            entity_type,
            translation: definition
                .translation
                .unwrap_or_else(|| DEFAULT_TRANSLATION.to_string()),
            data,
            status: definition.status.unwrap_or(false),
            created: definition.created,
        })
    }

    /// Builds an override for `entity` in the given store.
    ///
    /// The entity id, entity type and (for non-default translations) the translation are
    /// derived from the entity. Properties set in `definition` take precedence over the
    /// derived ones.
    pub fn from_entity<E: ContentEntity + ?Sized>(
        context_id: ContextId,
        entity: &E,
        definition: OverrideDefinition,
    ) -> std::result::Result<Self, ValidationError> {
        let derived = OverrideDefinition {
            context_id: Some(context_id),
            entity_id: Some(entity.id()),
            entity_type: Some(entity.entity_type_id().to_string()),
            translation: (!entity.is_default_translation()).then(|| entity.language().to_string()),
            ..OverrideDefinition::default()
        };
        Self::new(definition.or(derived))
    }

    /// The owning store.
    #[must_use]
    pub const fn context_id(&self) -> ContextId {
        self.context_id
    }

    /// Id of the overridden record.
    #[must_use]
    pub const fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    /// Entity type of the overridden record.
    #[must_use]
    pub const fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Translation tag, [`DEFAULT_TRANSLATION`] for the default translation.
    #[must_use]
    pub fn translation(&self) -> &str {
        &self.translation
    }

    /// The field patch.
    #[must_use]
    pub const fn data(&self) -> &FieldPatch {
        &self.data
    }

    /// Raw active flag.
    #[must_use]
    pub const fn status(&self) -> bool {
        self.status
    }

    /// Whether the override should be applied during resolution.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status
    }

    /// Creation time in epoch seconds, `None` until first saved.
    #[must_use]
    pub const fn created(&self) -> Option<i64> {
        self.created
    }

    /// Creation time as a UTC timestamp.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Flat representation of every property.
    ///
    /// Passing the result back to [`StoreOverride::new`] yields an equal override.
    #[must_use]
    pub fn to_definition(&self) -> OverrideDefinition {
        OverrideDefinition {
            context_id: Some(self.context_id),
            entity_id: Some(self.entity_id),
            entity_type: Some(self.entity_type.as_str().to_string()),
            translation: Some(self.translation.clone()),
            data: Some(self.data.clone().into()),
            status: Some(self.status),
            created: self.created,
        }
    }

    /// Writes the patched values onto `entity` in memory.
    ///
    /// Fields the entity does not have are skipped. Nothing is persisted.
    ///
    /// # Errors
    /// Returns [`Error::TypeMismatch`] if `entity` is not of this override's entity type.
    pub fn apply<E: ContentEntity + ?Sized>(&self, entity: &mut E) -> Result<()> {
        if entity.entity_type_id() != self.entity_type.as_str() {
            return Err(Error::TypeMismatch {
                expected: self.entity_type.to_string(),
                actual: entity.entity_type_id().to_string(),
            });
        }

        for (field_name, value) in self.data.iter() {
            if entity.has_field(field_name) {
                entity.set(field_name, value.clone());
            }
        }
        Ok(())
    }
}
