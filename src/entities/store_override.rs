//! Store override entity - One row per (store, entity, translation) natural key.
//!
//! The four key columns form a composite primary key, which is also the conflict target of the
//! repository's upsert. `data` holds the JSON-encoded field patch.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Store override database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "store_override")]
pub struct Model {
    /// Store (context) the override belongs to
    #[sea_orm(primary_key, auto_increment = false)]
    pub context_id: i64,
    /// Id of the overridden record
    #[sea_orm(primary_key, auto_increment = false)]
    pub entity_id: i64,
    /// Entity type id of the overridden record (e.g. `"product"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub entity_type: String,
    /// Translation language tag, `"x-default"` for the default translation
    #[sea_orm(primary_key, auto_increment = false)]
    pub translation: String,
    /// JSON-encoded field patch
    #[sea_orm(column_type = "Text")]
    pub data: String,
    /// Whether the override is active
    pub status: bool,
    /// Creation time in epoch seconds, set once
    pub created: i64,
}

/// `StoreOverride` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
