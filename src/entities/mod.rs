//! Entity module - Contains the SeaORM entity definitions for the database.
//! The override table is the only table the subsystem owns; content records and
//! stores live in the host platform.

pub mod store_override;

pub use store_override::{
    Column as StoreOverrideColumn, Entity as StoreOverrideEntity, Model as StoreOverrideModel,
};
