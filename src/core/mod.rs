//! Core module - store override records, persistence and resolution.
//! Everything here is independent of how the host routes requests or stores its content;
//! the host plugs in through the traits in [`context`], [`entity`] and [`schema`].

pub mod context;
pub mod editor;
pub mod entity;
pub mod hooks;
pub mod manager;
pub mod repository;
pub mod schema;
pub mod store_override;
pub mod value;

pub use context::{CurrentContext, CurrentRoute, RouteInfo};
pub use editor::{OverrideEditSession, begin_edit};
pub use entity::{ContentEntity, ContentRecord, ContextId, DEFAULT_TRANSLATION, EntityId};
pub use hooks::EntityHooks;
pub use manager::StoreOverrideManager;
pub use repository::StoreOverrideRepository;
pub use store_override::{EntityType, OverrideDefinition, StoreOverride};
pub use value::{FieldPatch, FieldValue};
