//! Shared test utilities.
//!
//! This module provides helpers for setting up test databases, sample products, a product
//! schema and managers with a fixed store and route.

#![allow(clippy::unwrap_used)]

use crate::{
    config::{self, SchemaConfig},
    core::{
        context::{CurrentContext, CurrentRoute, RouteInfo},
        entity::{ContentRecord, ContextId, EntityId},
        manager::StoreOverrideManager,
        repository::StoreOverrideRepository,
        schema::FieldSchema,
        value::FieldValue,
    },
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Creates an in-memory `SQLite` database with the override table initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    config::database::create_tables(&db).await?;
    Ok(db)
}

/// Like [`setup_test_db`], for tests that hand the same database to several components.
pub async fn setup_shared_test_db() -> Result<Arc<DatabaseConnection>> {
    Ok(Arc::new(setup_test_db().await?))
}

/// Routes log output to the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates a default-translation product of the `default` bundle with a plain title.
pub fn test_product(id: EntityId, title: &str) -> ContentRecord {
    ContentRecord::new("product", id, "default").with_field("title", title)
}

/// A text field value as stored by a title widget.
pub fn title_value(value: &str) -> FieldValue {
    [("value", value)].into_iter().collect()
}

/// A formatted text field value.
pub fn body_value(value: &str) -> FieldValue {
    [("value", value), ("format", "basic_html")]
        .into_iter()
        .collect()
}

const TEST_SCHEMA: &str = r#"
[[entity_types]]
id = "product"
langcode_key = "langcode"
default_langcode_key = "default_langcode"
fields = [
    { name = "product_id", label = "ID" },
    { name = "langcode", label = "Language" },
    { name = "title", label = "Title" },
    { name = "status", label = "Published" },
    { name = "stores", label = "Stores" },
    { name = "default_langcode", label = "Default translation" },
    { name = "revision_translation_affected", label = "Revision translation affected" },
    { name = "content_translation_source", label = "Translation source", provider = "content_translation" },
    { name = "content_translation_outdated", label = "Translation outdated", provider = "content_translation" },
    { name = "path", label = "URL alias", computed = true },
]

[[bundles]]
id = "default"
entity_type = "product"
fields = [
    { name = "body", label = "Body" },
    { name = "price", label = "Price" },
]
"#;

/// The product schema used across tests, with no override fields enabled.
pub fn test_schema() -> SchemaConfig {
    toml::from_str(TEST_SCHEMA).unwrap()
}

/// Enables override fields on one bundle of `schema`.
pub fn with_override_fields(
    mut schema: SchemaConfig,
    entity_type: &str,
    bundle: &str,
    fields: &[&str],
) -> SchemaConfig {
    for entry in schema
        .bundles
        .iter_mut()
        .filter(|b| b.entity_type == entity_type && b.id == bundle)
    {
        entry.override_fields = Some(fields.iter().map(ToString::to_string).collect());
    }
    schema
}

/// Store resolver that always returns the same store.
pub struct FixedStore(pub Option<ContextId>);

impl CurrentContext for FixedStore {
    fn current_context(&self) -> Option<ContextId> {
        self.0
    }
}

/// Route matcher that always returns the same route.
pub struct FixedRoute(pub Option<RouteInfo>);

impl CurrentRoute for FixedRoute {
    fn current_route(&self) -> Option<RouteInfo> {
        self.0.clone()
    }
}

/// The product display route.
pub fn canonical_route() -> RouteInfo {
    RouteInfo::display("entity.product.canonical")
}

/// Creates a manager on the test schema for a fixed store and route.
pub fn test_manager(
    db: Arc<DatabaseConnection>,
    store: Option<ContextId>,
    route: Option<RouteInfo>,
) -> StoreOverrideManager {
    test_manager_with_schema(db, store, route, test_schema())
}

/// Creates a manager for a fixed store and route with a custom schema.
pub fn test_manager_with_schema(
    db: Arc<DatabaseConnection>,
    store: Option<ContextId>,
    route: Option<RouteInfo>,
    schema: SchemaConfig,
) -> StoreOverrideManager {
    let schema = Arc::new(schema);
    let field_schema: Arc<dyn FieldSchema> = Arc::<SchemaConfig>::clone(&schema);
    StoreOverrideManager::new(
        Arc::new(FixedStore(store)),
        Arc::new(FixedRoute(route)),
        StoreOverrideRepository::shared(db),
        field_schema,
        schema,
    )
}
