use dotenvy::dotenv;
use std::sync::Arc;
use store_override::config::{self, SchemaConfig, database};
use store_override::core::StoreOverrideManager;
use store_override::core::context::{CurrentContext, CurrentRoute, RouteInfo};
use store_override::core::entity::ContextId;
use store_override::core::repository::StoreOverrideRepository;
use store_override::core::schema::{FieldSchema, unknown_enabled_fields};
use store_override::errors::Result;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// The provisioning run has no request, so no store is active.
struct NoStore;

impl CurrentContext for NoStore {
    fn current_context(&self) -> Option<ContextId> {
        None
    }
}

/// Provisioning runs as an administrative operation.
struct AdminRoute;

impl CurrentRoute for AdminRoute {
    fn current_route(&self) -> Option<RouteInfo> {
        Some(RouteInfo::admin("store_override.provision"))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = config::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    info!(
        "Loaded configuration with {} bundles.",
        app_config.schema.bundles.len()
    );

    // 4. Connect and provision the override table
    let database_url = database::get_database_url(app_config.database_url.as_deref());
    let db = database::create_connection(&database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Store override table is ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Report which fields each bundle can override
    let schema = Arc::new(app_config.schema);
    let field_schema: Arc<dyn FieldSchema> = Arc::<SchemaConfig>::clone(&schema);
    let manager = StoreOverrideManager::new(
        Arc::new(NoStore),
        Arc::new(AdminRoute),
        StoreOverrideRepository::new(db),
        field_schema,
        Arc::<SchemaConfig>::clone(&schema),
    );

    for bundle in schema.bundle_definitions() {
        let allowed = manager.allowed_fields(&bundle).await;
        let enabled = manager.enabled_fields(&bundle);
        let allowed_names: Vec<&str> = allowed.iter().map(|f| f.name.as_str()).collect();

        info!(
            "{}.{}: allowed [{}], enabled [{}]",
            bundle.entity_type,
            bundle.id,
            allowed_names.join(", "),
            enabled.join(", ")
        );
        for field in unknown_enabled_fields(&allowed, &enabled) {
            warn!(
                "{}.{}: field {} is enabled but cannot be overridden",
                bundle.entity_type, bundle.id, field
            );
        }
    }

    Ok(())
}
