//! Application configuration loaded from config.toml

/// Database configuration and connection management
pub mod database;

/// Entity type and bundle definitions
pub mod schema;

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::env::VarError;
use std::path::Path;

pub use schema::SchemaConfig;

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_VAR: &str = "STORE_OVERRIDE_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Database URL, overridden by `DATABASE_URL`
    #[serde(default)]
    pub database_url: Option<String>,
    /// Content types and their override settings
    #[serde(flatten)]
    pub schema: SchemaConfig,
}

/// Loads the application configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the configuration from `STORE_OVERRIDE_CONFIG`, or ./config.toml if unset
///
/// # Errors
/// Returns an error if the variable is not valid unicode or the file cannot be loaded.
pub fn load_default_config() -> Result<AppConfig> {
    let path = match std::env::var(CONFIG_PATH_VAR) {
        Ok(path) => path,
        Err(VarError::NotPresent) => "config.toml".to_string(),
        Err(e) => return Err(e.into()),
    };
    load_config(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::schema::OverrideFieldConfig;

    #[test]
    fn test_parse_app_config() {
        let toml_str = r#"
            database_url = "sqlite::memory:"

            [[entity_types]]
            id = "product"
            langcode_key = "langcode"
            default_langcode_key = "default_langcode"
            fields = [
                { name = "title", label = "Title" },
                { name = "langcode", label = "Language" },
            ]

            [[bundles]]
            id = "default"
            entity_type = "product"
            fields = [{ name = "body", label = "Body" }]
            override_fields = ["title", "body"]
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.database_url.as_deref(), Some("sqlite::memory:"));
        assert_eq!(config.schema.entity_types.len(), 1);
        assert_eq!(config.schema.bundles.len(), 1);

        let bundle = config.schema.bundle_definition("product", "default").unwrap();
        assert_eq!(
            config.schema.override_fields(&bundle),
            Some(vec!["title".to_string(), "body".to_string()])
        );
    }

    #[test]
    fn test_empty_config() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.database_url.is_none());
        assert!(config.schema.bundle_definitions().is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("does/not/exist/config.toml");
        assert!(matches!(result.unwrap_err(), Error::Config { .. }));
    }

    #[test]
    fn test_load_invalid_file() {
        let path = std::env::temp_dir().join(format!(
            "store_override_invalid_config_{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[[bundles]]\nentity_type = 3\n").unwrap();

        let result = load_config(&path);
        assert!(matches!(result.unwrap_err(), Error::Config { .. }));
        std::fs::remove_file(path).unwrap();
    }
}
