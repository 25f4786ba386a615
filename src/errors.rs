//! Error types for the override subsystem.
//!
//! Construction problems are reported through [`ValidationError`] and wrapped in the crate-wide
//! [`Error`]. Persistence and encoding failures are propagated unchanged from `SeaORM` and
//! `serde_json`.

use thiserror::Error;

/// Malformed input when building a [`StoreOverride`](crate::core::StoreOverride).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required property was absent (or zero for numeric ids).
    #[error("Missing required property {property}.")]
    MissingProperty {
        /// Name of the missing property
        property: &'static str,
    },

    /// The entity type is not one the override system supports.
    #[error("Unsupported entity type {entity_type}.")]
    UnsupportedEntityType {
        /// The rejected entity type id
        entity_type: String,
    },

    /// The `data` property was supplied but is not a mapping.
    #[error("The data property must be a mapping.")]
    InvalidData,
}

/// Unified error type for the crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unexpected entity type {actual}, expected {expected}.")]
    TypeMismatch { expected: String, actual: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Override data encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Entity hooks are already wired to an override manager")]
    AlreadyWired,

    #[error("Entity hooks have not been wired to an override manager")]
    NotWired,
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
