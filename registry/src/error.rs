//! Error types for registry loading and dereferencing.

use shape_schema_core::SchemaBuilderError;
use thiserror::Error;

/// Errors that can occur while loading or resolving schemas.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// All configured loader sources failed.
    #[error("no schema sources available")]
    NoSourcesAvailable,

    /// No document is registered under this name.
    #[error("unknown schema '{0}'")]
    UnknownSchema(String),

    /// A `$ref` points at nothing.
    #[error("unresolved reference '{0}'")]
    UnresolvedRef(String),

    /// A `$ref` leads back to itself.
    #[error("reference cycle through '{0}'")]
    RefCycle(String),

    /// The resolved document is not a valid schema node.
    #[error(transparent)]
    Schema(#[from] SchemaBuilderError),
}

/// Convenience alias for results with [`RegistryError`].
pub type Result<T> = std::result::Result<T, RegistryError>;
