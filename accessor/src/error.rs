//! Accessor error type.

use shape_schema_core::SchemaBuilderError;
use thiserror::Error;

/// Failures raised while building or using an accessor.
#[derive(Debug, Error)]
pub enum AccessorError {
    /// `set` was called on a transformed accessor that has no inverse
    /// mapping.
    #[error("cannot set '{path}': transform has no inverse mapping")]
    NoInverseMapping { path: String },

    /// `narrow` was called without a schema transform on an accessor that
    /// carries a schema.
    #[error("narrowing '{path}' requires a schema transform")]
    NarrowWithoutTransform { path: String },

    /// A union branch index that does not exist.
    #[error("'{path}' has no union branch {index}")]
    NoSuchBranch { path: String, index: usize },

    /// `set` met a scalar where the path needs an object or array.
    #[error("cannot step into {found} at '{path}'")]
    NotAContainer { path: String, found: &'static str },

    /// `set` would pad an array with more than
    /// [`MAX_ARRAY_PADDING`](crate::MAX_ARRAY_PADDING) nulls.
    #[error("index {index} at '{path}' is too far past the end of an array of length {len}")]
    IndexTooFar { path: String, index: usize, len: usize },

    /// A path string could not be parsed.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A schema transform failed.
    #[error(transparent)]
    Schema(#[from] SchemaBuilderError),

    /// The value at the path does not deserialize into the requested type.
    #[error("value does not match the requested type: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Convenience alias for results with [`AccessorError`].
pub type Result<T> = std::result::Result<T, AccessorError>;
