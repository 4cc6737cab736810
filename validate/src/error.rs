//! Error types for compilation, validation and configuration loading.

use thiserror::Error;

use crate::issue::ValidationIssue;

/// A schema that cannot be turned into a validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A `pattern` or `patternProperties` key is not a valid regex.
    #[error("invalid pattern '{pattern}' at {schema_path}: {reason}")]
    InvalidPattern {
        schema_path: String,
        pattern: String,
        reason: String,
    },
    /// Strict mode: the format name is not supported.
    #[error("unknown format '{format}' at {schema_path}")]
    UnknownFormat { schema_path: String, format: String },
    /// Strict mode: `required` names a property that is not declared.
    #[error("required property '{name}' is not declared at {schema_path}")]
    UndeclaredRequired { schema_path: String, name: String },
    /// Strict mode: an optional property declares a default.
    #[error("optional property '{name}' declares a default at {schema_path}")]
    DefaultOnOptional { schema_path: String, name: String },
    /// Strict mode: a lower bound exceeds its upper bound.
    #[error("{keyword} bounds are inverted at {schema_path}")]
    InvertedBounds {
        schema_path: String,
        keyword: &'static str,
    },
}

/// Failure returned by [`Schema::validate`](crate::Schema::validate) and
/// friends.
#[derive(Debug, Error)]
pub enum SchemaValidationError {
    /// The value does not satisfy the schema. `message` is the formatted
    /// multi-issue text; `issues` the structured list behind it.
    #[error("{message}")]
    Invalid {
        message: String,
        issues: Vec<ValidationIssue>,
    },
    /// The schema itself could not be compiled.
    #[error("schema compilation failed: {0}")]
    Compile(#[from] CompileError),
    /// The validated value does not fit the requested Rust type.
    #[error("validated value does not match the target type: {0}")]
    Deserialize(#[from] serde_json::Error),
}

impl SchemaValidationError {
    /// Returns the structured issues, empty for non-validation failures.
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            SchemaValidationError::Invalid { issues, .. } => issues,
            _ => &[],
        }
    }
}

/// Errors loading a [`ValidationOptions`](crate::ValidationOptions) file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Convenience alias for results with [`SchemaValidationError`].
pub type Result<T> = std::result::Result<T, SchemaValidationError>;
