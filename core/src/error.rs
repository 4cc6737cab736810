//! Builder error type.
//!
//! Every combinator checks its structural preconditions before touching the
//! node and reports violations through [`SchemaBuilderError`]. These are
//! schema-definition bugs: they are never retried and never downgraded.

use thiserror::Error;

/// Structural precondition violations raised by schema combinators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaBuilderError {
    /// The operation needs an object schema.
    #[error("{operation} requires an object schema")]
    NotObjectSchema { operation: &'static str },
    /// The operation needs an object schema with closed additional
    /// properties and no combination keywords.
    #[error(
        "{operation} requires a simple object schema (no additional properties, no oneOf/allOf/anyOf/not)"
    )]
    NotSimpleObjectSchema { operation: &'static str },
    /// The operation cannot see through `oneOf`/`allOf`/`anyOf`/`not`.
    #[error("{operation} cannot be applied to a schema with oneOf/allOf/anyOf/not")]
    CombinationKeywords { operation: &'static str },
    /// A property with this name is already declared.
    #[error("property '{0}' already exists")]
    DuplicateProperty(String),
    /// A named property is not declared.
    #[error("property '{0}' does not exist")]
    MissingProperty(String),
    /// Additional properties were already enabled on this schema.
    #[error("additional properties are already allowed on this schema")]
    AdditionalPropertiesAlreadySet,
    /// An N-ary combinator received too few operands.
    #[error("{combinator} requires at least {min} schemas, got {actual}")]
    TooFewSchemas {
        combinator: &'static str,
        min: usize,
        actual: usize,
    },
    /// The node has no `items` schema.
    #[error("schema is not an array schema")]
    NotArraySchema,
    /// A pattern property does not compile as a regular expression.
    #[error("invalid property pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    /// A raw document could not be read as a schema node.
    #[error("invalid schema document: {0}")]
    InvalidDocument(String),
}

/// Convenience alias for results with [`SchemaBuilderError`].
pub type Result<T> = std::result::Result<T, SchemaBuilderError>;
