//! Named schema documents and `$ref` resolution.
//!
//! Schemas often arrive as JSON or YAML files that reference each other.
//! [`SchemaRegistry`] loads such documents from a directory or a
//! [`SchemaBundle`], inlines their references and hands out ready
//! [`SchemaNode`](shape_schema_core::SchemaNode)s for the builder and the
//! validator.

mod bundle;
mod deref;
pub mod error;
mod registry;

pub use bundle::SchemaBundle;
pub use error::{RegistryError, Result};
pub use registry::{RegistryBuilder, RegistrySource, SchemaRegistry};
