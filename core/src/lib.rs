//! Schema node model and composition combinators.
//!
//! This crate defines the structural data-shape description used by the
//! rest of the workspace:
//!
//! - [`SchemaNode`]: one constraint fragment (type tag, facets, nested
//!   fragments, metadata) with JSON Schema keyword serialization.
//! - Property combinators: add, remove, rename, pick, omit, requiredness
//!   toggles, union transforms, additional and pattern properties.
//! - Combinators: [`SchemaNode::one_of`], [`SchemaNode::all_of`],
//!   [`SchemaNode::any_of`], [`SchemaNode::not`].
//! - Merging ([`merge_schemas`]) of two property sets under a
//!   [`MergeStrategy`].
//!
//! Every structural operation consumes the node and returns a new one, or a
//! [`SchemaBuilderError`] when its precondition does not hold.
//!
//! # Example
//!
//! ```
//! use shape_schema_core::*;
//!
//! let task = SchemaNode::object()
//!     .add_property("name", SchemaNode::string(), true, false)?
//!     .add_property("progress", SchemaNode::number(), true, false)?
//!     .add_property("isCompleted", SchemaNode::boolean(), false, false)?;
//!
//! let draft = task.clone().to_optionals();
//! assert!(draft.required.is_none());
//!
//! let summary = task.pick_properties(&["name"])?;
//! assert_eq!(summary.property_names(), vec!["name"]);
//! # Ok::<(), SchemaBuilderError>(())
//! ```

mod builder;
mod combinator;
mod error;
mod merge;
mod node;

pub use builder::{MetadataOverrides, PropertySpec};
pub use error::{Result, SchemaBuilderError};
pub use merge::{MergeStrategy, merge_schemas};
pub use node::{
    AdditionalProperties, ArrayConstraints, Metadata, NumberConstraints, ObjectConstraints,
    SchemaNode, SchemaType, StringConstraints,
};
