//! Immutable, path-based access to schema-shaped data.
//!
//! An [`Accessor`] is a path built step by step with [`Accessor::at`] (or
//! parsed from text such as `a[0].n`) that can read and write a
//! [`SharedValue`]. Writes never modify the input: they return a new root in
//! which only the containers along the path are copied.
//!
//! An accessor built with [`Accessor::for_schema`] carries the
//! [`SchemaNode`](shape_schema_core::SchemaNode) for its current position.
//! Union positions can be narrowed to one branch with [`Accessor::narrow`].
//! [`Accessor::transform`] maps values on the way in and out.

mod accessor;
pub mod error;
pub mod path;
pub mod value;

pub use accessor::{Accessor, MAX_ARRAY_PADDING, Transformed};
pub use error::{AccessorError, Result};
pub use path::{parse_path, render_path, PathSegment};
pub use value::SharedValue;
