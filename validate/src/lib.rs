//! Runtime validation for shape-schema nodes.
//!
//! A [`Schema`] wraps a [`SchemaNode`](shape_schema_core::SchemaNode) and
//! compiles it into a [`Validator`] on first use. Validation runs in place:
//! it can coerce scalars, fill defaults for missing required properties and
//! strip properties a closed object does not permit. Failures carry a single
//! deterministic message built by [`format_issues`] together with the
//! structured [`ValidationIssue`] list behind it.
//!
//! Options come from [`ValidationOptions`], either pinned on a schema with
//! [`Schema::configure_validation`] or inherited from a
//! [`ValidationContext`].
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use shape_schema_core::SchemaNode;
//! use shape_schema_validate::{Schema, ValidationOverrides};
//!
//! let schema = Schema::new(
//!     SchemaNode::object()
//!         .add_property("name", SchemaNode::string(), true, false)?
//!         .add_property("progress", SchemaNode::number(), true, false)?,
//! )
//! .configure_validation(ValidationOverrides {
//!     all_errors: Some(false),
//!     ..Default::default()
//! });
//!
//! let err = schema.validate_value(json!({})).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "Invalid parameters: data must have required property 'name'"
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod coerce;
mod compile;
pub mod error;
mod formats;
pub mod issue;
pub mod options;
mod schema;
mod validator;

pub use error::{CompileError, ConfigError, Result, SchemaValidationError};
pub use issue::{format_issues, Keyword, ValidationIssue, ISSUE_SEPARATOR, MESSAGE_PREFIX};
pub use options::{ValidationContext, ValidationOptions, ValidationOverrides};
pub use schema::Schema;
pub use validator::Validator;
