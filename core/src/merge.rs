//! Property-set merging with configurable conflict resolution.
//!
//! Two simple object schemas are combined into one by [`merge_schemas`],
//! using a [`MergeStrategy`] to decide what happens when both declare the
//! same property. The base keeps its metadata and property order; new
//! overlay properties are appended.
//!
//! # Example
//!
//! ```
//! use shape_schema_core::*;
//!
//! let base = SchemaNode::object().add_property("id", SchemaNode::integer(), true, false)?;
//! let overlay = SchemaNode::object()
//!     .add_property("id", SchemaNode::string(), false, false)?
//!     .add_property("name", SchemaNode::string(), false, false)?;
//!
//! let merged = merge_schemas(base, overlay, MergeStrategy::Merge)?;
//! assert_eq!(merged.property_names(), vec!["id", "name"]);
//! assert!(merged.get_subschema("id")?.any_of.is_some());
//! assert!(merged.is_required("id"));
//! # Ok::<(), SchemaBuilderError>(())
//! ```

use crate::error::Result;
use crate::node::SchemaNode;

/// Conflict resolution for properties declared on both sides.
///
/// Under `Intersect` and `Merge` a property required on either side is
/// required in the result, even when the side whose type is kept did not
/// require it.
///
/// # Examples
///
/// ```
/// use shape_schema_core::*;
///
/// let base = SchemaNode::object()
///     .add_property("n", SchemaNode::integer().with_minimum(0.0), true, false)?;
/// let overlay = SchemaNode::object().add_property("n", SchemaNode::integer(), false, false)?;
///
/// // Same kind: intersect keeps the base type.
/// let i = merge_schemas(base.clone(), overlay.clone(), MergeStrategy::Intersect)?;
/// assert_eq!(i.get_subschema("n")?.number.minimum, Some(0.0));
///
/// // Merge unions any two different nodes.
/// let m = merge_schemas(base.clone(), overlay.clone(), MergeStrategy::Merge)?;
/// assert!(m.get_subschema("n")?.any_of.is_some());
///
/// // Overwrite lets the overlay win outright.
/// let o = merge_schemas(base, overlay, MergeStrategy::Overwrite)?;
/// assert_eq!(o.get_subschema("n")?, &SchemaNode::integer());
/// assert!(!o.is_required("n"));
/// # Ok::<(), SchemaBuilderError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Union the two types only when their kinds differ.
    Intersect,
    /// Union the two types whenever they differ.
    Merge,
    /// Overlay type and requiredness replace the base.
    Overwrite,
}

impl MergeStrategy {
    fn operation(&self) -> &'static str {
        match self {
            MergeStrategy::Intersect => "intersect_properties",
            MergeStrategy::Merge => "merge_properties",
            MergeStrategy::Overwrite => "overwrite_properties",
        }
    }
}

/// Combines the property sets of two simple object schemas.
///
/// # Errors
///
/// Returns [`NotSimpleObjectSchema`](crate::SchemaBuilderError::NotSimpleObjectSchema)
/// if either side is not a simple object schema.
pub fn merge_schemas(
    base: SchemaNode,
    overlay: SchemaNode,
    strategy: MergeStrategy,
) -> Result<SchemaNode> {
    let operation = strategy.operation();
    base.ensure_simple_object(operation)?;
    overlay.ensure_simple_object(operation)?;

    let mut merged = base;
    let overlay_required: Vec<String> = overlay.required_names().to_vec();

    for (name, incoming) in overlay.properties {
        let incoming_required = overlay_required.contains(&name);
        let Some(existing) = merged.properties.get_mut(&name) else {
            merged.properties.insert(name.clone(), incoming);
            if incoming_required {
                merged.mark_required(&name);
            }
            continue;
        };

        match strategy {
            MergeStrategy::Intersect => {
                if existing.kind != incoming.kind {
                    *existing = union_of(std::mem::take(existing), incoming);
                }
            }
            MergeStrategy::Merge => {
                if *existing != incoming {
                    *existing = union_of(std::mem::take(existing), incoming);
                }
            }
            MergeStrategy::Overwrite => {
                *existing = incoming;
                if !incoming_required {
                    merged.unmark_required(&name);
                }
            }
        }
        if incoming_required {
            merged.mark_required(&name);
        }
    }

    Ok(merged)
}

/// `anyOf`, so a value accepted by both sides still passes.
fn union_of(first: SchemaNode, second: SchemaNode) -> SchemaNode {
    SchemaNode {
        any_of: Some(vec![first, second]),
        ..Default::default()
    }
}

impl SchemaNode {
    /// Shorthand for [`merge_schemas`] with [`MergeStrategy::Intersect`].
    pub fn intersect_properties(self, other: SchemaNode) -> Result<Self> {
        merge_schemas(self, other, MergeStrategy::Intersect)
    }

    /// Shorthand for [`merge_schemas`] with [`MergeStrategy::Merge`].
    pub fn merge_properties(self, other: SchemaNode) -> Result<Self> {
        merge_schemas(self, other, MergeStrategy::Merge)
    }

    /// Shorthand for [`merge_schemas`] with [`MergeStrategy::Overwrite`].
    pub fn overwrite_properties(self, other: SchemaNode) -> Result<Self> {
        merge_schemas(self, other, MergeStrategy::Overwrite)
    }
}
