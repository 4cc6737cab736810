//! Schema combinators and requiredness/nullability modifiers.
//!
//! `oneOf`, `allOf`, `anyOf` and `not` wrap existing nodes in a combination
//! node. The modifiers walk a node tree and relax it: dropping required
//! markers (with their defaults) or admitting `null`.

use crate::error::{Result, SchemaBuilderError};
use crate::node::{AdditionalProperties, SchemaNode};

fn check_arity(combinator: &'static str, schemas: &[SchemaNode], min: usize) -> Result<()> {
    if schemas.len() < min {
        return Err(SchemaBuilderError::TooFewSchemas {
            combinator,
            min,
            actual: schemas.len(),
        });
    }
    Ok(())
}

impl SchemaNode {
    /// Value must match exactly one of `schemas` (type-level union).
    ///
    /// # Examples
    ///
    /// ```
    /// use shape_schema_core::{SchemaBuilderError, SchemaNode};
    ///
    /// let id = SchemaNode::one_of(vec![SchemaNode::string(), SchemaNode::integer()])?;
    /// assert_eq!(id.one_of.as_ref().map(Vec::len), Some(2));
    ///
    /// let err = SchemaNode::one_of(vec![SchemaNode::string()]).unwrap_err();
    /// assert!(matches!(err, SchemaBuilderError::TooFewSchemas { min: 2, actual: 1, .. }));
    /// # Ok::<(), SchemaBuilderError>(())
    /// ```
    pub fn one_of(schemas: Vec<SchemaNode>) -> Result<Self> {
        check_arity("oneOf", &schemas, 2)?;
        Ok(Self {
            one_of: Some(schemas),
            ..Default::default()
        })
    }

    /// Value must match every one of `schemas` (type-level intersection).
    pub fn all_of(schemas: Vec<SchemaNode>) -> Result<Self> {
        check_arity("allOf", &schemas, 2)?;
        Ok(Self {
            all_of: Some(schemas),
            ..Default::default()
        })
    }

    /// Value must match at least one of `schemas`.
    pub fn any_of(schemas: Vec<SchemaNode>) -> Result<Self> {
        check_arity("anyOf", &schemas, 2)?;
        Ok(Self {
            any_of: Some(schemas),
            ..Default::default()
        })
    }

    /// Value must not match `schema`.
    pub fn not(schema: SchemaNode) -> Self {
        Self {
            not: Some(Box::new(schema)),
            ..Default::default()
        }
    }

    /// Clears the top-level required marker and strips property defaults.
    pub fn to_optionals(mut self) -> Self {
        self.required = None;
        for child in self.properties.values_mut() {
            child.default = None;
        }
        self
    }

    /// [`to_optionals`](Self::to_optionals) applied to every object node
    /// reachable through properties, items and combination branches.
    ///
    /// # Examples
    ///
    /// ```
    /// use shape_schema_core::SchemaNode;
    ///
    /// let inner = SchemaNode::object().add_property("n", SchemaNode::integer(), true, false)?;
    /// let outer = SchemaNode::object()
    ///     .add_property("list", SchemaNode::array(inner), true, false)?
    ///     .to_deep_optionals();
    ///
    /// assert!(outer.required.is_none());
    /// let items = outer.get_subschema("list")?.get_items_subschema()?;
    /// assert!(items.required.is_none());
    /// # Ok::<(), shape_schema_core::SchemaBuilderError>(())
    /// ```
    pub fn to_deep_optionals(self) -> Self {
        self.map_children(SchemaNode::to_deep_optionals)
            .to_optionals()
    }

    /// Admits `null` on this node unless it already does, directly or through
    /// a union branch.
    pub fn to_nullable(mut self) -> Self {
        if !self.admits_null() {
            self.nullable = true;
        }
        self
    }

    /// [`to_nullable`](Self::to_nullable) applied to this node and every node
    /// reachable through properties and items. Union branches are left alone:
    /// the union node itself becomes nullable.
    pub fn to_deep_nullable(self) -> Self {
        let node = if self.has_schema_combination_keywords() {
            self
        } else {
            self.map_children(SchemaNode::to_deep_nullable)
        };
        node.to_nullable()
    }

    fn admits_null(&self) -> bool {
        let branch_admits = |branches: &Option<Vec<SchemaNode>>| {
            branches
                .as_ref()
                .is_some_and(|nodes| nodes.iter().any(SchemaNode::accepts_null))
        };
        self.accepts_null() || branch_admits(&self.one_of) || branch_admits(&self.any_of)
    }

    /// Rebuilds every direct child node with `f`. Scalar leaves have no
    /// children, which ends the recursion.
    pub(crate) fn map_children(mut self, f: fn(SchemaNode) -> SchemaNode) -> Self {
        let map_all = |nodes: Vec<SchemaNode>| nodes.into_iter().map(f).collect::<Vec<_>>();

        self.properties = self
            .properties
            .into_iter()
            .map(|(name, child)| (name, f(child)))
            .collect();
        self.pattern_properties = self
            .pattern_properties
            .into_iter()
            .map(|(pattern, child)| (pattern, f(child)))
            .collect();
        self.additional_properties = match self.additional_properties {
            Some(AdditionalProperties::Schema(child)) => {
                Some(AdditionalProperties::Schema(Box::new(f(*child))))
            }
            other => other,
        };
        self.items = self.items.map(|child| Box::new(f(*child)));
        self.one_of = self.one_of.map(map_all);
        self.all_of = self.all_of.map(map_all);
        self.any_of = self.any_of.map(map_all);
        self.not = self.not.map(|child| Box::new(f(*child)));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested() -> SchemaNode {
        let leaf = SchemaNode::object()
            .add_property("n", SchemaNode::integer().with_default(1), true, false)
            .unwrap();
        SchemaNode::object()
            .add_property("leaf", leaf.clone(), true, false)
            .unwrap()
            .add_property("many", SchemaNode::array(leaf.clone()), true, false)
            .unwrap()
            .add_property(
                "either",
                SchemaNode::one_of(vec![leaf, SchemaNode::string()]).unwrap(),
                true,
                false,
            )
            .unwrap()
    }

    #[test]
    fn test_arity_checks() {
        assert!(SchemaNode::all_of(vec![SchemaNode::string()]).is_err());
        assert!(SchemaNode::any_of(Vec::new()).is_err());
        assert!(SchemaNode::any_of(vec![SchemaNode::string(), SchemaNode::null()]).is_ok());
        assert!(SchemaNode::not(SchemaNode::null()).not.is_some());
    }

    #[test]
    fn test_to_optionals_is_shallow() {
        let node = nested().to_optionals();
        assert!(node.required.is_none());
        assert!(node.properties["leaf"].is_required("n"));
    }

    #[test]
    fn test_to_deep_optionals_reaches_items_and_branches() {
        let node = nested().to_deep_optionals();
        assert!(node.properties["leaf"].required.is_none());
        assert!(node.properties["leaf"].properties["n"].default.is_none());
        assert!(node.properties["many"].items.as_ref().unwrap().required.is_none());
        let branch = &node.properties["either"].one_of.as_ref().unwrap()[0];
        assert!(branch.required.is_none());
    }

    #[test]
    fn test_to_nullable_skips_unions_with_null() {
        let union = SchemaNode::one_of(vec![SchemaNode::string(), SchemaNode::null()]).unwrap();
        assert!(!union.to_nullable().nullable);

        let union = SchemaNode::one_of(vec![SchemaNode::string(), SchemaNode::integer()]).unwrap();
        assert!(union.to_nullable().nullable);
    }

    #[test]
    fn test_to_deep_nullable() {
        let node = nested().to_deep_nullable();
        assert!(node.nullable);
        assert!(node.properties["leaf"].properties["n"].nullable);
        assert!(node.properties["many"].items.as_ref().unwrap().nullable);
        let either = &node.properties["either"];
        assert!(either.nullable);
        assert!(!either.one_of.as_ref().unwrap()[1].nullable);
    }
}
