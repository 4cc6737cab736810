//! Property-level combinators.
//!
//! These operations reshape the property set of an object schema: add,
//! remove, rename, pick, omit, toggle requiredness, wrap property types in
//! unions and enable additional or pattern properties. Each one consumes the
//! node, checks its structural precondition first, and returns the reshaped
//! node or a [`SchemaBuilderError`].
//!
//! # Example
//!
//! ```
//! use shape_schema_core::{PropertySpec, SchemaNode};
//!
//! let node = SchemaNode::object().add_properties([
//!     ("id", PropertySpec::from(SchemaNode::integer())),
//!     ("label", PropertySpec::Optional(SchemaNode::string())),
//! ])?;
//!
//! let renamed = node.rename_property("label", "title")?;
//! assert_eq!(renamed.property_names(), vec!["id", "title"]);
//! assert!(renamed.is_required("title"));
//! # Ok::<(), shape_schema_core::SchemaBuilderError>(())
//! ```

use std::collections::HashSet;

use regex::Regex;
use serde_json::Value;

use crate::error::{Result, SchemaBuilderError};
use crate::node::{AdditionalProperties, ArrayConstraints, SchemaNode, SchemaType};

/// Requiredness and type of one entry passed to
/// [`add_properties`](SchemaNode::add_properties).
#[derive(Debug, Clone, PartialEq)]
pub enum PropertySpec {
    /// Required property.
    Required(SchemaNode),
    /// Optional property.
    Optional(SchemaNode),
    /// Optional property accepting either of two types.
    OptionalUnion(SchemaNode, SchemaNode),
}

impl From<SchemaNode> for PropertySpec {
    fn from(node: SchemaNode) -> Self {
        PropertySpec::Required(node)
    }
}

/// Metadata fields to overwrite in [`clone_with`](SchemaNode::clone_with).
/// Unset fields leave the source value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataOverrides {
    pub title: Option<String>,
    pub description: Option<String>,
    pub examples: Option<Vec<Value>>,
    pub deprecated: Option<bool>,
    pub read_only: Option<bool>,
    pub write_only: Option<bool>,
}

impl SchemaNode {
    pub(crate) fn ensure_object(&self, operation: &'static str) -> Result<()> {
        if self.is_object_schema() {
            Ok(())
        } else {
            Err(SchemaBuilderError::NotObjectSchema { operation })
        }
    }

    pub(crate) fn ensure_simple_object(&self, operation: &'static str) -> Result<()> {
        if self.is_simple_object_schema() {
            Ok(())
        } else {
            Err(SchemaBuilderError::NotSimpleObjectSchema { operation })
        }
    }

    fn ensure_no_combination(&self, operation: &'static str) -> Result<()> {
        if self.has_schema_combination_keywords() {
            return Err(SchemaBuilderError::CombinationKeywords { operation });
        }
        self.ensure_object(operation)
    }

    fn ensure_declared<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        match names
            .iter()
            .find(|name| !self.properties.contains_key(name.as_ref()))
        {
            Some(missing) => Err(SchemaBuilderError::MissingProperty(
                missing.as_ref().to_string(),
            )),
            None => Ok(()),
        }
    }

    /// Resolves an optional name list to concrete targets, defaulting to
    /// every declared property.
    fn resolve_targets(&self, names: Option<&[&str]>) -> Result<Vec<String>> {
        match names {
            Some(names) => {
                self.ensure_declared(names)?;
                Ok(names.iter().map(|n| n.to_string()).collect())
            }
            None => Ok(self.properties.keys().cloned().collect()),
        }
    }

    /// Adds a property.
    ///
    /// # Errors
    ///
    /// [`NotObjectSchema`](SchemaBuilderError::NotObjectSchema) if this is not
    /// an object schema, [`DuplicateProperty`](SchemaBuilderError::DuplicateProperty)
    /// if `name` is already declared.
    pub fn add_property(
        mut self,
        name: &str,
        child: SchemaNode,
        required: bool,
        nullable: bool,
    ) -> Result<Self> {
        self.ensure_object("add_property")?;
        if self.properties.contains_key(name) {
            return Err(SchemaBuilderError::DuplicateProperty(name.to_string()));
        }

        let child = if nullable { child.nullable() } else { child };
        self.properties.insert(name.to_string(), child);
        if required {
            self.mark_required(name);
        }
        Ok(self)
    }

    /// Adds several properties at once.
    ///
    /// All names are checked before any property is inserted.
    pub fn add_properties<I, K, P>(mut self, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: Into<PropertySpec>,
    {
        self.ensure_object("add_properties")?;
        let entries: Vec<(String, PropertySpec)> = entries
            .into_iter()
            .map(|(name, spec)| (name.into(), spec.into()))
            .collect();

        let mut seen = HashSet::new();
        for (name, _) in &entries {
            if self.properties.contains_key(name) || !seen.insert(name.as_str()) {
                return Err(SchemaBuilderError::DuplicateProperty(name.clone()));
            }
        }

        for (name, spec) in entries {
            let (child, required) = match spec {
                PropertySpec::Required(node) => (node, true),
                PropertySpec::Optional(node) => (node, false),
                PropertySpec::OptionalUnion(node, alternate) => {
                    (SchemaNode::any_of(vec![node, alternate])?, false)
                }
            };
            if required {
                self.mark_required(&name);
            }
            self.properties.insert(name, child);
        }
        Ok(self)
    }

    /// Removes a declared property.
    pub fn remove_property(mut self, name: &str) -> Result<Self> {
        self.ensure_no_combination("remove_property")?;
        self.ensure_declared(&[name])?;
        self.properties.shift_remove(name);
        self.unmark_required(name);
        Ok(self)
    }

    /// Makes the named properties optional and strips their defaults.
    pub fn set_optional_properties(mut self, names: &[&str]) -> Result<Self> {
        self.ensure_simple_object("set_optional_properties")?;
        self.ensure_declared(names)?;
        for name in names {
            self.unmark_required(name);
            if let Some(child) = self.properties.get_mut(*name) {
                child.default = None;
            }
        }
        Ok(self)
    }

    /// Makes the named properties required.
    pub fn set_required_properties(mut self, names: &[&str]) -> Result<Self> {
        self.ensure_simple_object("set_required_properties")?;
        self.ensure_declared(names)?;
        for name in names {
            self.mark_required(name);
        }
        Ok(self)
    }

    /// Renames `old` to `new` in place; the renamed property is required.
    pub fn rename_property(self, old: &str, new: &str) -> Result<Self> {
        self.rename("rename_property", old, new, true)
    }

    /// Renames `old` to `new` in place; the renamed property is optional.
    pub fn rename_optional_property(self, old: &str, new: &str) -> Result<Self> {
        self.rename("rename_optional_property", old, new, false)
    }

    fn rename(mut self, operation: &'static str, old: &str, new: &str, required: bool) -> Result<Self> {
        self.ensure_simple_object(operation)?;
        self.ensure_declared(&[old])?;
        if old != new && self.properties.contains_key(new) {
            return Err(SchemaBuilderError::DuplicateProperty(new.to_string()));
        }

        self.properties = std::mem::take(&mut self.properties)
            .into_iter()
            .map(|(key, child)| if key == old { (new.to_string(), child) } else { (key, child) })
            .collect();
        self.unmark_required(old);
        if required {
            self.mark_required(new);
        } else if let Some(child) = self.properties.get_mut(new) {
            child.default = None;
        }
        Ok(self)
    }

    /// Keeps only the named properties and closes additional properties.
    ///
    /// # Examples
    ///
    /// ```
    /// use shape_schema_core::SchemaNode;
    ///
    /// let node = SchemaNode::object()
    ///     .add_property("a", SchemaNode::string(), true, false)?
    ///     .add_property("b", SchemaNode::string(), true, false)?
    ///     .pick_properties(&["b"])?;
    /// assert_eq!(node.property_names(), vec!["b"]);
    /// assert_eq!(node.required_names(), ["b".to_string()]);
    /// # Ok::<(), shape_schema_core::SchemaBuilderError>(())
    /// ```
    pub fn pick_properties(self, names: &[&str]) -> Result<Self> {
        let mut picked = self.pick("pick_properties", names)?;
        picked.additional_properties = Some(AdditionalProperties::Allowed(false));
        Ok(picked)
    }

    /// Keeps only the named properties.
    ///
    /// With `extra_allowed = None` the previous `additionalProperties` value
    /// is kept. With `Some(extra)` additional properties are closed and every
    /// extra name becomes an optional property governed by the previous
    /// additional-properties schema.
    pub fn pick_additional_properties(
        self,
        names: &[&str],
        extra_allowed: Option<&[&str]>,
    ) -> Result<Self> {
        let previous = self.additional_properties.clone();
        let mut picked = self.pick("pick_additional_properties", names)?;

        let Some(extra) = extra_allowed else {
            return Ok(picked);
        };

        let extra_schema = match previous {
            Some(AdditionalProperties::Allowed(false)) => None,
            Some(AdditionalProperties::Schema(node)) => Some(*node),
            Some(AdditionalProperties::Allowed(true)) | None => Some(SchemaNode::empty()),
        };
        if let Some(extra_schema) = extra_schema {
            for name in extra {
                if !picked.properties.contains_key(*name) {
                    picked
                        .properties
                        .insert(name.to_string(), extra_schema.clone());
                }
            }
        }
        picked.additional_properties = Some(AdditionalProperties::Allowed(false));
        Ok(picked)
    }

    fn pick(mut self, operation: &'static str, names: &[&str]) -> Result<Self> {
        self.ensure_no_combination(operation)?;
        self.ensure_declared(names)?;

        self.properties.retain(|key, _| names.contains(&key.as_str()));
        let required = self
            .required_names()
            .iter()
            .filter(|r| names.contains(&r.as_str()))
            .cloned()
            .collect();
        self.set_required(required);
        Ok(self)
    }

    /// Drops the named properties; names that are not declared are ignored.
    pub fn omit_properties(self, names: &[&str]) -> Result<Self> {
        self.ensure_no_combination("omit_properties")?;
        let keep: Vec<String> = self
            .properties
            .keys()
            .filter(|key| !names.contains(&key.as_str()))
            .cloned()
            .collect();
        let keep: Vec<&str> = keep.iter().map(String::as_str).collect();
        self.pick_properties(&keep)
    }

    /// Replaces each targeted property type `T` with `anyOf [T, alternate]`.
    /// `names = None` targets every declared property.
    pub fn transform_properties(mut self, alternate: &SchemaNode, names: Option<&[&str]>) -> Result<Self> {
        self.ensure_simple_object("transform_properties")?;
        for name in self.resolve_targets(names)? {
            if let Some(child) = self.properties.get_mut(&name) {
                let original = std::mem::take(child);
                *child = SchemaNode::any_of(vec![original, alternate.clone()])?;
            }
        }
        Ok(self)
    }

    /// Replaces each targeted property type `T` with `anyOf [T, T[]]`,
    /// skipping properties that are already arrays.
    pub fn transform_properties_to_array(
        mut self,
        names: Option<&[&str]>,
        constraints: Option<ArrayConstraints>,
    ) -> Result<Self> {
        self.ensure_simple_object("transform_properties_to_array")?;
        for name in self.resolve_targets(names)? {
            if let Some(child) = self.properties.get_mut(&name) {
                if child.kind == Some(SchemaType::Array) {
                    continue;
                }
                let original = std::mem::take(child);
                let mut array = SchemaNode::array(original.clone());
                if let Some(constraints) = &constraints {
                    array.array = constraints.clone();
                }
                *child = SchemaNode::any_of(vec![original, array])?;
            }
        }
        Ok(self)
    }

    /// Converse of [`transform_properties_to_array`](Self::transform_properties_to_array):
    /// collapses `anyOf [T[], T]` (either order, `oneOf` too) back to `T`.
    /// Other property types are left as they are.
    pub fn unwrap_array_properties(mut self, names: Option<&[&str]>) -> Result<Self> {
        self.ensure_simple_object("unwrap_array_properties")?;
        for name in self.resolve_targets(names)? {
            if let Some(child) = self.properties.get_mut(&name) {
                if let Some(inner) = unwrap_array_union(child) {
                    *child = inner;
                }
            }
        }
        Ok(self)
    }

    /// Replaces the type of an existing property.
    pub fn replace_property(self, name: &str, child: SchemaNode) -> Result<Self> {
        self.replace_property_with(name, |_| Ok(child))
    }

    /// Replaces the type of an existing property with the result of
    /// `transform` applied to its current type.
    ///
    /// # Examples
    ///
    /// ```
    /// use shape_schema_core::SchemaNode;
    ///
    /// let node = SchemaNode::object()
    ///     .add_property("count", SchemaNode::integer(), true, false)?
    ///     .replace_property_with("count", |child| Ok(child.with_minimum(0.0)))?;
    /// assert_eq!(node.get_subschema("count")?.number.minimum, Some(0.0));
    /// # Ok::<(), shape_schema_core::SchemaBuilderError>(())
    /// ```
    pub fn replace_property_with<F>(mut self, name: &str, transform: F) -> Result<Self>
    where
        F: FnOnce(SchemaNode) -> Result<SchemaNode>,
    {
        self.ensure_object("replace_property")?;
        let child = self
            .properties
            .get_mut(name)
            .ok_or_else(|| SchemaBuilderError::MissingProperty(name.to_string()))?;
        *child = transform(std::mem::take(child))?;
        Ok(self)
    }

    /// Replaces an existing property type, or adds a new required property.
    pub fn add_or_replace_property(mut self, name: &str, child: SchemaNode) -> Result<Self> {
        self.ensure_object("add_or_replace_property")?;
        if let Some(existing) = self.properties.get_mut(name) {
            *existing = child;
            return Ok(self);
        }
        self.add_property(name, child, true, false)
    }

    /// Opens the schema to unlisted properties, constrained by `child` when
    /// given.
    ///
    /// # Errors
    ///
    /// [`AdditionalPropertiesAlreadySet`](SchemaBuilderError::AdditionalPropertiesAlreadySet)
    /// if additional properties are already allowed.
    pub fn add_additional_properties(mut self, child: Option<SchemaNode>) -> Result<Self> {
        self.ensure_object("add_additional_properties")?;
        if self.has_additional_properties() {
            return Err(SchemaBuilderError::AdditionalPropertiesAlreadySet);
        }
        self.additional_properties = Some(match child {
            Some(node) => AdditionalProperties::Schema(Box::new(node)),
            None => AdditionalProperties::Allowed(true),
        });
        Ok(self)
    }

    /// Adds a rule for property names matching `^<prefix><pattern_suffix>`.
    /// `prefix` is matched literally; `pattern_suffix` is a regular expression.
    ///
    /// # Examples
    ///
    /// ```
    /// use shape_schema_core::SchemaNode;
    ///
    /// let node = SchemaNode::object()
    ///     .add_pattern_property("ext_", ".+", SchemaNode::string())?;
    /// assert!(node.pattern_properties.contains_key("^ext_.+"));
    /// # Ok::<(), shape_schema_core::SchemaBuilderError>(())
    /// ```
    pub fn add_pattern_property(
        mut self,
        prefix: &str,
        pattern_suffix: &str,
        child: SchemaNode,
    ) -> Result<Self> {
        self.ensure_simple_object("add_pattern_property")?;
        let pattern = format!("^{}{}", regex::escape(prefix), pattern_suffix);
        if let Err(err) = Regex::new(&pattern) {
            return Err(SchemaBuilderError::InvalidPattern {
                pattern,
                reason: err.to_string(),
            });
        }
        if self.pattern_properties.contains_key(&pattern) {
            return Err(SchemaBuilderError::DuplicateProperty(pattern));
        }
        self.pattern_properties.insert(pattern, child);
        Ok(self)
    }

    /// Deep copy with selected metadata replaced.
    pub fn clone_with(&self, overrides: MetadataOverrides) -> Self {
        let mut copy = self.clone();
        let metadata = &mut copy.metadata;
        if let Some(title) = overrides.title {
            metadata.title = Some(title);
        }
        if let Some(description) = overrides.description {
            metadata.description = Some(description);
        }
        if let Some(examples) = overrides.examples {
            metadata.examples = Some(examples);
        }
        if let Some(deprecated) = overrides.deprecated {
            metadata.deprecated = deprecated;
        }
        if let Some(read_only) = overrides.read_only {
            metadata.read_only = read_only;
        }
        if let Some(write_only) = overrides.write_only {
            metadata.write_only = write_only;
        }
        copy
    }
}

fn unwrap_array_union(node: &SchemaNode) -> Option<SchemaNode> {
    let branches = node.any_of.as_deref().or(node.one_of.as_deref())?;
    let [first, second] = branches else {
        return None;
    };
    let is_array_of = |array: &SchemaNode, item: &SchemaNode| {
        array.kind == Some(SchemaType::Array) && array.items.as_deref() == Some(item)
    };
    if is_array_of(first, second) {
        Some(second.clone())
    } else if is_array_of(second, first) {
        Some(first.clone())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn task() -> SchemaNode {
        SchemaNode::object()
            .add_property("name", SchemaNode::string(), true, false)
            .unwrap()
            .add_property("progress", SchemaNode::number().with_default(0), true, false)
            .unwrap()
            .add_property("isCompleted", SchemaNode::boolean(), false, false)
            .unwrap()
    }

    #[test]
    fn test_add_property_rejects_duplicates_and_non_objects() {
        assert_eq!(
            task().add_property("name", SchemaNode::string(), true, false),
            Err(SchemaBuilderError::DuplicateProperty("name".into()))
        );
        assert_eq!(
            SchemaNode::string().add_property("x", SchemaNode::string(), true, false),
            Err(SchemaBuilderError::NotObjectSchema { operation: "add_property" })
        );
    }

    #[test]
    fn test_add_property_nullable_marks_child() {
        let node = SchemaNode::object()
            .add_property("note", SchemaNode::string(), false, true)
            .unwrap();
        assert!(node.properties["note"].nullable);
        assert!(node.required.is_none());
    }

    #[test]
    fn test_add_properties_specs() {
        let node = SchemaNode::object()
            .add_properties([
                ("a", PropertySpec::from(SchemaNode::string())),
                ("b", PropertySpec::Optional(SchemaNode::integer())),
                (
                    "c",
                    PropertySpec::OptionalUnion(SchemaNode::string(), SchemaNode::integer()),
                ),
            ])
            .unwrap();

        assert_eq!(node.required_names(), ["a".to_string()]);
        assert_eq!(node.properties["c"].any_of.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_add_properties_checks_all_names_first() {
        let err = task()
            .add_properties([
                ("fresh", SchemaNode::string()),
                ("name", SchemaNode::string()),
            ])
            .unwrap_err();
        assert_eq!(err, SchemaBuilderError::DuplicateProperty("name".into()));

        let err = SchemaNode::object()
            .add_properties([("x", SchemaNode::string()), ("x", SchemaNode::integer())])
            .unwrap_err();
        assert_eq!(err, SchemaBuilderError::DuplicateProperty("x".into()));
    }

    #[test]
    fn test_set_optional_strips_default() {
        let node = task().set_optional_properties(&["progress"]).unwrap();
        assert_eq!(node.required_names(), ["name".to_string()]);
        assert!(node.properties["progress"].default.is_none());
    }

    #[test]
    fn test_set_optional_all_clears_marker() {
        let node = task().set_optional_properties(&["name", "progress"]).unwrap();
        assert!(node.required.is_none());
    }

    #[test]
    fn test_set_required_requires_declared_names() {
        let node = task().set_required_properties(&["isCompleted"]).unwrap();
        assert!(node.is_required("isCompleted"));
        assert_eq!(
            task().set_required_properties(&["ghost"]),
            Err(SchemaBuilderError::MissingProperty("ghost".into()))
        );
    }

    #[test]
    fn test_simple_object_gate_fails_fast() {
        let open = task().add_additional_properties(None).unwrap();
        assert_eq!(
            open.clone().set_optional_properties(&["name"]),
            Err(SchemaBuilderError::NotSimpleObjectSchema {
                operation: "set_optional_properties"
            })
        );
        assert!(open.clone().rename_property("name", "title").is_err());
        assert!(open.transform_properties(&SchemaNode::null(), None).is_err());
    }

    #[test]
    fn test_rename_keeps_position() {
        let node = task().rename_optional_property("name", "title").unwrap();
        assert_eq!(node.property_names(), vec!["title", "progress", "isCompleted"]);
        assert!(!node.is_required("title"));
        assert!(!node.is_required("name"));
        assert_eq!(
            task().rename_property("name", "progress"),
            Err(SchemaBuilderError::DuplicateProperty("progress".into()))
        );
    }

    #[test]
    fn test_pick_closes_and_pick_additional_preserves() {
        let open = task()
            .add_additional_properties(Some(SchemaNode::integer()))
            .unwrap();

        let picked = open.clone().pick_properties(&["name"]).unwrap();
        assert!(!picked.has_additional_properties());

        let kept = open.clone().pick_additional_properties(&["name"], None).unwrap();
        assert!(kept.has_additional_properties());

        let narrowed = open
            .pick_additional_properties(&["name"], Some(&["extra"][..]))
            .unwrap();
        assert!(!narrowed.has_additional_properties());
        assert_eq!(narrowed.property_names(), vec!["name", "extra"]);
        assert_eq!(narrowed.properties["extra"].kind, Some(SchemaType::Integer));
        assert!(!narrowed.is_required("extra"));
    }

    #[test]
    fn test_pick_rejects_combination_and_missing() {
        let union = SchemaNode::one_of(vec![task(), SchemaNode::object()]).unwrap();
        assert!(matches!(
            union.pick_properties(&["name"]),
            Err(SchemaBuilderError::CombinationKeywords { .. })
        ));
        assert_eq!(
            task().pick_properties(&["ghost"]),
            Err(SchemaBuilderError::MissingProperty("ghost".into()))
        );
    }

    #[test]
    fn test_omit_is_pick_of_complement() {
        let node = task().omit_properties(&["progress", "ghost"]).unwrap();
        assert_eq!(node.property_names(), vec!["name", "isCompleted"]);
        assert_eq!(node.required_names(), ["name".to_string()]);
    }

    #[test]
    fn test_transform_to_array_and_back() {
        let node = SchemaNode::object()
            .add_property("tag", SchemaNode::string(), true, false)
            .unwrap()
            .add_property("list", SchemaNode::array(SchemaNode::integer()), true, false)
            .unwrap();

        let arrays = node
            .clone()
            .transform_properties_to_array(
                None,
                Some(ArrayConstraints {
                    min_items: Some(1),
                    ..Default::default()
                }),
            )
            .unwrap();
        let tag = &arrays.properties["tag"];
        let branches = tag.any_of.as_ref().unwrap();
        assert_eq!(branches[0], SchemaNode::string());
        assert_eq!(branches[1].array.min_items, Some(1));
        assert_eq!(arrays.properties["list"], node.properties["list"]);

        let unwrapped = arrays.unwrap_array_properties(Some(&["tag"][..])).unwrap();
        // min_items makes the array branch differ from a plain array of T,
        // but the items still match so the union collapses.
        assert_eq!(unwrapped.properties["tag"], SchemaNode::string());
    }

    #[test]
    fn test_transform_properties_requires_declared_names() {
        assert_eq!(
            task().transform_properties(&SchemaNode::null(), Some(&["ghost"][..])),
            Err(SchemaBuilderError::MissingProperty("ghost".into()))
        );
        let node = task()
            .transform_properties(&SchemaNode::null(), Some(&["name"][..]))
            .unwrap();
        assert_eq!(
            node.properties["name"].any_of,
            Some(vec![SchemaNode::string(), SchemaNode::null()])
        );
    }

    #[test]
    fn test_additional_properties_only_once() {
        let node = task().add_additional_properties(None).unwrap();
        assert_eq!(
            node.additional_properties,
            Some(AdditionalProperties::Allowed(true))
        );
        assert_eq!(
            node.add_additional_properties(None),
            Err(SchemaBuilderError::AdditionalPropertiesAlreadySet)
        );
    }

    #[test]
    fn test_pattern_property_validation() {
        let err = task()
            .add_pattern_property("p", "(", SchemaNode::string())
            .unwrap_err();
        assert!(matches!(err, SchemaBuilderError::InvalidPattern { .. }));
    }

    #[test]
    fn test_add_or_replace() {
        let node = task()
            .add_or_replace_property("name", SchemaNode::integer())
            .unwrap()
            .add_or_replace_property("owner", SchemaNode::string())
            .unwrap();
        assert_eq!(node.properties["name"].kind, Some(SchemaType::Integer));
        assert!(node.is_required("owner"));
        assert!(task().replace_property("ghost", SchemaNode::null()).is_err());
    }

    #[test]
    fn test_clone_with_is_independent() {
        let original = task();
        let mut copy = original.clone_with(MetadataOverrides {
            title: Some("Copy".into()),
            examples: Some(vec![json!({"name": "x"})]),
            ..Default::default()
        });
        copy.properties.shift_remove("name");

        assert_eq!(copy.metadata.title.as_deref(), Some("Copy"));
        assert!(original.metadata.title.is_none());
        assert!(original.properties.contains_key("name"));
    }

    #[test]
    fn test_remove_property() {
        let node = task().remove_property("name").unwrap();
        assert!(!node.is_required("name"));
        assert!(task().remove_property("ghost").is_err());
    }
}
