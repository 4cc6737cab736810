//! Schema node model.
//!
//! A [`SchemaNode`] is one structural constraint fragment: an optional type
//! tag, kind-specific facets, nested fragments and descriptive metadata. The
//! type serializes to and from the familiar JSON Schema keyword form, so a
//! node can round-trip through any raw schema document.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Result, SchemaBuilderError};

/// Type tag of a schema node.
///
/// # Examples
///
/// ```
/// use shape_schema_core::SchemaType;
///
/// assert_eq!(SchemaType::Integer.as_str(), "integer");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Object,
    Array,
}

impl SchemaType {
    /// Returns the JSON Schema keyword for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
            SchemaType::Null => "null",
            SchemaType::Object => "object",
            SchemaType::Array => "array",
        }
    }
}

/// Value of the `additionalProperties` keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `true` accepts any unlisted property, `false` rejects them.
    Allowed(bool),
    /// Unlisted properties must match this schema.
    Schema(Box<SchemaNode>),
}

/// String facets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Numeric facets, shared by `number` and `integer`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
}

/// Array facets.
///
/// Also used as the optional constraint set of
/// [`transform_properties_to_array`](SchemaNode::transform_properties_to_array).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unique_items: bool,
}

/// Object facets that are not expressed through nested nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,
}

/// Descriptive annotations. Carried through every transformation and never
/// consulted by validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub write_only: bool,
}

/// A structural constraint tree.
///
/// Nodes are created by the factory functions ([`object`](Self::object),
/// [`string`](Self::string), ...) or deserialized from a raw document with
/// [`from_value`](Self::from_value), refined with `with_*` facet builders,
/// and reshaped with the combinators in this crate. Every combinator consumes
/// the node and returns a new one.
///
/// # Examples
///
/// ```
/// use shape_schema_core::SchemaNode;
///
/// let task = SchemaNode::object()
///     .add_property("name", SchemaNode::string(), true, false)?
///     .add_property("progress", SchemaNode::number().with_minimum(0.0), true, false)?
///     .add_property("isCompleted", SchemaNode::boolean(), false, false)?;
///
/// assert!(task.is_simple_object_schema());
/// assert!(task.is_required("name"));
/// assert!(!task.is_required("isCompleted"));
/// # Ok::<(), shape_schema_core::SchemaBuilderError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SchemaType>,
    /// Accept `null` in addition to the declared kind.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
    #[serde(
        rename = "enum",
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub enum_values: Option<Vec<Value>>,
    #[serde(
        rename = "const",
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub const_value: Option<Value>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
    #[serde(flatten)]
    pub string: StringConstraints,
    #[serde(flatten)]
    pub number: NumberConstraints,
    #[serde(flatten)]
    pub array: ArrayConstraints,
    #[serde(flatten)]
    pub object: ObjectConstraints,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaNode>,
    /// Never `Some` with an empty list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub pattern_properties: IndexMap<String, SchemaNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<SchemaNode>>,
    #[serde(flatten)]
    pub metadata: Metadata,
}

/// Keeps an explicit JSON `null` as `Some(Value::Null)` instead of `None`.
fn deserialize_some<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl SchemaNode {
    /// Creates an unconstrained node that accepts any value.
    pub fn empty() -> Self {
        Self::default()
    }

    fn of_kind(kind: SchemaType) -> Self {
        Self {
            kind: Some(kind),
            ..Default::default()
        }
    }

    pub fn string() -> Self {
        Self::of_kind(SchemaType::String)
    }

    pub fn number() -> Self {
        Self::of_kind(SchemaType::Number)
    }

    pub fn integer() -> Self {
        Self::of_kind(SchemaType::Integer)
    }

    pub fn boolean() -> Self {
        Self::of_kind(SchemaType::Boolean)
    }

    pub fn null() -> Self {
        Self::of_kind(SchemaType::Null)
    }

    /// Creates a node accepting exactly one of `values`.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use shape_schema_core::SchemaNode;
    ///
    /// let status = SchemaNode::enumeration([json!("open"), json!("closed")]);
    /// assert_eq!(status.enum_values.as_ref().map(Vec::len), Some(2));
    /// ```
    pub fn enumeration(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            enum_values: Some(values.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Creates a node accepting exactly `value`.
    pub fn constant(value: impl Into<Value>) -> Self {
        Self {
            const_value: Some(value.into()),
            ..Default::default()
        }
    }

    /// Creates an array node whose elements must match `items`.
    pub fn array(items: SchemaNode) -> Self {
        Self {
            kind: Some(SchemaType::Array),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    /// Creates an empty object node that rejects unlisted properties.
    ///
    /// # Examples
    ///
    /// ```
    /// use shape_schema_core::SchemaNode;
    ///
    /// let node = SchemaNode::object();
    /// assert!(node.is_object_schema());
    /// assert!(!node.has_additional_properties());
    /// ```
    pub fn object() -> Self {
        Self {
            kind: Some(SchemaType::Object),
            additional_properties: Some(AdditionalProperties::Allowed(false)),
            ..Default::default()
        }
    }

    /// Deserializes a node from a raw (already dereferenced) schema document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaBuilderError::InvalidDocument`] when the document does
    /// not describe a schema node.
    pub fn from_value(document: Value) -> Result<Self> {
        serde_json::from_value(document)
            .map_err(|err| SchemaBuilderError::InvalidDocument(err.to_string()))
    }

    /// Serializes the node into its raw document form.
    pub fn to_value(&self) -> Value {
        // Map keys are strings and every leaf is already a JSON value.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn with_min_length(mut self, min: u64) -> Self {
        self.string.min_length = Some(min);
        self
    }

    pub fn with_max_length(mut self, max: u64) -> Self {
        self.string.max_length = Some(max);
        self
    }

    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.string.pattern = Some(pattern.to_string());
        self
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.string.format = Some(format.to_string());
        self
    }

    pub fn with_minimum(mut self, min: f64) -> Self {
        self.number.minimum = Some(min);
        self
    }

    pub fn with_maximum(mut self, max: f64) -> Self {
        self.number.maximum = Some(max);
        self
    }

    pub fn with_exclusive_minimum(mut self, min: f64) -> Self {
        self.number.exclusive_minimum = Some(min);
        self
    }

    pub fn with_exclusive_maximum(mut self, max: f64) -> Self {
        self.number.exclusive_maximum = Some(max);
        self
    }

    pub fn with_multiple_of(mut self, step: f64) -> Self {
        self.number.multiple_of = Some(step);
        self
    }

    pub fn with_min_items(mut self, min: u64) -> Self {
        self.array.min_items = Some(min);
        self
    }

    pub fn with_max_items(mut self, max: u64) -> Self {
        self.array.max_items = Some(max);
        self
    }

    pub fn with_unique_items(mut self) -> Self {
        self.array.unique_items = true;
        self
    }

    pub fn with_min_properties(mut self, min: u64) -> Self {
        self.object.min_properties = Some(min);
        self
    }

    pub fn with_max_properties(mut self, max: u64) -> Self {
        self.object.max_properties = Some(max);
        self
    }

    /// Sets the value filled in for a missing required property.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.metadata.title = Some(title.to_string());
        self
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.metadata.description = Some(desc.to_string());
        self
    }

    pub fn with_examples(mut self, examples: impl IntoIterator<Item = Value>) -> Self {
        self.metadata.examples = Some(examples.into_iter().collect());
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.metadata.deprecated = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.metadata.read_only = true;
        self
    }

    pub fn write_only(mut self) -> Self {
        self.metadata.write_only = true;
        self
    }

    /// Marks this node as also accepting `null`.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Kind is `object`, or the node is untyped but declares properties.
    pub fn is_object_schema(&self) -> bool {
        match self.kind {
            Some(kind) => kind == SchemaType::Object,
            None => !self.properties.is_empty(),
        }
    }

    /// `additionalProperties` is anything but an explicit `false`.
    pub fn has_additional_properties(&self) -> bool {
        !matches!(
            self.additional_properties,
            Some(AdditionalProperties::Allowed(false))
        )
    }

    /// Carries any of `oneOf`, `allOf`, `anyOf` or `not`.
    pub fn has_schema_combination_keywords(&self) -> bool {
        self.one_of.is_some() || self.all_of.is_some() || self.any_of.is_some() || self.not.is_some()
    }

    /// Object schema with closed additional properties and no combination
    /// keywords. Most property-level combinators require this.
    ///
    /// # Examples
    ///
    /// ```
    /// use shape_schema_core::SchemaNode;
    ///
    /// assert!(SchemaNode::object().is_simple_object_schema());
    /// let open = SchemaNode::object().add_additional_properties(None)?;
    /// assert!(!open.is_simple_object_schema());
    /// assert!(!SchemaNode::string().is_simple_object_schema());
    /// # Ok::<(), shape_schema_core::SchemaBuilderError>(())
    /// ```
    pub fn is_simple_object_schema(&self) -> bool {
        self.is_object_schema()
            && !self.has_additional_properties()
            && !self.has_schema_combination_keywords()
    }

    /// Whether `null` passes this node's type and value facets.
    pub fn accepts_null(&self) -> bool {
        self.nullable
            || self.kind == Some(SchemaType::Null)
            || self.const_value.as_ref().is_some_and(Value::is_null)
            || self
                .enum_values
                .as_ref()
                .is_some_and(|values| values.iter().any(Value::is_null))
    }

    /// Returns the required property names in declaration order.
    pub fn required_names(&self) -> &[String] {
        self.required.as_deref().unwrap_or_default()
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required_names().iter().any(|r| r == name)
    }

    /// Returns the property names in declaration order.
    pub fn property_names(&self) -> Vec<&str> {
        self.properties.keys().map(String::as_str).collect()
    }

    /// Replaces the required list, storing `None` when it ends up empty.
    pub(crate) fn set_required(&mut self, names: Vec<String>) {
        self.required = if names.is_empty() { None } else { Some(names) };
    }

    pub(crate) fn mark_required(&mut self, name: &str) {
        if !self.is_required(name) {
            let mut names = self.required_names().to_vec();
            names.push(name.to_string());
            self.set_required(names);
        }
    }

    pub(crate) fn unmark_required(&mut self, name: &str) {
        if self.is_required(name) {
            let names = self
                .required_names()
                .iter()
                .filter(|r| *r != name)
                .cloned()
                .collect();
            self.set_required(names);
        }
    }

    /// Returns the node governing property `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaBuilderError::MissingProperty`] if `name` is not a
    /// declared property.
    pub fn get_subschema(&self, name: &str) -> Result<&SchemaNode> {
        self.properties
            .get(name)
            .ok_or_else(|| SchemaBuilderError::MissingProperty(name.to_string()))
    }

    /// Returns the node governing array elements.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaBuilderError::NotArraySchema`] if the node has no
    /// `items`.
    pub fn get_items_subschema(&self) -> Result<&SchemaNode> {
        self.items
            .as_deref()
            .ok_or(SchemaBuilderError::NotArraySchema)
    }
}
