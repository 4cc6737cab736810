//! The [`Schema`] handle: a schema node plus its lazily compiled validators.

use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use serde_json::Value;
use shape_schema_core::{SchemaBuilderError, SchemaNode};
use tracing::trace;

use crate::error::Result;
use crate::options::{ValidationContext, ValidationOptions, ValidationOverrides};
use crate::validator::Validator;

/// A schema ready for validation.
///
/// The single-value and list validators are compiled on first use and
/// cached for the lifetime of the handle. Reshaping goes through
/// [`derive`](Self::derive), which always yields a new handle with empty
/// caches, so a compiled validator never sees a changed node.
///
/// Until a validator is compiled, a schema without explicit options follows
/// its [`ValidationContext`]. The first compile of either validator fixes the
/// options for both.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shape_schema_core::{PropertySpec, SchemaNode};
/// use shape_schema_validate::Schema;
///
/// let task = Schema::new(SchemaNode::object().add_properties([
///     ("name", PropertySpec::Required(SchemaNode::string())),
///     ("progress", PropertySpec::Required(SchemaNode::number().with_minimum(0.0))),
///     ("isCompleted", PropertySpec::Optional(SchemaNode::boolean())),
/// ])?);
///
/// assert!(task.validate_value(json!({"name": "t", "progress": 0})).is_ok());
/// let err = task.validate_value(json!({})).unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     "Invalid parameters: data must have required property 'name', \
///      data must have required property 'progress'"
/// );
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Schema {
    node: SchemaNode,
    options: Option<ValidationOptions>,
    context: ValidationContext,
    /// Options resolved at the first compile.
    resolved: OnceLock<ValidationOptions>,
    single: OnceLock<Validator>,
    list: OnceLock<Validator>,
}

impl Clone for Schema {
    /// Clones start with empty validator caches.
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            options: self.options,
            context: self.context.clone(),
            resolved: OnceLock::new(),
            single: OnceLock::new(),
            list: OnceLock::new(),
        }
    }
}

impl From<SchemaNode> for Schema {
    fn from(node: SchemaNode) -> Self {
        Self::new(node)
    }
}

impl Schema {
    /// Wraps `node`, following [`ValidationContext::global`] for options.
    pub fn new(node: SchemaNode) -> Self {
        Self::with_context(node, ValidationContext::global())
    }

    /// Wraps `node`, following `context` for options.
    pub fn with_context(node: SchemaNode, context: ValidationContext) -> Self {
        Self {
            node,
            options: None,
            context,
            resolved: OnceLock::new(),
            single: OnceLock::new(),
            list: OnceLock::new(),
        }
    }

    pub fn node(&self) -> &SchemaNode {
        &self.node
    }

    pub fn into_node(self) -> SchemaNode {
        self.node
    }

    /// Explicit options, if any were configured.
    pub fn options(&self) -> Option<ValidationOptions> {
        self.options
    }

    /// Options a validator compiled now would use.
    pub fn effective_options(&self) -> ValidationOptions {
        match self.resolved.get() {
            Some(options) => *options,
            None => self.options.unwrap_or_else(|| self.context.get()),
        }
    }

    fn compile_options(&self) -> ValidationOptions {
        *self
            .resolved
            .get_or_init(|| self.options.unwrap_or_else(|| self.context.get()))
    }

    /// Pins options for this schema, starting from the current effective
    /// options with `overrides` applied.
    ///
    /// Validators compiled earlier are discarded.
    pub fn configure_validation(mut self, overrides: ValidationOverrides) -> Self {
        self.options = Some(self.effective_options().with_overrides(overrides));
        self.resolved = OnceLock::new();
        self.single = OnceLock::new();
        self.list = OnceLock::new();
        self
    }

    /// Applies a core combinator to the node and returns a new handle with
    /// the same options and context.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use shape_schema_core::SchemaNode;
    /// use shape_schema_validate::Schema;
    ///
    /// let base = Schema::new(
    ///     SchemaNode::object().add_property("id", SchemaNode::integer(), true, false)?,
    /// );
    /// let patch = base.derive(|node| Ok(node.to_optionals()))?;
    ///
    /// assert!(patch.validate_value(json!({})).is_ok());
    /// assert!(base.validate_value(json!({})).is_err());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn derive<F>(&self, transform: F) -> std::result::Result<Schema, SchemaBuilderError>
    where
        F: FnOnce(SchemaNode) -> std::result::Result<SchemaNode, SchemaBuilderError>,
    {
        Ok(Schema {
            node: transform(self.node.clone())?,
            options: self.options,
            context: self.context.clone(),
            resolved: OnceLock::new(),
            single: OnceLock::new(),
            list: OnceLock::new(),
        })
    }

    fn validator(&self) -> Result<&Validator> {
        cached(&self.single, || Validator::compile(&self.node, self.compile_options()))
    }

    fn list_validator(&self) -> Result<&Validator> {
        cached(&self.list, || {
            let list = SchemaNode::array(self.node.clone()).with_min_items(1);
            Validator::compile(&list, self.compile_options())
        })
    }

    /// Validates `value` in place, applying coercion, defaults and removal
    /// of additional properties as configured.
    ///
    /// # Errors
    ///
    /// [`SchemaValidationError::Invalid`](crate::SchemaValidationError::Invalid)
    /// if the value fails, [`Compile`](crate::SchemaValidationError::Compile)
    /// if the schema cannot be compiled.
    pub fn validate(&self, value: &mut Value) -> Result<()> {
        self.validator()?.validate(value)
    }

    /// By-value form of [`validate`](Self::validate); returns the rewritten
    /// value.
    pub fn validate_value(&self, mut value: Value) -> Result<Value> {
        self.validate(&mut value)?;
        Ok(value)
    }

    /// Validates `value` and deserializes the result into `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde::Deserialize;
    /// use serde_json::json;
    /// use shape_schema_core::SchemaNode;
    /// use shape_schema_validate::{Schema, ValidationOverrides};
    ///
    /// #[derive(Deserialize)]
    /// struct Page {
    ///     size: u32,
    /// }
    ///
    /// let schema = Schema::new(
    ///     SchemaNode::object().add_property("size", SchemaNode::integer(), true, false)?,
    /// )
    /// .configure_validation(ValidationOverrides { coerce_types: Some(true), ..Default::default() });
    ///
    /// let page: Page = schema.parse(json!({"size": "20"}))?;
    /// assert_eq!(page.size, 20);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn parse<T: DeserializeOwned>(&self, value: Value) -> Result<T> {
        let value = self.validate_value(value)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Validates a non-empty list of values in place, each against this
    /// schema. Stops after the first element that fails.
    pub fn validate_list(&self, values: &mut Vec<Value>) -> Result<()> {
        self.list_validator()?.validate_list(values)
    }

    /// Whether `value` passes. The value is validated on a copy.
    pub fn is_valid(&self, value: &Value) -> bool {
        self.validate(&mut value.clone()).is_ok()
    }
}

fn cached<F>(cell: &OnceLock<Validator>, compile: F) -> Result<&Validator>
where
    F: FnOnce() -> std::result::Result<Validator, crate::CompileError>,
{
    if let Some(validator) = cell.get() {
        trace!("using cached validator");
        return Ok(validator);
    }
    let validator = compile()?;
    Ok(cell.get_or_init(|| validator))
}
