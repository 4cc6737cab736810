//! Running compiled validators against values.

use serde_json::{Map, Value};
use shape_schema_core::SchemaNode;
use tracing::debug;

use crate::coerce::{coerce, matches_type, values_equal};
use crate::compile::{compile, CompiledAdditional, CompiledNode};
use crate::error::{CompileError, Result, SchemaValidationError};
use crate::issue::{format_issues, format_number, push_pointer_token, Keyword, ValidationIssue};
use crate::options::ValidationOptions;

/// A schema compiled under fixed [`ValidationOptions`].
///
/// Validation may rewrite the value: coercion, default filling and removal
/// of additional properties all happen in place.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shape_schema_core::SchemaNode;
/// use shape_schema_validate::{ValidationOptions, Validator};
///
/// let node = SchemaNode::object()
///     .add_property("progress", SchemaNode::number().with_minimum(0.0), true, false)
///     .unwrap();
/// let validator = Validator::compile(&node, ValidationOptions::default()).unwrap();
///
/// let err = validator.validate(&mut json!({"progress": -1})).unwrap_err();
/// assert_eq!(err.to_string(), "Invalid parameters: data/progress must be >= 0");
/// ```
#[derive(Debug)]
pub struct Validator {
    root: CompiledNode,
    options: ValidationOptions,
}

impl Validator {
    /// Compiles `node` with `options`.
    ///
    /// # Errors
    ///
    /// Returns a [`CompileError`] for invalid regexes, and in strict mode for
    /// the constructs strict mode rejects.
    pub fn compile(node: &SchemaNode, options: ValidationOptions) -> std::result::Result<Self, CompileError> {
        Ok(Self {
            root: compile(node, &options)?,
            options,
        })
    }

    pub fn options(&self) -> ValidationOptions {
        self.options
    }

    /// Validates `value` in place and returns every issue found.
    ///
    /// With `all_errors` disabled the list holds at most one issue.
    pub fn issues(&self, value: &mut Value) -> Vec<ValidationIssue> {
        self.run(value, false)
    }

    /// Validates `value` in place.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaValidationError::Invalid`] carrying the formatted
    /// message and the issues behind it.
    pub fn validate(&self, value: &mut Value) -> Result<()> {
        let issues = self.issues(value);
        self.finish(issues)
    }

    /// Validates a list whose root node is an array schema, stopping after
    /// the first element that produced issues.
    ///
    /// The elements are validated in place.
    pub fn validate_list(&self, values: &mut Vec<Value>) -> Result<()> {
        let mut array = Value::Array(std::mem::take(values));
        let issues = self.run(&mut array, true);
        if let Value::Array(items) = array {
            *values = items;
        }
        self.finish(issues)
    }

    fn run(&self, value: &mut Value, list: bool) -> Vec<ValidationIssue> {
        let mut eval = Evaluation::new(&self.options, list);
        eval.node(&self.root, value);
        let mut issues = eval.issues;
        if !self.options.all_errors {
            issues.truncate(1);
        }
        issues
    }

    fn finish(&self, issues: Vec<ValidationIssue>) -> Result<()> {
        if issues.is_empty() {
            return Ok(());
        }
        debug!(count = issues.len(), "validation failed");
        Err(SchemaValidationError::Invalid {
            message: format_issues(&issues, self.options.all_errors),
            issues,
        })
    }
}

/// State of one validation run.
struct Evaluation<'a> {
    options: &'a ValidationOptions,
    /// Stop after the first failing element of the root array.
    list: bool,
    path: String,
    issues: Vec<ValidationIssue>,
}

impl<'a> Evaluation<'a> {
    fn new(options: &'a ValidationOptions, list: bool) -> Self {
        Self {
            options,
            list,
            path: String::new(),
            issues: Vec::new(),
        }
    }

    /// Fresh evaluation for a branch, rooted at the current path.
    fn fork(&self) -> Evaluation<'a> {
        Evaluation {
            options: self.options,
            list: false,
            path: self.path.clone(),
            issues: Vec::new(),
        }
    }

    fn done(&self) -> bool {
        !self.options.all_errors && !self.issues.is_empty()
    }

    fn push(&mut self, keyword: Keyword, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            instance_path: self.path.clone(),
            keyword,
            message: message.into(),
        });
    }

    fn nested(&mut self, token: &str, node: &CompiledNode, value: &mut Value) {
        let depth = self.path.len();
        push_pointer_token(&mut self.path, token);
        self.node(node, value);
        self.path.truncate(depth);
    }

    fn node(&mut self, node: &CompiledNode, value: &mut Value) {
        if value.is_null() && node.nullable {
            return;
        }
        if !self.check_type(node, value) {
            return;
        }

        if let Some(expected) = &node.const_value {
            if !values_equal(expected, value) {
                self.push(Keyword::Const, "must be equal to constant");
            }
        }
        if let Some(allowed) = &node.enum_values {
            if !allowed.iter().any(|v| values_equal(v, value)) {
                self.push(Keyword::Enum, "must be equal to one of the allowed values");
            }
        }
        if self.done() {
            return;
        }

        match value {
            Value::String(text) => self.check_string(node, text),
            Value::Number(n) => self.check_number(node, n.as_f64()),
            Value::Array(items) => self.check_array(node, items),
            Value::Object(map) => self.check_object(node, map),
            _ => {}
        }
        if self.done() {
            return;
        }

        self.check_combinators(node, value);
    }

    /// Returns `false` when the value has the wrong type and could not be
    /// coerced.
    fn check_type(&mut self, node: &CompiledNode, value: &mut Value) -> bool {
        let Some(kind) = node.kind else {
            return true;
        };
        if matches_type(kind, value) {
            return true;
        }
        if self.options.coerce_types {
            if let Some(coerced) = coerce(kind, value) {
                *value = coerced;
                return true;
            }
        }
        self.push(Keyword::Type, format!("must be {}", node.type_label()));
        false
    }

    fn check_string(&mut self, node: &CompiledNode, text: &str) {
        let length = text.chars().count() as u64;
        if let Some(min) = node.min_length {
            if length < min {
                self.push(
                    Keyword::MinLength,
                    format!("must NOT have fewer than {min} characters"),
                );
            }
        }
        if let Some(max) = node.max_length {
            if length > max {
                self.push(
                    Keyword::MaxLength,
                    format!("must NOT have more than {max} characters"),
                );
            }
        }
        if let Some((source, regex)) = &node.pattern {
            if !regex.is_match(text) {
                self.push(Keyword::Pattern, format!("must match pattern \"{source}\""));
            }
        }
        if let Some((name, format)) = &node.format {
            if !format.matches(text) {
                self.push(Keyword::Format, format!("must match format \"{name}\""));
            }
        }
    }

    fn check_number(&mut self, node: &CompiledNode, n: Option<f64>) {
        let Some(n) = n else {
            return;
        };
        let bounds = &node.number;
        if let Some(min) = bounds.minimum.filter(|min| n < *min) {
            self.push(Keyword::Minimum, format!("must be >= {}", format_number(min)));
        }
        if let Some(max) = bounds.maximum.filter(|max| n > *max) {
            self.push(Keyword::Maximum, format!("must be <= {}", format_number(max)));
        }
        if let Some(min) = bounds.exclusive_minimum.filter(|min| n <= *min) {
            self.push(
                Keyword::ExclusiveMinimum,
                format!("must be > {}", format_number(min)),
            );
        }
        if let Some(max) = bounds.exclusive_maximum.filter(|max| n >= *max) {
            self.push(
                Keyword::ExclusiveMaximum,
                format!("must be < {}", format_number(max)),
            );
        }
        if let Some(step) = bounds.multiple_of.filter(|step| *step > 0.0) {
            let quotient = n / step;
            if (quotient - quotient.round()).abs() > 1e-9 {
                self.push(
                    Keyword::MultipleOf,
                    format!("must be multiple of {}", format_number(step)),
                );
            }
        }
    }

    fn check_array(&mut self, node: &CompiledNode, items: &mut [Value]) {
        let len = items.len() as u64;
        if let Some(min) = node.array.min_items {
            if len < min {
                self.push(Keyword::MinItems, format!("must NOT have fewer than {min} items"));
            }
        }
        if let Some(max) = node.array.max_items {
            if len > max {
                self.push(Keyword::MaxItems, format!("must NOT have more than {max} items"));
            }
        }
        if node.array.unique_items {
            if let Some((later, earlier)) = find_duplicate(items) {
                self.push(
                    Keyword::UniqueItems,
                    format!("must NOT have duplicate items (items ## {later} and {earlier} are identical)"),
                );
            }
        }
        if self.done() {
            return;
        }

        let Some(item_node) = node.items.as_deref() else {
            return;
        };
        let fail_fast = self.list && self.path.is_empty();
        for (index, item) in items.iter_mut().enumerate() {
            let before = self.issues.len();
            self.nested(&index.to_string(), item_node, item);
            if self.done() || (fail_fast && self.issues.len() > before) {
                return;
            }
        }
    }

    fn check_object(&mut self, node: &CompiledNode, map: &mut Map<String, Value>) {
        if self.options.remove_additional && matches!(node.additional, CompiledAdditional::Deny) {
            map.retain(|key, _| node.is_declared(key) || node.matches_pattern(key));
        }
        if self.options.use_defaults {
            for property in &node.properties {
                if let (true, Some(default)) = (property.required, &property.default) {
                    if !map.contains_key(&property.name) {
                        map.insert(property.name.clone(), default.clone());
                    }
                }
            }
        }

        for name in &node.required {
            if !map.contains_key(name) {
                self.push(
                    Keyword::Required,
                    format!("must have required property '{name}'"),
                );
                if self.done() {
                    return;
                }
            }
        }

        let count = map.len() as u64;
        if let Some(min) = node.object.min_properties.filter(|min| count < *min) {
            self.push(
                Keyword::MinProperties,
                format!("must NOT have fewer than {min} properties"),
            );
        }
        if let Some(max) = node.object.max_properties.filter(|max| count > *max) {
            self.push(
                Keyword::MaxProperties,
                format!("must NOT have more than {max} properties"),
            );
        }
        if self.done() {
            return;
        }

        let extra: Vec<String> = map
            .keys()
            .filter(|key| !node.is_declared(key) && !node.matches_pattern(key))
            .cloned()
            .collect();
        if matches!(node.additional, CompiledAdditional::Deny) {
            for _ in &extra {
                self.push(
                    Keyword::AdditionalProperties,
                    "must NOT have additional properties",
                );
                if self.done() {
                    return;
                }
            }
        }

        for property in &node.properties {
            if let Some(child) = map.get_mut(&property.name) {
                self.nested(&property.name, &property.node, child);
                if self.done() {
                    return;
                }
            }
        }

        if !node.pattern_properties.is_empty() {
            let keys: Vec<String> = map
                .keys()
                .filter(|key| !node.is_declared(key))
                .cloned()
                .collect();
            for key in &keys {
                for (regex, child_node) in &node.pattern_properties {
                    if !regex.is_match(key) {
                        continue;
                    }
                    if let Some(child) = map.get_mut(key) {
                        self.nested(key, child_node, child);
                    }
                    if self.done() {
                        return;
                    }
                }
            }
        }

        if let CompiledAdditional::Schema(child_node) = &node.additional {
            for key in &extra {
                if let Some(child) = map.get_mut(key) {
                    self.nested(key, child_node, child);
                }
                if self.done() {
                    return;
                }
            }
        }
    }

    fn check_combinators(&mut self, node: &CompiledNode, value: &mut Value) {
        for branch in &node.all_of {
            self.node(branch, value);
            if self.done() {
                return;
            }
        }

        if !node.any_of.is_empty() {
            let mut failures = Vec::new();
            let mut adopted = None;
            for branch in &node.any_of {
                let (copy, issues) = self.try_branch(branch, value);
                if issues.is_empty() {
                    adopted = Some(copy);
                    break;
                }
                failures.extend(issues);
            }
            match adopted {
                Some(copy) => *value = copy,
                None => {
                    self.issues.extend(failures);
                    self.push(Keyword::AnyOf, "must match a schema in anyOf");
                    if self.done() {
                        return;
                    }
                }
            }
        }

        if !node.one_of.is_empty() {
            let mut failures = Vec::new();
            let mut passing = Vec::new();
            for branch in &node.one_of {
                let (copy, issues) = self.try_branch(branch, value);
                if issues.is_empty() {
                    passing.push(copy);
                } else {
                    failures.extend(issues);
                }
            }
            if passing.len() == 1 {
                if let Some(copy) = passing.pop() {
                    *value = copy;
                }
            } else {
                if passing.is_empty() {
                    self.issues.extend(failures);
                }
                self.push(Keyword::OneOf, "must match exactly one schema in oneOf");
                if self.done() {
                    return;
                }
            }
        }

        if let Some(negated) = node.not.as_deref() {
            let (_, issues) = self.try_branch(negated, value);
            if issues.is_empty() {
                self.push(Keyword::Not, "must NOT be valid");
            }
        }
    }

    fn try_branch(&self, branch: &CompiledNode, value: &Value) -> (Value, Vec<ValidationIssue>) {
        let mut copy = value.clone();
        let mut sub = self.fork();
        sub.node(branch, &mut copy);
        (copy, sub.issues)
    }
}

/// Returns `(later, earlier)` indices of a duplicate pair, scanning from the
/// end of the array.
fn find_duplicate(items: &[Value]) -> Option<(usize, usize)> {
    (0..items.len()).rev().find_map(|earlier| {
        (earlier + 1..items.len())
            .find(|&later| values_equal(&items[earlier], &items[later]))
            .map(|later| (later, earlier))
    })
}
