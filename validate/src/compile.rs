//! Schema compilation.
//!
//! Turns a [`SchemaNode`] into an owned [`CompiledNode`] tree with regexes
//! and formats resolved up front, so that running a validator never touches
//! the source node again. Strict-mode checks happen here.

use regex::Regex;
use serde_json::Value;
use shape_schema_core::{
    AdditionalProperties, ArrayConstraints, NumberConstraints, ObjectConstraints, SchemaNode,
    SchemaType,
};
use tracing::debug;

use crate::error::CompileError;
use crate::formats::Format;
use crate::options::ValidationOptions;

#[derive(Debug)]
pub(crate) struct CompiledProperty {
    pub name: String,
    pub node: CompiledNode,
    pub required: bool,
    pub default: Option<Value>,
}

#[derive(Debug)]
pub(crate) enum CompiledAdditional {
    Allow,
    Deny,
    Schema(Box<CompiledNode>),
}

#[derive(Debug)]
pub(crate) struct CompiledNode {
    pub kind: Option<SchemaType>,
    pub nullable: bool,
    pub enum_values: Option<Vec<Value>>,
    pub const_value: Option<Value>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<(String, Regex)>,
    pub format: Option<(String, Format)>,
    pub number: NumberConstraints,
    pub array: ArrayConstraints,
    pub object: ObjectConstraints,
    pub properties: Vec<CompiledProperty>,
    /// Required names in declaration order, including undeclared ones.
    pub required: Vec<String>,
    pub pattern_properties: Vec<(Regex, CompiledNode)>,
    pub additional: CompiledAdditional,
    pub items: Option<Box<CompiledNode>>,
    pub one_of: Vec<CompiledNode>,
    pub all_of: Vec<CompiledNode>,
    pub any_of: Vec<CompiledNode>,
    pub not: Option<Box<CompiledNode>>,
}

impl CompiledNode {
    pub(crate) fn is_declared(&self, key: &str) -> bool {
        self.properties.iter().any(|p| p.name == key)
    }

    pub(crate) fn matches_pattern(&self, key: &str) -> bool {
        self.pattern_properties.iter().any(|(re, _)| re.is_match(key))
    }

    /// Rendered type label for `type` issues, e.g. `string` or `string,null`.
    pub(crate) fn type_label(&self) -> String {
        match (self.kind, self.nullable) {
            (Some(kind), true) => format!("{},null", kind.as_str()),
            (Some(kind), false) => kind.as_str().to_string(),
            (None, _) => "null".to_string(),
        }
    }
}

/// Compiles `node` under `options`.
pub(crate) fn compile(node: &SchemaNode, options: &ValidationOptions) -> Result<CompiledNode, CompileError> {
    let mut compiler = Compiler {
        options,
        schema_path: vec!["#".to_string()],
    };
    let compiled = compiler.node(node)?;
    debug!(strict = options.strict, "compiled schema validator");
    Ok(compiled)
}

struct Compiler<'a> {
    options: &'a ValidationOptions,
    schema_path: Vec<String>,
}

impl Compiler<'_> {
    fn path(&self) -> String {
        self.schema_path.join("/")
    }

    fn nested<T>(
        &mut self,
        segments: &[&str],
        f: impl FnOnce(&mut Self) -> Result<T, CompileError>,
    ) -> Result<T, CompileError> {
        let depth = self.schema_path.len();
        self.schema_path
            .extend(segments.iter().map(|s| s.replace('~', "~0").replace('/', "~1")));
        let result = f(self);
        self.schema_path.truncate(depth);
        result
    }

    fn regex(&self, pattern: &str) -> Result<Regex, CompileError> {
        Regex::new(pattern).map_err(|err| CompileError::InvalidPattern {
            schema_path: self.path(),
            pattern: pattern.to_string(),
            reason: err.to_string(),
        })
    }

    fn check_bounds<T: PartialOrd>(
        &self,
        keyword: &'static str,
        min: Option<T>,
        max: Option<T>,
    ) -> Result<(), CompileError> {
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(CompileError::InvertedBounds {
                    schema_path: self.path(),
                    keyword,
                });
            }
        }
        Ok(())
    }

    fn node(&mut self, node: &SchemaNode) -> Result<CompiledNode, CompileError> {
        let strict = self.options.strict;

        let pattern = match &node.string.pattern {
            Some(pattern) => Some((pattern.clone(), self.regex(pattern)?)),
            None => None,
        };

        let format = match &node.string.format {
            Some(name) => match Format::parse(name) {
                Some(format) => Some((name.clone(), format)),
                None if strict => {
                    return Err(CompileError::UnknownFormat {
                        schema_path: self.path(),
                        format: name.clone(),
                    });
                }
                None => {
                    debug!(format = %name, schema_path = %self.path(), "ignoring unknown format");
                    None
                }
            },
            None => None,
        };

        if strict {
            self.check_bounds("length", node.string.min_length, node.string.max_length)?;
            self.check_bounds("number", node.number.minimum, node.number.maximum)?;
            self.check_bounds("items", node.array.min_items, node.array.max_items)?;
            self.check_bounds(
                "properties",
                node.object.min_properties,
                node.object.max_properties,
            )?;
            for name in node.required_names() {
                if !node.properties.contains_key(name) {
                    return Err(CompileError::UndeclaredRequired {
                        schema_path: self.path(),
                        name: name.clone(),
                    });
                }
            }
        }

        let mut properties = Vec::with_capacity(node.properties.len());
        for (name, child) in &node.properties {
            let required = node.is_required(name);
            if strict && !required && child.default.is_some() {
                return Err(CompileError::DefaultOnOptional {
                    schema_path: self.path(),
                    name: name.clone(),
                });
            }
            let compiled = self.nested(&["properties", name], |c| c.node(child))?;
            properties.push(CompiledProperty {
                name: name.clone(),
                node: compiled,
                required,
                default: child.default.clone(),
            });
        }

        let mut pattern_properties = Vec::with_capacity(node.pattern_properties.len());
        for (pattern, child) in &node.pattern_properties {
            let compiled = self.nested(&["patternProperties", pattern], |c| {
                Ok((c.regex(pattern)?, c.node(child)?))
            })?;
            pattern_properties.push(compiled);
        }

        let additional = match &node.additional_properties {
            None | Some(AdditionalProperties::Allowed(true)) => CompiledAdditional::Allow,
            Some(AdditionalProperties::Allowed(false)) => CompiledAdditional::Deny,
            Some(AdditionalProperties::Schema(child)) => CompiledAdditional::Schema(Box::new(
                self.nested(&["additionalProperties"], |c| c.node(child))?,
            )),
        };

        let items = match &node.items {
            Some(child) => Some(Box::new(self.nested(&["items"], |c| c.node(child))?)),
            None => None,
        };

        let one_of = self.branches("oneOf", node.one_of.as_deref())?;
        let all_of = self.branches("allOf", node.all_of.as_deref())?;
        let any_of = self.branches("anyOf", node.any_of.as_deref())?;
        let not = match &node.not {
            Some(child) => Some(Box::new(self.nested(&["not"], |c| c.node(child))?)),
            None => None,
        };

        Ok(CompiledNode {
            kind: node.kind,
            nullable: node.nullable,
            enum_values: node.enum_values.clone(),
            const_value: node.const_value.clone(),
            min_length: node.string.min_length,
            max_length: node.string.max_length,
            pattern,
            format,
            number: node.number.clone(),
            array: node.array.clone(),
            object: node.object.clone(),
            properties,
            required: node.required_names().to_vec(),
            pattern_properties,
            additional,
            items,
            one_of,
            all_of,
            any_of,
            not,
        })
    }

    fn branches(
        &mut self,
        keyword: &str,
        nodes: Option<&[SchemaNode]>,
    ) -> Result<Vec<CompiledNode>, CompileError> {
        let Some(nodes) = nodes else {
            return Ok(Vec::new());
        };
        let mut compiled = Vec::with_capacity(nodes.len());
        for (index, child) in nodes.iter().enumerate() {
            let index = index.to_string();
            compiled.push(self.nested(&[keyword, &index], |c| c.node(child))?);
        }
        Ok(compiled)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn strict() -> ValidationOptions {
        ValidationOptions {
            strict: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_invalid_pattern_always_fails() {
        let node = SchemaNode::string().with_pattern("(");
        let err = compile(&node, &ValidationOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::InvalidPattern { .. }));
    }

    #[test]
    fn test_unknown_format_only_fails_in_strict_mode() {
        let node = SchemaNode::string().with_format("color");
        assert!(compile(&node, &ValidationOptions::default()).unwrap().format.is_none());
        assert_eq!(
            compile(&node, &strict()).unwrap_err(),
            CompileError::UnknownFormat {
                schema_path: "#".into(),
                format: "color".into()
            }
        );
    }

    #[test]
    fn test_strict_rejects_default_on_optional() {
        let node = SchemaNode::object()
            .add_property("n", SchemaNode::integer().with_default(1), false, false)
            .unwrap();
        assert!(compile(&node, &ValidationOptions::default()).is_ok());
        assert!(matches!(
            compile(&node, &strict()),
            Err(CompileError::DefaultOnOptional { .. })
        ));
    }

    #[test]
    fn test_strict_rejects_undeclared_required_and_inverted_bounds() {
        let node = SchemaNode::from_value(json!({
            "type": "object",
            "properties": {"a": {"type": "string"}},
            "required": ["a", "b"]
        }))
        .unwrap();
        assert!(matches!(
            compile(&node, &strict()),
            Err(CompileError::UndeclaredRequired { .. })
        ));

        let node = SchemaNode::number().with_minimum(5.0).with_maximum(1.0);
        assert!(matches!(
            compile(&node, &strict()),
            Err(CompileError::InvertedBounds { keyword: "number", .. })
        ));
    }

    #[test]
    fn test_schema_path_points_at_nested_node() {
        let node = SchemaNode::object()
            .add_property(
                "tags",
                SchemaNode::array(SchemaNode::string().with_format("color")),
                true,
                false,
            )
            .unwrap();
        let err = compile(&node, &strict()).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownFormat {
                schema_path: "#/properties/tags/items".into(),
                format: "color".into()
            }
        );
    }
}
