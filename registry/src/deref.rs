//! `$ref` inlining.

use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{RegistryError, Result};
use crate::registry::SchemaRegistry;

const DEFINITION_KEYS: [&str; 2] = ["definitions", "$defs"];

/// Walks a document and replaces each `$ref` object with its target.
pub(crate) struct Resolver<'a> {
    registry: &'a SchemaRegistry,
    /// References currently being expanded, as `document#pointer`.
    stack: Vec<String>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(registry: &'a SchemaRegistry) -> Self {
        Self {
            registry,
            stack: Vec::new(),
        }
    }

    pub(crate) fn resolve_document(&mut self, document: &Value, name: Option<&str>) -> Result<Value> {
        self.resolve(document, document, name)
    }

    fn resolve(&mut self, node: &Value, document: &Value, name: Option<&str>) -> Result<Value> {
        match node {
            Value::Object(map) => match map.get("$ref").and_then(Value::as_str) {
                Some(reference) => self.resolve_ref(reference, map, document, name),
                None => {
                    let mut out = Map::new();
                    for (key, child) in map {
                        if DEFINITION_KEYS.contains(&key.as_str()) {
                            continue;
                        }
                        out.insert(key.clone(), self.resolve(child, document, name)?);
                    }
                    Ok(Value::Object(out))
                }
            },
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve(item, document, name))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    fn resolve_ref(
        &mut self,
        reference: &str,
        siblings: &Map<String, Value>,
        document: &Value,
        name: Option<&str>,
    ) -> Result<Value> {
        let (target_name, pointer) = match reference.split_once('#') {
            Some(("", pointer)) => (name, pointer),
            Some((other, pointer)) => (Some(other), pointer),
            None => (Some(reference), ""),
        };
        let target_document = match target_name {
            Some(target) if Some(target) != name || pointer.is_empty() => self
                .registry
                .get(target)
                .ok_or_else(|| RegistryError::UnresolvedRef(reference.to_string()))?,
            _ => document,
        };
        let target = target_document
            .pointer(pointer)
            .ok_or_else(|| RegistryError::UnresolvedRef(reference.to_string()))?;

        let key = format!("{}#{pointer}", target_name.unwrap_or_default());
        if self.stack.contains(&key) {
            return Err(RegistryError::RefCycle(reference.to_string()));
        }
        trace!(reference, "inlining reference");
        self.stack.push(key);
        let resolved = self.resolve(target, target_document, target_name);
        self.stack.pop();
        let mut resolved = resolved?;

        if let Value::Object(out) = &mut resolved {
            for (key, value) in siblings {
                if key != "$ref" && !DEFINITION_KEYS.contains(&key.as_str()) {
                    out.insert(key.clone(), self.resolve(value, document, name)?);
                }
            }
        }
        Ok(resolved)
    }
}
