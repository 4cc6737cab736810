//! Persistent JSON-like value with shared containers.
//!
//! Arrays and objects sit behind [`Arc`], so cloning a [`SharedValue`] never
//! copies a container. [`Accessor::set`](crate::Accessor::set) relies on
//! this: it copies only the containers on the changed path and reuses every
//! other one, which [`SharedValue::shares_with`] can observe.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

/// Immutable, cheaply clonable JSON value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SharedValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Arc<Vec<SharedValue>>),
    Object(Arc<IndexMap<String, SharedValue>>),
}

impl SharedValue {
    pub fn array(items: impl IntoIterator<Item = SharedValue>) -> Self {
        SharedValue::Array(Arc::new(items.into_iter().collect()))
    }

    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, SharedValue)>) -> Self {
        SharedValue::Object(Arc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Name of the value kind, as used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SharedValue::Null => "null",
            SharedValue::Bool(_) => "boolean",
            SharedValue::Number(_) => "number",
            SharedValue::String(_) => "string",
            SharedValue::Array(_) => "array",
            SharedValue::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SharedValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SharedValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SharedValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SharedValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SharedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[SharedValue]> {
        match self {
            SharedValue::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, SharedValue>> {
        match self {
            SharedValue::Object(map) => Some(&**map),
            _ => None,
        }
    }

    /// Member `key` of an object.
    pub fn get(&self, key: &str) -> Option<&SharedValue> {
        self.as_object()?.get(key)
    }

    /// Element `index` of an array.
    pub fn index(&self, index: usize) -> Option<&SharedValue> {
        self.as_array()?.get(index)
    }

    /// Whether both values are the same container allocation.
    ///
    /// Scalars never share.
    pub fn shares_with(&self, other: &SharedValue) -> bool {
        match (self, other) {
            (SharedValue::Array(a), SharedValue::Array(b)) => Arc::ptr_eq(a, b),
            (SharedValue::Object(a), SharedValue::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Deep copy into a [`serde_json::Value`].
    pub fn to_value(&self) -> Value {
        match self {
            SharedValue::Null => Value::Null,
            SharedValue::Bool(b) => Value::Bool(*b),
            SharedValue::Number(n) => Value::Number(n.clone()),
            SharedValue::String(s) => Value::String(s.clone()),
            SharedValue::Array(items) => Value::Array(items.iter().map(Self::to_value).collect()),
            SharedValue::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }
}

impl From<Value> for SharedValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => SharedValue::Null,
            Value::Bool(b) => SharedValue::Bool(b),
            Value::Number(n) => SharedValue::Number(n),
            Value::String(s) => SharedValue::String(s),
            Value::Array(items) => SharedValue::array(items.into_iter().map(SharedValue::from)),
            Value::Object(map) => SharedValue::object(
                map.into_iter().map(|(k, v)| (k, SharedValue::from(v))),
            ),
        }
    }
}

impl From<&SharedValue> for Value {
    fn from(value: &SharedValue) -> Self {
        value.to_value()
    }
}

impl From<SharedValue> for Value {
    fn from(value: SharedValue) -> Self {
        value.to_value()
    }
}

impl From<bool> for SharedValue {
    fn from(b: bool) -> Self {
        SharedValue::Bool(b)
    }
}

impl From<i64> for SharedValue {
    fn from(n: i64) -> Self {
        SharedValue::Number(n.into())
    }
}

impl From<f64> for SharedValue {
    /// Non-finite numbers become `Null`, as in `serde_json`.
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(SharedValue::Null, SharedValue::Number)
    }
}

impl From<&str> for SharedValue {
    fn from(s: &str) -> Self {
        SharedValue::String(s.to_string())
    }
}

impl From<String> for SharedValue {
    fn from(s: String) -> Self {
        SharedValue::String(s)
    }
}
