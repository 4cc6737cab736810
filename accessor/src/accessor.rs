//! Path accessors with structural sharing.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, RwLock};

use indexmap::IndexMap;
use regex::Regex;
use serde::de::DeserializeOwned;
use shape_schema_core::{AdditionalProperties, SchemaNode};
use tracing::{debug, trace};

use crate::error::{AccessorError, Result};
use crate::path::{parse_path, render_path, PathSegment};
use crate::value::SharedValue;

/// Most `null`s `set` will insert to reach an index past the end of an array.
pub const MAX_ARRAY_PADDING: usize = 4096;

/// Compiled `patternProperties` keys; `None` for patterns that do not compile.
static PATTERNS: LazyLock<RwLock<HashMap<String, Option<Regex>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// A path into [`SharedValue`] data, optionally carrying the schema node
/// that governs the value at that path.
///
/// Accessors are values: every step returns a new accessor and leaves the
/// original untouched.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shape_schema_accessor::{Accessor, SharedValue};
///
/// let root = SharedValue::from(json!({"a": [{"n": 1}], "o": {"n": 1}}));
/// let n = Accessor::root().at("a").at(0).at("n");
/// assert_eq!(n, Accessor::parse("a[0].n")?);
///
/// let updated = n.set(&root, SharedValue::from(2_i64))?;
/// assert_eq!(n.get(&updated), Some(SharedValue::from(2_i64)));
/// assert!(updated.get("o").unwrap().shares_with(root.get("o").unwrap()));
/// assert!(!updated.get("a").unwrap().shares_with(root.get("a").unwrap()));
/// # Ok::<(), shape_schema_accessor::AccessorError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accessor {
    path: Vec<PathSegment>,
    schema: Option<SchemaNode>,
}

impl Accessor {
    /// Accessor for the whole value, without a schema.
    pub fn root() -> Self {
        Self::default()
    }

    /// Accessor for the whole value, governed by `node`.
    pub fn for_schema(node: SchemaNode) -> Self {
        Self {
            path: Vec::new(),
            schema: Some(node),
        }
    }

    /// Root accessor moved along a text path such as `a[0].n`.
    pub fn parse(path: &str) -> Result<Self> {
        Self::root().at_path(path)
    }

    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// Schema governing the value at this path, if known.
    pub fn schema(&self) -> Option<&SchemaNode> {
        self.schema.as_ref()
    }

    /// One step deeper.
    ///
    /// Key steps take the property schema, falling back to a matching
    /// pattern property and then to the additional-properties schema. Index
    /// steps take the items schema. When none applies the new accessor has
    /// no schema.
    pub fn at(&self, segment: impl Into<PathSegment>) -> Self {
        let segment = segment.into();
        let schema = self
            .schema
            .as_ref()
            .and_then(|node| child_schema(node, &segment))
            .cloned();
        let mut path = self.path.clone();
        path.push(segment);
        Self { path, schema }
    }

    /// Several steps deeper, given in the text syntax.
    pub fn at_path(&self, path: &str) -> Result<Self> {
        Ok(parse_path(path)?
            .into_iter()
            .fold(self.clone(), |accessor, segment| accessor.at(segment)))
    }

    /// Reads the value at this path. Any missing step yields `None`.
    pub fn get(&self, root: &SharedValue) -> Option<SharedValue> {
        self.get_ref(root).cloned()
    }

    /// Borrowing form of [`get`](Self::get).
    pub fn get_ref<'a>(&self, root: &'a SharedValue) -> Option<&'a SharedValue> {
        self.path.iter().try_fold(root, |current, segment| match segment {
            PathSegment::Key(key) => current.get(key),
            PathSegment::Index(index) => current.index(*index),
        })
    }

    /// Reads the value at this path and deserializes it into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, root: &SharedValue) -> Result<Option<T>> {
        self.get_ref(root)
            .map(|value| serde_json::from_value(value.to_value()))
            .transpose()
            .map_err(AccessorError::from)
    }

    /// Returns a new root with `value` stored at this path.
    ///
    /// Containers on the path are copied; every other container is shared
    /// with `root`. Missing or `null` containers are created: objects for
    /// key steps, arrays padded with `null` for index steps.
    ///
    /// # Errors
    ///
    /// [`AccessorError::NotAContainer`] if a step meets a scalar or a
    /// container of the other kind, [`AccessorError::IndexTooFar`] if an
    /// index lies more than [`MAX_ARRAY_PADDING`] past the end of its array.
    pub fn set(&self, root: &SharedValue, value: SharedValue) -> Result<SharedValue> {
        set_in(Some(root), &self.path, 0, value)
    }

    /// Returns a new root with the value at this path replaced by
    /// `update(current)`.
    pub fn update<F>(&self, root: &SharedValue, update: F) -> Result<SharedValue>
    where
        F: FnOnce(Option<&SharedValue>) -> SharedValue,
    {
        let next = update(self.get_ref(root));
        self.set(root, next)
    }

    /// Wraps this accessor so that reads go through `get` and writes through
    /// `set`, which receives the new value and the current underlying value.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use shape_schema_accessor::{Accessor, SharedValue};
    ///
    /// let cents = Accessor::parse("price")?;
    /// let euros = cents.clone().transform(
    ///     |v| SharedValue::from(v.as_f64().unwrap_or(0.0) / 100.0),
    ///     Some(|v: SharedValue, _: Option<&SharedValue>| {
    ///         SharedValue::from(v.as_f64().unwrap_or(0.0) * 100.0)
    ///     }),
    /// );
    ///
    /// let root = SharedValue::from(json!({"price": 250}));
    /// assert_eq!(euros.get(&root), Some(SharedValue::from(2.5)));
    /// let root = euros.set(&root, SharedValue::from(4.0))?;
    /// assert_eq!(cents.get(&root), Some(SharedValue::from(400.0)));
    /// # Ok::<(), shape_schema_accessor::AccessorError>(())
    /// ```
    pub fn transform<G, S>(self, get: G, set: Option<S>) -> Transformed
    where
        G: Fn(&SharedValue) -> SharedValue + Send + Sync + 'static,
        S: Fn(SharedValue, Option<&SharedValue>) -> SharedValue + Send + Sync + 'static,
    {
        Transformed {
            inner: self,
            get: Arc::new(get),
            set: set.map(|s| Arc::new(s) as SetMapping),
        }
    }

    /// [`transform`](Self::transform) without an inverse; `set` on the
    /// result fails.
    pub fn transform_read_only<G>(self, get: G) -> Transformed
    where
        G: Fn(&SharedValue) -> SharedValue + Send + Sync + 'static,
    {
        Transformed {
            inner: self,
            get: Arc::new(get),
            set: None,
        }
    }

    /// Retypes this accessor to one branch of a union.
    ///
    /// When the accessor carries a schema, `schema_transform` must produce
    /// the schema of the chosen branch. Without a schema it is not called.
    ///
    /// # Errors
    ///
    /// [`AccessorError::NarrowWithoutTransform`] if the accessor carries a
    /// schema and no transform was given, or whatever the transform returns.
    pub fn narrow<F>(self, schema_transform: Option<F>) -> Result<Self>
    where
        F: FnOnce(&SchemaNode) -> Result<SchemaNode>,
    {
        if self.schema.is_none() {
            return Ok(self);
        }
        let Some(transform) = schema_transform else {
            return Err(AccessorError::NarrowWithoutTransform {
                path: render_path(&self.path),
            });
        };
        let schema = self.schema.as_ref().map(transform).transpose()?;
        Ok(Self {
            path: self.path,
            schema,
        })
    }

    /// Narrows to branch `index` of the carried `oneOf` or `anyOf`.
    ///
    /// # Errors
    ///
    /// [`AccessorError::NoSuchBranch`] if the schema has no such branch.
    pub fn narrow_to_branch(self, index: usize) -> Result<Self> {
        if self.schema.is_none() {
            return Ok(self);
        }
        let path = render_path(&self.path);
        self.narrow(Some(|node: &SchemaNode| {
            node.one_of
                .as_deref()
                .or(node.any_of.as_deref())
                .and_then(|branches| branches.get(index))
                .cloned()
                .ok_or(AccessorError::NoSuchBranch { path, index })
        }))
    }
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_path(&self.path))
    }
}

type GetMapping = Arc<dyn Fn(&SharedValue) -> SharedValue + Send + Sync>;
type SetMapping = Arc<dyn Fn(SharedValue, Option<&SharedValue>) -> SharedValue + Send + Sync>;

/// An [`Accessor`] whose reads and writes go through mappings.
///
/// Produced by [`Accessor::transform`]. A transformed accessor is a leaf:
/// it can be transformed again but not extended.
#[derive(Clone)]
pub struct Transformed {
    inner: Accessor,
    get: GetMapping,
    set: Option<SetMapping>,
}

impl fmt::Debug for Transformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transformed")
            .field("inner", &self.inner)
            .field("invertible", &self.set.is_some())
            .finish()
    }
}

impl Transformed {
    /// The untransformed accessor.
    pub fn inner(&self) -> &Accessor {
        &self.inner
    }

    pub fn is_invertible(&self) -> bool {
        self.set.is_some()
    }

    /// Reads through the get mapping. Missing values stay `None`.
    pub fn get(&self, root: &SharedValue) -> Option<SharedValue> {
        self.inner.get_ref(root).map(|value| (self.get)(value))
    }

    /// Writes through the set mapping.
    ///
    /// # Errors
    ///
    /// [`AccessorError::NoInverseMapping`] if no set mapping was given.
    pub fn set(&self, root: &SharedValue, value: SharedValue) -> Result<SharedValue> {
        let Some(set) = &self.set else {
            return Err(AccessorError::NoInverseMapping {
                path: render_path(&self.inner.path),
            });
        };
        let underlying = set(value, self.inner.get_ref(root));
        self.inner.set(root, underlying)
    }

    /// Layers another mapping on top of this one. The result is invertible
    /// only if both layers are.
    pub fn transform<G, S>(self, get: G, set: Option<S>) -> Transformed
    where
        G: Fn(&SharedValue) -> SharedValue + Send + Sync + 'static,
        S: Fn(SharedValue, Option<&SharedValue>) -> SharedValue + Send + Sync + 'static,
    {
        let inner_get = self.get;
        let composed_get: GetMapping = {
            let inner_get = Arc::clone(&inner_get);
            Arc::new(move |value: &SharedValue| get(&inner_get(value)))
        };
        let composed_set = match (self.set, set) {
            (Some(inner_set), Some(outer_set)) => Some(Arc::new(
                move |value: SharedValue, prior: Option<&SharedValue>| {
                    let mapped_prior = prior.map(|p| inner_get(p));
                    inner_set(outer_set(value, mapped_prior.as_ref()), prior)
                },
            ) as SetMapping),
            _ => None,
        };
        Transformed {
            inner: self.inner,
            get: composed_get,
            set: composed_set,
        }
    }
}

fn child_schema<'a>(node: &'a SchemaNode, segment: &PathSegment) -> Option<&'a SchemaNode> {
    match segment {
        PathSegment::Index(_) => node.items.as_deref(),
        PathSegment::Key(key) => node
            .properties
            .get(key)
            .or_else(|| {
                node.pattern_properties
                    .iter()
                    .find(|(pattern, _)| pattern_matches(pattern, key))
                    .map(|(_, child)| child)
            })
            .or(match &node.additional_properties {
                Some(AdditionalProperties::Schema(child)) => Some(child.as_ref()),
                _ => None,
            }),
    }
}

fn pattern_matches(pattern: &str, key: &str) -> bool {
    let cached = PATTERNS
        .read()
        .ok()
        .and_then(|patterns| patterns.get(pattern).cloned());
    let regex = match cached {
        Some(regex) => regex,
        None => {
            let regex = Regex::new(pattern).ok();
            if regex.is_none() {
                debug!(pattern, "ignoring pattern property that does not compile");
            }
            if let Ok(mut patterns) = PATTERNS.write() {
                patterns.insert(pattern.to_string(), regex.clone());
            }
            regex
        }
    };
    regex.is_some_and(|re| re.is_match(key))
}

/// Rebuilds `current` with `value` stored at `path[depth..]`.
fn set_in(
    current: Option<&SharedValue>,
    path: &[PathSegment],
    depth: usize,
    value: SharedValue,
) -> Result<SharedValue> {
    let Some(segment) = path.get(depth) else {
        return Ok(value);
    };
    let not_a_container = |found: &SharedValue| AccessorError::NotAContainer {
        path: render_path(&path[..depth]),
        found: found.kind_name(),
    };

    match segment {
        PathSegment::Key(key) => {
            let mut map = match current {
                Some(SharedValue::Object(map)) => (**map).clone(),
                None | Some(SharedValue::Null) => {
                    trace!(depth, key = %key, "creating missing object");
                    IndexMap::new()
                }
                Some(other) => return Err(not_a_container(other)),
            };
            let child = set_in(map.get(key), path, depth + 1, value)?;
            map.insert(key.clone(), child);
            Ok(SharedValue::Object(Arc::new(map)))
        }
        PathSegment::Index(index) => {
            let mut items = match current {
                Some(SharedValue::Array(items)) => (**items).clone(),
                None | Some(SharedValue::Null) => {
                    trace!(depth, index, "creating missing array");
                    Vec::new()
                }
                Some(other) => return Err(not_a_container(other)),
            };
            if items.len() <= *index {
                if *index - items.len() > MAX_ARRAY_PADDING {
                    return Err(AccessorError::IndexTooFar {
                        path: render_path(&path[..=depth]),
                        index: *index,
                        len: items.len(),
                    });
                }
                items.resize(*index + 1, SharedValue::Null);
            }
            let child = set_in(items.get(*index), path, depth + 1, value)?;
            items[*index] = child;
            Ok(SharedValue::Array(Arc::new(items)))
        }
    }
}
