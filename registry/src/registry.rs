//! Schema registry loading with builder pattern and fallback chains.
//!
//! Provides [`SchemaRegistry`] for lookup of named schema documents and
//! [`RegistryBuilder`] for constructing a registry from multiple sources with
//! automatic fallback.
//!
//! # Loading patterns
//!
//! ```no_run
//! use shape_schema_registry::SchemaRegistry;
//!
//! // Load from a directory of JSON or YAML schema files
//! let registry = SchemaRegistry::from_dir("schemas/").unwrap();
//! let task = registry.load_node("task").unwrap();
//!
//! // Load from a single SchemaBundle JSON file
//! let registry = SchemaRegistry::from_bundle("schemas.json").unwrap();
//!
//! // Use the builder for a fallback chain
//! let registry = SchemaRegistry::builder()
//!     .from_dir("schemas/")
//!     .from_bundle("schemas.json")
//!     .build()
//!     .unwrap();
//! ```

use std::collections::HashMap;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde_json::Value;
use shape_schema_core::SchemaNode;
use tracing::{debug, warn};

use crate::bundle::SchemaBundle;
use crate::deref::Resolver;
use crate::error::{RegistryError, Result};

/// Describes where a [`SchemaRegistry`] was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrySource {
    /// Built in memory.
    Memory,
    /// Loaded from a directory of individual schema files.
    Directory(PathBuf),
    /// Loaded from a single [`SchemaBundle`] JSON file.
    Bundle(PathBuf),
    /// Loaded via a fallback chain of multiple sources.
    Multiple(Vec<RegistrySource>),
}

/// Named raw schema documents.
///
/// Documents stay as [`serde_json::Value`] until requested, so references
/// between them can be resolved by [`dereference`](Self::dereference) before
/// anything is turned into a [`SchemaNode`].
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shape_schema_registry::SchemaRegistry;
///
/// let mut registry = SchemaRegistry::new();
/// registry.insert("id", json!({"type": "integer"}));
/// registry.insert("task", json!({
///     "type": "object",
///     "properties": {"id": {"$ref": "id"}},
///     "required": ["id"],
///     "additionalProperties": false
/// }));
///
/// let task = registry.load_node("task")?;
/// assert!(task.get_subschema("id").is_ok());
/// # Ok::<(), shape_schema_registry::RegistryError>(())
/// ```
#[derive(Debug)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Value>,
    source: RegistrySource,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    /// Creates an empty in-memory registry.
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
            source: RegistrySource::Memory,
        }
    }

    /// Returns a new [`RegistryBuilder`] for configuring a fallback chain.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Loads every `*.json`, `*.yaml` and `*.yml` file in a directory.
    ///
    /// Each document is registered under its file stem.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::IoError`] if the directory or a file cannot
    /// be read, or [`RegistryError::JsonError`] / [`RegistryError::YamlError`]
    /// if a file fails to parse.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut schemas = HashMap::new();

        for entry in std::fs::read_dir(path)? {
            let file_path = entry?.path();
            let Some(name) = file_path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let document: Value = match file_path.extension().and_then(|e| e.to_str()) {
                Some("json") => {
                    let reader = BufReader::new(std::fs::File::open(&file_path)?);
                    serde_json::from_reader(reader)?
                }
                Some("yaml" | "yml") => {
                    let reader = BufReader::new(std::fs::File::open(&file_path)?);
                    serde_yaml::from_reader(reader)?
                }
                _ => continue,
            };
            debug!(name, path = %file_path.display(), "loaded schema document");
            schemas.insert(name.to_string(), document);
        }

        debug!(count = schemas.len(), dir = %path.display(), "loaded schema directory");
        Ok(Self {
            schemas,
            source: RegistrySource::Directory(path.to_path_buf()),
        })
    }

    /// Loads documents from a single [`SchemaBundle`] JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::IoError`] if the file cannot be read, or
    /// [`RegistryError::JsonError`] if parsing fails.
    pub fn from_bundle(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let bundle: SchemaBundle = serde_json::from_reader(reader)?;
        debug!(
            count = bundle.schema_count(),
            version = %bundle.version,
            "loaded schema bundle"
        );

        Ok(Self {
            schemas: bundle.schemas.into_iter().collect(),
            source: RegistrySource::Bundle(path.to_path_buf()),
        })
    }

    /// Returns the raw document registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// Registers a document, replacing any existing one with the same name.
    pub fn insert(&mut self, name: impl Into<String>, document: Value) {
        self.schemas.insert(name.into(), document);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Returns an iterator over registered names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(|s| s.as_str())
    }

    /// Returns a reference to the source metadata.
    pub fn source(&self) -> &RegistrySource {
        &self.source
    }

    /// Returns `document` with every `$ref` inlined.
    ///
    /// Local references (`#/definitions/x`, `#/$defs/x`, or any other JSON
    /// pointer) resolve against `document`; `name` and `name#/pointer`
    /// resolve against registered documents. `definitions` and `$defs`
    /// blocks are dropped from the output. Keywords next to a `$ref`
    /// override those of the referenced schema.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnresolvedRef`] for references that point at
    /// nothing, [`RegistryError::RefCycle`] for self-referencing chains.
    pub fn dereference(&self, document: &Value) -> Result<Value> {
        Resolver::new(self).resolve_document(document, None)
    }

    /// Dereferences the document registered under `name` and turns it into
    /// a [`SchemaNode`].
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownSchema`] if `name` is not registered, plus
    /// the errors of [`dereference`](Self::dereference) and
    /// [`SchemaNode::from_value`].
    pub fn load_node(&self, name: &str) -> Result<SchemaNode> {
        let document = self
            .get(name)
            .ok_or_else(|| RegistryError::UnknownSchema(name.to_string()))?;
        let resolved = Resolver::new(self).resolve_document(document, Some(name))?;
        Ok(SchemaNode::from_value(resolved)?)
    }
}

/// Builder for constructing a [`SchemaRegistry`] with a fallback chain.
///
/// Sources are tried in the order they are added. The first successful load
/// wins; if all fail, [`RegistryError::NoSourcesAvailable`] is returned.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    sources: Vec<RegistrySource>,
}

impl RegistryBuilder {
    /// Creates a new builder with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory of schema files as a source.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(RegistrySource::Directory(path.into()));
        self
    }

    /// Adds a [`SchemaBundle`] file as a source.
    pub fn from_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(RegistrySource::Bundle(path.into()));
        self
    }

    /// Attempts to load from configured sources in order.
    ///
    /// Returns the first successfully loaded registry. If all sources fail,
    /// returns [`RegistryError::NoSourcesAvailable`].
    pub fn build(self) -> Result<SchemaRegistry> {
        for source in &self.sources {
            let result = match source {
                RegistrySource::Directory(path) => SchemaRegistry::from_dir(path),
                RegistrySource::Bundle(path) => SchemaRegistry::from_bundle(path),
                RegistrySource::Memory | RegistrySource::Multiple(_) => continue,
            };

            match result {
                Ok(mut registry) => {
                    registry.source = RegistrySource::Multiple(self.sources.clone());
                    return Ok(registry);
                }
                Err(err) => warn!(?source, error = %err, "schema source failed, trying next"),
            }
        }

        Err(RegistryError::NoSourcesAvailable)
    }
}
