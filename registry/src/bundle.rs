use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Serializable set of named schema documents, distributed as one JSON file.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shape_schema_registry::SchemaBundle;
///
/// let mut bundle = SchemaBundle::new("1.0.0");
/// bundle.name = Some("api".into());
/// bundle.schemas.insert("task".into(), json!({"type": "object"}));
///
/// assert_eq!(bundle.schema_count(), 1);
/// assert_eq!(bundle.version, "1.0.0");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaBundle {
    /// Bundle format version (semver string).
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Raw schema documents keyed by the name `$ref` uses to reach them.
    #[serde(default)]
    pub schemas: IndexMap<String, Value>,
}

impl SchemaBundle {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Default::default()
        }
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}
