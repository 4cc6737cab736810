//! Validation configuration.
//!
//! [`ValidationOptions`] is the full policy a validator is compiled with.
//! [`ValidationOverrides`] carries a partial update. [`ValidationContext`] is
//! a shared, injectable handle holding the default policy for schemas that
//! have no explicit configuration of their own;
//! [`ValidationContext::global`] is the process-wide instance.
//!
//! # Example YAML
//!
//! ```yaml
//! coerceTypes: true
//! removeAdditional: true
//! useDefaults: true
//! strict: false
//! allErrors: false
//! ```

use std::io::BufReader;
use std::path::Path;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Policy applied when a validator is compiled and run.
///
/// # Examples
///
/// ```
/// use shape_schema_validate::ValidationOptions;
///
/// let options = ValidationOptions::default();
/// assert!(options.use_defaults);
/// assert!(options.all_errors);
/// assert!(!options.coerce_types);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationOptions {
    /// Convert mismatched but convertible scalars to the declared type.
    pub coerce_types: bool,
    /// Strip properties a closed object does not permit instead of failing.
    pub remove_additional: bool,
    /// Fill declared defaults for missing required properties.
    pub use_defaults: bool,
    /// Reject ambiguous schema constructs at compile time.
    pub strict: bool,
    /// Collect every issue instead of stopping at the first.
    pub all_errors: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            coerce_types: false,
            remove_additional: false,
            use_defaults: true,
            strict: false,
            all_errors: true,
        }
    }
}

impl ValidationOptions {
    /// Loads options from a YAML file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_yaml::from_reader(reader)?)
    }

    /// Returns these options with `overrides` applied.
    pub fn with_overrides(self, overrides: ValidationOverrides) -> Self {
        Self {
            coerce_types: overrides.coerce_types.unwrap_or(self.coerce_types),
            remove_additional: overrides.remove_additional.unwrap_or(self.remove_additional),
            use_defaults: overrides.use_defaults.unwrap_or(self.use_defaults),
            strict: overrides.strict.unwrap_or(self.strict),
            all_errors: overrides.all_errors.unwrap_or(self.all_errors),
        }
    }
}

/// Partial update of [`ValidationOptions`]; unset fields keep their value.
///
/// # Examples
///
/// ```
/// use shape_schema_validate::{ValidationOptions, ValidationOverrides};
///
/// let options = ValidationOptions::default().with_overrides(ValidationOverrides {
///     all_errors: Some(false),
///     ..Default::default()
/// });
/// assert!(!options.all_errors);
/// assert!(options.use_defaults);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coerce_types: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_additional: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_defaults: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_errors: Option<bool>,
}

static GLOBAL: LazyLock<ValidationContext> = LazyLock::new(ValidationContext::default);

/// Shared default validation policy.
///
/// Clones share the same underlying value. A schema reads its context when
/// its validator is first compiled, so changes made before that point take
/// effect and changes made afterwards do not.
///
/// # Examples
///
/// ```
/// use shape_schema_validate::{ValidationContext, ValidationOverrides};
///
/// let context = ValidationContext::default();
/// let handle = context.clone();
/// handle.update(ValidationOverrides { coerce_types: Some(true), ..Default::default() });
/// assert!(context.get().coerce_types);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    inner: Arc<RwLock<ValidationOptions>>,
}

impl ValidationContext {
    /// Creates an independent context starting from `options`.
    pub fn new(options: ValidationOptions) -> Self {
        Self {
            inner: Arc::new(RwLock::new(options)),
        }
    }

    /// Returns the process-wide context.
    pub fn global() -> Self {
        GLOBAL.clone()
    }

    pub fn get(&self) -> ValidationOptions {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, options: ValidationOptions) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = options;
    }

    /// Applies `overrides` to the current value.
    pub fn update(&self, overrides: ValidationOverrides) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = guard.with_overrides(overrides);
    }

    /// Restores [`ValidationOptions::default`].
    pub fn reset(&self) {
        self.set(ValidationOptions::default());
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_overrides_leave_unset_fields() {
        let base = ValidationOptions {
            strict: true,
            ..Default::default()
        };
        let merged = base.with_overrides(ValidationOverrides {
            remove_additional: Some(true),
            ..Default::default()
        });
        assert!(merged.strict);
        assert!(merged.remove_additional);
        assert_eq!(merged.all_errors, base.all_errors);
    }

    #[test]
    fn test_contexts_are_independent() {
        let a = ValidationContext::default();
        let b = ValidationContext::default();
        a.set(ValidationOptions {
            coerce_types: true,
            ..Default::default()
        });
        assert!(a.get().coerce_types);
        assert!(!b.get().coerce_types);

        a.reset();
        assert_eq!(a.get(), ValidationOptions::default());
    }

    #[test]
    fn test_load_from_yaml_with_missing_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "coerceTypes: true\nallErrors: false").unwrap();

        let options = ValidationOptions::load(file.path()).unwrap();
        assert!(options.coerce_types);
        assert!(!options.all_errors);
        assert!(options.use_defaults);
    }

    #[test]
    fn test_load_reports_yaml_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "coerceTypes: [not, a, bool]").unwrap();

        let err = ValidationOptions::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }
}
