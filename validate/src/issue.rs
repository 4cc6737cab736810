//! Validation issues and their formatted message.
//!
//! The validator records one [`ValidationIssue`] per failed rule, in
//! document order: an object's own rules before its properties, properties
//! in declaration order, an array's own rules before its items.
//! [`format_issues`] joins them into the single message carried by
//! [`SchemaValidationError::Invalid`](crate::SchemaValidationError::Invalid).

use std::fmt;

use serde::Serialize;

/// Leading text of every formatted message.
pub const MESSAGE_PREFIX: &str = "Invalid parameters: ";

/// Separator between issues in a formatted message.
pub const ISSUE_SEPARATOR: &str = ", ";

/// Name of the root value in rendered paths.
pub const ROOT_NAME: &str = "data";

/// Rule that produced an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Keyword {
    Type,
    Const,
    Enum,
    MinLength,
    MaxLength,
    Pattern,
    Format,
    Minimum,
    Maximum,
    ExclusiveMinimum,
    ExclusiveMaximum,
    MultipleOf,
    MinItems,
    MaxItems,
    UniqueItems,
    Required,
    MinProperties,
    MaxProperties,
    AdditionalProperties,
    OneOf,
    AnyOf,
    Not,
}

impl Keyword {
    /// Returns the schema keyword this rule comes from.
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Type => "type",
            Keyword::Const => "const",
            Keyword::Enum => "enum",
            Keyword::MinLength => "minLength",
            Keyword::MaxLength => "maxLength",
            Keyword::Pattern => "pattern",
            Keyword::Format => "format",
            Keyword::Minimum => "minimum",
            Keyword::Maximum => "maximum",
            Keyword::ExclusiveMinimum => "exclusiveMinimum",
            Keyword::ExclusiveMaximum => "exclusiveMaximum",
            Keyword::MultipleOf => "multipleOf",
            Keyword::MinItems => "minItems",
            Keyword::MaxItems => "maxItems",
            Keyword::UniqueItems => "uniqueItems",
            Keyword::Required => "required",
            Keyword::MinProperties => "minProperties",
            Keyword::MaxProperties => "maxProperties",
            Keyword::AdditionalProperties => "additionalProperties",
            Keyword::OneOf => "oneOf",
            Keyword::AnyOf => "anyOf",
            Keyword::Not => "not",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed rule.
///
/// # Examples
///
/// ```
/// use shape_schema_validate::{Keyword, ValidationIssue};
///
/// let issue = ValidationIssue {
///     instance_path: "/progress".into(),
///     keyword: Keyword::Minimum,
///     message: "must be >= 0".into(),
/// };
/// assert_eq!(issue.to_string(), "data/progress must be >= 0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// JSON pointer to the failing value; empty for the root.
    pub instance_path: String,
    pub keyword: Keyword,
    /// Human phrase, without the path.
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ROOT_NAME}{} {}", self.instance_path, self.message)
    }
}

/// Joins issues into one message.
///
/// With `all_errors == false` only the first issue is included.
///
/// # Examples
///
/// ```
/// use shape_schema_validate::{format_issues, Keyword, ValidationIssue};
///
/// let issues = vec![
///     ValidationIssue { instance_path: "".into(), keyword: Keyword::Required,
///         message: "must have required property 'name'".into() },
///     ValidationIssue { instance_path: "".into(), keyword: Keyword::Required,
///         message: "must have required property 'progress'".into() },
/// ];
/// assert_eq!(
///     format_issues(&issues, true),
///     "Invalid parameters: data must have required property 'name', \
///      data must have required property 'progress'"
/// );
/// assert_eq!(
///     format_issues(&issues, false),
///     "Invalid parameters: data must have required property 'name'"
/// );
/// ```
pub fn format_issues(issues: &[ValidationIssue], all_errors: bool) -> String {
    let shown = if all_errors { issues } else { &issues[..issues.len().min(1)] };
    let body = shown
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(ISSUE_SEPARATOR);
    format!("{MESSAGE_PREFIX}{body}")
}

/// Appends one reference token to a JSON pointer.
pub(crate) fn push_pointer_token(pointer: &mut String, token: &str) {
    pointer.push('/');
    pointer.push_str(&token.replace('~', "~0").replace('/', "~1"));
}

/// Renders a numeric bound the way JSON would print it (`0`, not `0.0`).
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
