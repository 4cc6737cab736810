//! Path segments and the dotted path syntax.
//!
//! `owner.tags[0]` is the text form of `[Key("owner"), Key("tags"),
//! Index(0)]`. Keys that are not plain identifiers use the quoted bracket
//! form, e.g. `headers["content-type"]`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AccessorError, Result};

static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("static regex must compile"));

/// One step of an accessor path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object member.
    Key(String),
    /// Array element.
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) if IDENT_RE.is_match(key) => write!(f, ".{key}"),
            PathSegment::Key(key) => write!(f, "[{key:?}]"),
            PathSegment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// Renders a path in the text syntax accepted by [`parse_path`].
pub fn render_path(path: &[PathSegment]) -> String {
    let text: String = path.iter().map(ToString::to_string).collect();
    text.strip_prefix('.').map(str::to_string).unwrap_or(text)
}

/// Parses the text syntax into segments. The empty string is the root.
///
/// # Examples
///
/// ```
/// use shape_schema_accessor::{parse_path, PathSegment};
///
/// assert_eq!(
///     parse_path("a[0].n").unwrap(),
///     vec![PathSegment::from("a"), PathSegment::from(0), PathSegment::from("n")]
/// );
/// assert_eq!(parse_path(r#"h["x.y"]"#).unwrap()[1], PathSegment::from("x.y"));
/// assert!(parse_path("a..b").is_err());
/// ```
pub fn parse_path(text: &str) -> Result<Vec<PathSegment>> {
    let invalid = |reason: &str| AccessorError::InvalidPath {
        path: text.to_string(),
        reason: reason.to_string(),
    };

    let mut segments = Vec::new();
    let mut rest = text;
    let mut expect_key = true;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('[') {
            let close = after.find(']').ok_or_else(|| invalid("unclosed '['"))?;
            let inner = &after[..close];
            if inner.starts_with('"') {
                // quoted keys may contain ']', so look for the closing quote
                let end = find_closing_quote(after).ok_or_else(|| invalid("unclosed quoted key"))?;
                let key: String = serde_json::from_str(&after[..=end])
                    .map_err(|err| invalid(&err.to_string()))?;
                let tail = after[end + 1..]
                    .strip_prefix(']')
                    .ok_or_else(|| invalid("expected ']' after quoted key"))?;
                segments.push(PathSegment::Key(key));
                rest = tail;
            } else {
                let index = inner
                    .parse::<usize>()
                    .map_err(|_| invalid("index must be a non-negative integer"))?;
                segments.push(PathSegment::Index(index));
                rest = &after[close + 1..];
            }
            expect_key = false;
            continue;
        }

        let body = if expect_key && segments.is_empty() {
            rest
        } else {
            rest.strip_prefix('.')
                .ok_or_else(|| invalid("expected '.' or '['"))?
        };
        let end = body.find(['.', '[']).unwrap_or(body.len());
        let key = &body[..end];
        if key.is_empty() {
            return Err(invalid("empty key"));
        }
        if key.contains([']', '"']) {
            return Err(invalid("unquoted key contains ']' or '\"'"));
        }
        segments.push(PathSegment::Key(key.to_string()));
        rest = &body[end..];
        expect_key = false;
    }
    Ok(segments)
}

/// Byte offset of the quote closing the JSON string starting at `text[0]`.
fn find_closing_quote(text: &str) -> Option<usize> {
    let mut escaped = false;
    for (offset, c) in text.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(offset),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_segments() {
        assert_eq!(
            parse_path("items[2][0].name").unwrap(),
            vec![
                PathSegment::from("items"),
                PathSegment::from(2),
                PathSegment::from(0),
                PathSegment::from("name"),
            ]
        );
        assert_eq!(parse_path("[1]").unwrap(), vec![PathSegment::Index(1)]);
        assert!(parse_path("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed_paths() {
        for bad in ["a.", ".a", "a[", "a[-1]", "a[x]", "a]b", r#"a["b"#, "a[0]b"] {
            assert!(
                matches!(parse_path(bad), Err(AccessorError::InvalidPath { .. })),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn test_render_round_trips() {
        for text in ["a[0].n", r#"headers["content-type"]"#, "[3].x", r#"["a]b"].c"#] {
            assert_eq!(render_path(&parse_path(text).unwrap()), text);
        }
    }
}
