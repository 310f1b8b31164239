//! Path expressions for drilling into decoded JSON documents.
//!
//! A path is a sequence of segments written with dots and/or brackets:
//! `data.title`, `data[filePath]`, `data.items[0].id` and `data[items][0]`
//! all work. Numeric segments index into arrays; on objects every segment is
//! a key, numeric or not.

use crate::{Error, Result};
use serde_json::Value;
use std::str::FromStr;

/// A parsed path expression.
///
/// # Examples
///
/// ```
/// use olc::PathExpression;
/// use serde_json::json;
///
/// let doc = json!({"data": {"filePath": "x.json"}});
/// let path: PathExpression = "data[filePath]".parse().unwrap();
///
/// assert_eq!(path.resolve(&doc), Some(&json!("x.json")));
/// assert_eq!("data[missing]".parse::<PathExpression>().unwrap().resolve(&doc), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpression {
    segments: Vec<String>,
}

impl PathExpression {
    /// Parses a path expression.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for empty paths, empty segments
    /// (`a..b`, `a[]`) and unbalanced brackets.
    pub fn parse(expr: &str) -> Result<Self> {
        let invalid = |reason: &str| {
            Error::InvalidConfig(format!("Invalid path expression {:?}: {}", expr, reason))
        };

        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = expr.chars();
        // Set right after a closing bracket, where a segment may end without a dot.
        let mut after_bracket = false;

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if current.is_empty() && !after_bracket {
                        return Err(invalid("empty segment"));
                    }
                    if !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    }
                    after_bracket = false;
                }
                '[' => {
                    if !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    } else if segments.is_empty() {
                        return Err(invalid("path cannot start with a bracket"));
                    }

                    let mut key = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        match c {
                            ']' => {
                                closed = true;
                                break;
                            }
                            '[' => return Err(invalid("nested bracket")),
                            c => key.push(c),
                        }
                    }
                    if !closed {
                        return Err(invalid("unclosed bracket"));
                    }
                    if key.is_empty() {
                        return Err(invalid("empty segment"));
                    }
                    segments.push(key);
                    after_bracket = true;
                }
                ']' => return Err(invalid("unexpected closing bracket")),
                c => {
                    if after_bracket {
                        return Err(invalid("missing separator after bracket"));
                    }
                    current.push(c);
                }
            }
        }

        if !current.is_empty() {
            segments.push(current);
        } else if !after_bracket {
            return Err(invalid("empty segment"));
        }

        Ok(Self { segments })
    }

    /// The parsed segments, in walk order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Walks `root` along this path.
    ///
    /// Returns `None` as soon as a segment is missing or the current value
    /// cannot be indexed (strings, numbers, booleans, null).
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(root, |value, segment| step(value, segment))
    }
}

fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

impl FromStr for PathExpression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for PathExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i == 0 {
                write!(f, "{}", segment)?;
            } else {
                write!(f, "[{}]", segment)?;
            }
        }
        Ok(())
    }
}

/// Decodes `raw` as JSON and optionally resolves `path` inside it.
///
/// Without a path the whole document is returned. With a path, a missing
/// field yields `Ok(None)` rather than an error.
///
/// # Errors
///
/// Returns [`Error::Decode`] when `raw` is not valid JSON and
/// [`Error::InvalidConfig`] when `path` cannot be parsed.
pub fn extract(raw: &[u8], path: Option<&str>) -> Result<Option<Value>> {
    let path = path.map(PathExpression::parse).transpose()?;

    let document: Value = serde_json::from_slice(raw).map_err(|e| Error::Decode {
        raw_response: String::from_utf8_lossy(raw).into_owned(),
        serde_error: e.to_string(),
    })?;

    match path {
        None => Ok(Some(document)),
        Some(path) => Ok(path.resolve(&document).cloned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn segments(expr: &str) -> Vec<String> {
        PathExpression::parse(expr).unwrap().segments().to_vec()
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(segments("data"), vec!["data"]);
        assert_eq!(segments("data.title"), vec!["data", "title"]);
        assert_eq!(segments("data[filePath]"), vec!["data", "filePath"]);
        assert_eq!(segments("data.items[0].id"), vec!["data", "items", "0", "id"]);
        assert_eq!(segments("data[items][0]"), vec!["data", "items", "0"]);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for expr in ["", ".", "a..b", "a.", "a[]", "a[b", "a]b", "[a]", "a[b]c", "a[b[c]]"] {
            assert!(
                matches!(PathExpression::parse(expr), Err(Error::InvalidConfig(_))),
                "{:?} should be rejected",
                expr
            );
        }
    }

    #[test]
    fn test_resolve_objects_and_arrays() {
        let doc = json!({
            "message": "ok",
            "data": {
                "title": "Postcard",
                "items": [{"id": 7}, {"id": 8}],
                "0": "zero-key"
            }
        });

        let get = |expr: &str| PathExpression::parse(expr).unwrap().resolve(&doc).cloned();

        assert_eq!(get("data.title"), Some(json!("Postcard")));
        assert_eq!(get("data.items[1].id"), Some(json!(8)));
        assert_eq!(get("data[0]"), Some(json!("zero-key")));
        assert_eq!(get("data.items[2]"), None);
        assert_eq!(get("data.items[first]"), None);
        assert_eq!(get("data.title.length"), None);
        assert_eq!(get("message.x"), None);
    }

    #[test]
    fn test_resolve_through_null() {
        let doc = json!({"data": null});
        let path = PathExpression::parse("data.errors").unwrap();
        assert_eq!(path.resolve(&doc), None);
    }

    #[test]
    fn test_extract_without_path_returns_document() {
        let body = json!({"message": "ok", "data": {"a": [1, 2, {"b": null}]}});
        let raw = serde_json::to_vec(&body).unwrap();
        assert_eq!(extract(&raw, None).unwrap(), Some(body));
    }

    #[test]
    fn test_extract_with_path() {
        let raw = br#"{"data":{"filePath":"x.json"}}"#;
        assert_eq!(extract(raw, Some("data[filePath]")).unwrap(), Some(json!("x.json")));
        assert_eq!(extract(raw, Some("data[missing]")).unwrap(), None);
    }

    #[test]
    fn test_extract_malformed_json() {
        let result = extract(b"{not json", None);
        match result {
            Err(Error::Decode { raw_response, .. }) => assert_eq!(raw_response, "{not json"),
            other => panic!("Expected Decode, got {:?}", other),
        }
    }

    #[test]
    fn test_display_is_bracketed() {
        let path = PathExpression::parse("data.items[0]").unwrap();
        assert_eq!(path.to_string(), "data[items][0]");
        assert_eq!(PathExpression::parse(&path.to_string()).unwrap(), path);
    }
}
