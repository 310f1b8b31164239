//! Parameter checks run by resource methods before a request is built.
//!
//! Every rule fails fast with [`Error::InvalidConfig`] (or
//! [`Error::NotFound`] for local files), so a rejected call never touches the
//! network.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Parameters as a JSON object.
pub type Params = Map<String, Value>;

/// Valid `source` values for order filters.
pub const SOURCE: &[&str] = &[
    "OLC_CLIENT",
    "ZAPIER",
    "HUBSPOT",
    "SALESFORCE",
    "PODIO",
    "GOHIGHLEVEL",
];

/// Valid `paymentStatus` values for order filters.
pub const PAYMENT_STATUS: &[&str] = &["PENDING", "PAID", "PAYMENT_FAILED", "NOT_CHARGED"];

/// Valid `orderStatus` values for order filters.
pub const ORDER_STATUS: &[&str] = &["ON_HOLD", "SCHEDULED", "PROCESSING", "MAILED", "CANCELED"];

/// Requires `key` to be a non-empty string and returns it.
pub fn required_str<'a>(params: &'a Params, key: &str) -> Result<&'a str> {
    match params.get(key).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::InvalidConfig(format!(
            "The \"{}\" parameter is required and should be a non-empty string",
            key
        ))),
    }
}

/// Requires `key` to be an integer and returns it.
pub fn required_int(params: &Params, key: &str) -> Result<i64> {
    params.get(key).and_then(Value::as_i64).ok_or_else(|| {
        Error::InvalidConfig(format!(
            "The \"{}\" parameter is required and should be an integer",
            key
        ))
    })
}

/// Requires `key` to be present and either an integer or `null`.
pub fn int_or_null(params: &Params, key: &str) -> Result<Option<i64>> {
    match params.get(key) {
        None => Err(Error::InvalidConfig(format!(
            "The \"{}\" parameter is required",
            key
        ))),
        Some(Value::Null) => Ok(None),
        Some(value) => value.as_i64().map(Some).ok_or_else(|| {
            Error::InvalidConfig(format!(
                "The \"{}\" parameter should be either null or an integer",
                key
            ))
        }),
    }
}

/// If `key` is present it must be one of `allowed`.
pub fn optional_enum<'a>(
    params: &'a Params,
    key: &str,
    allowed: &[&str],
) -> Result<Option<&'a str>> {
    let Some(value) = params.get(key) else {
        return Ok(None);
    };

    match value.as_str() {
        Some(s) if allowed.contains(&s) => Ok(Some(s)),
        _ => Err(Error::InvalidConfig(format!(
            "The \"{}\" parameter must be one of: {}",
            key,
            allowed.join(", ")
        ))),
    }
}

/// Requires exactly one of `keys` to be present and returns the one that is.
pub fn exactly_one_of<'a>(params: &Params, keys: &[&'a str]) -> Result<&'a str> {
    let present: Vec<&str> = keys
        .iter()
        .copied()
        .filter(|key| params.contains_key(*key))
        .collect();

    match present.as_slice() {
        [only] => Ok(*only),
        _ => Err(Error::InvalidConfig(format!(
            "Exactly one of the parameters {} is required, got {}",
            quoted(keys),
            if present.is_empty() {
                "none".to_string()
            } else {
                quoted(&present)
            }
        ))),
    }
}

fn quoted(keys: &[&str]) -> String {
    keys.iter()
        .map(|k| format!("\"{}\"", k))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Requires `path` to reference an existing regular file.
pub fn existing_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::NotFound(format!(
            "The given file path is not valid: {}",
            path.display()
        )))
    }
}

/// A template custom field.
///
/// # Examples
///
/// ```
/// use olc::validation::CustomField;
///
/// let field = CustomField::new("{{CF.FIRST_NAME}}", "First Name");
/// assert!(field.is_valid());
///
/// let field = CustomField::new("first_name", "First Name");
/// assert!(!field.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    /// Placeholder key, e.g. `{{CF.FIRST_NAME}}`.
    pub key: String,
    /// Human readable label.
    pub value: String,
    /// Whether the field must be filled for every contact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    /// Fallback used when a contact has no value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl CustomField {
    /// Creates a field with the given key and label.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            strict: None,
            default_value: None,
        }
    }

    /// Marks the field strict or not.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    /// Sets the default value.
    pub fn with_default_value(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    /// Returns `true` if the key matches the placeholder shape and the label is
    /// not empty.
    pub fn is_valid(&self) -> bool {
        is_custom_field_key(&self.key) && !self.value.is_empty()
    }
}

/// Checks a dynamically typed field descriptor.
///
/// Valid iff `key` is a placeholder like `{{CF.FIRST_NAME}}`, `value` is a
/// non-empty string, and the optional `strict` / `defaultValue` entries are a
/// boolean and a string respectively.
pub fn custom_field(field: &Value) -> bool {
    let Some(field) = field.as_object() else {
        return false;
    };

    let key_ok = field
        .get("key")
        .and_then(Value::as_str)
        .is_some_and(is_custom_field_key);
    let value_ok = field
        .get("value")
        .and_then(Value::as_str)
        .is_some_and(|v| !v.is_empty());
    let strict_ok = field.get("strict").map_or(true, Value::is_boolean);
    let default_ok = field.get("defaultValue").map_or(true, Value::is_string);

    key_ok && value_ok && strict_ok && default_ok
}

/// Checks a list of field descriptors. Empty lists and non-arrays are invalid.
pub fn custom_field_list(list: &Value) -> bool {
    match list.as_array() {
        Some(fields) if !fields.is_empty() => fields.iter().all(custom_field),
        _ => false,
    }
}

/// Matches `{{UPPER.UPPER(_UPPER)*}}`.
fn is_custom_field_key(key: &str) -> bool {
    let Some(inner) = key.strip_prefix("{{").and_then(|k| k.strip_suffix("}}")) else {
        return false;
    };
    let Some((namespace, name)) = inner.split_once('.') else {
        return false;
    };

    let is_word = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_uppercase());

    is_word(namespace) && name.split('_').all(is_word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_required_str() {
        let p = params(json!({"title": "Postcard", "empty": "", "num": 3}));
        assert_eq!(required_str(&p, "title").unwrap(), "Postcard");
        assert!(matches!(required_str(&p, "empty"), Err(Error::InvalidConfig(_))));
        assert!(matches!(required_str(&p, "num"), Err(Error::InvalidConfig(_))));
        assert!(matches!(required_str(&p, "missing"), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_required_int() {
        let p = params(json!({"productId": 12, "tag": "12", "ratio": 1.5}));
        assert_eq!(required_int(&p, "productId").unwrap(), 12);
        assert!(required_int(&p, "tag").is_err());
        assert!(required_int(&p, "ratio").is_err());
        assert!(required_int(&p, "missing").is_err());
    }

    #[test]
    fn test_int_or_null() {
        let p = params(json!({"a": null, "b": 4, "c": "x"}));
        assert_eq!(int_or_null(&p, "a").unwrap(), None);
        assert_eq!(int_or_null(&p, "b").unwrap(), Some(4));
        assert!(int_or_null(&p, "c").is_err());
        assert!(int_or_null(&p, "d").is_err());
    }

    #[test]
    fn test_optional_enum() {
        let p = params(json!({"orderStatus": "MAILED", "source": "FAX", "paymentStatus": 1}));
        assert_eq!(optional_enum(&p, "orderStatus", ORDER_STATUS).unwrap(), Some("MAILED"));
        assert!(optional_enum(&p, "source", SOURCE).is_err());
        assert!(optional_enum(&p, "paymentStatus", PAYMENT_STATUS).is_err());
        assert_eq!(optional_enum(&p, "other", SOURCE).unwrap(), None);
    }

    #[test]
    fn test_exactly_one_of() {
        let keys = ["tag", "reqId", "contactIds"];

        let p = params(json!({"reqId": "r-1"}));
        assert_eq!(exactly_one_of(&p, &keys).unwrap(), "reqId");

        let p = params(json!({}));
        assert!(matches!(exactly_one_of(&p, &keys), Err(Error::InvalidConfig(_))));

        let p = params(json!({"tag": 1, "contactIds": [1]}));
        let err = exactly_one_of(&p, &keys).unwrap_err();
        assert!(err.to_string().contains("\"tag\", \"contactIds\""));
    }

    #[test]
    fn test_custom_field_rules() {
        assert!(custom_field(&json!({"key": "{{CF.FIRST_NAME}}", "value": "First Name"})));
        assert!(custom_field(&json!({
            "key": "{{CF.A_B_C}}",
            "value": "x",
            "strict": true,
            "defaultValue": "friend"
        })));

        assert!(!custom_field(&json!({"key": "first_name", "value": "x"})));
        assert!(!custom_field(&json!({"key": "{{CF.A}}", "value": ""})));
        assert!(!custom_field(&json!({"key": "{{CF.A}}", "value": "x", "strict": "yes"})));
        assert!(!custom_field(&json!({"key": "{{CF.A}}", "value": "x", "defaultValue": 3})));
        assert!(!custom_field(&json!({"key": "{{cf.a}}", "value": "x"})));
        assert!(!custom_field(&json!({"key": "{{CF.A__B}}", "value": "x"})));
        assert!(!custom_field(&json!({"key": "{{CF.A_}}", "value": "x"})));
        assert!(!custom_field(&json!({"key": "{{CF}}", "value": "x"})));
        assert!(!custom_field(&json!({"key": "{{CF.A.B}}", "value": "x"})));
        assert!(!custom_field(&json!("{{CF.A}}")));
    }

    #[test]
    fn test_custom_field_list() {
        let good = json!({"key": "{{CF.A}}", "value": "a"});
        let bad = json!({"key": "{{CF.A}}", "value": ""});

        assert!(custom_field_list(&json!([good.clone()])));
        assert!(!custom_field_list(&json!([good, bad])));
        assert!(!custom_field_list(&json!([])));
        assert!(!custom_field_list(&json!({"key": "{{CF.A}}", "value": "a"})));
    }

    #[test]
    fn test_typed_custom_field_serializes_camel_case() {
        let field = CustomField::new("{{CF.CITY}}", "City").with_default_value("Springfield");
        assert!(field.is_valid());
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["defaultValue"], "Springfield");
        assert!(value.get("strict").is_none());
        assert!(custom_field(&value));
    }

    #[test]
    fn test_existing_file() {
        let path = std::env::temp_dir().join(format!("olc-validation-{}.txt", std::process::id()));
        std::fs::write(&path, b"hello").unwrap();
        assert!(existing_file(&path).is_ok());
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(existing_file(&path), Err(Error::NotFound(_))));
        assert!(matches!(existing_file(&std::env::temp_dir()), Err(Error::NotFound(_))));
    }
}
