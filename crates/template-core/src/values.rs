//! Value representations produced by sources and assembled into documents.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Value produced by a source or assembled by the document builder.
///
/// Mirrors the JSON data model. Objects keep insertion order so that a
/// generated document lists its fields in template order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeneratedValue {
    /// Null value
    Null,

    /// Boolean value
    Bool(bool),

    /// 64-bit signed integer
    Int(i64),

    /// Unsigned integer above `i64::MAX`
    UInt(u64),

    /// 64-bit floating point
    Float(f64),

    /// String value
    String(String),

    /// Array of values
    Array(Vec<GeneratedValue>),

    /// Object/map of values
    Object(IndexMap<String, GeneratedValue>),
}

impl GeneratedValue {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as a u64.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Int(i) => u64::try_from(*i).ok(),
            Self::UInt(u) => Some(*u),
            _ => None,
        }
    }

    /// Try to get this value as an f64 (integers are widened).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            Self::UInt(u) => Some(*u as f64),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as an array slice.
    pub fn as_array(&self) -> Option<&[GeneratedValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Try to get this value as an object.
    pub fn as_object(&self) -> Option<&IndexMap<String, GeneratedValue>> {
        match self {
            Self::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Look up a field of an object value.
    pub fn get(&self, key: &str) -> Option<&GeneratedValue> {
        self.as_object().and_then(|fields| fields.get(key))
    }

    /// Convert into a `serde_json::Value`.
    ///
    /// Non-finite floats have no JSON representation and become `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Int(i) => JsonValue::from(*i),
            Self::UInt(u) => JsonValue::from(*u),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Self::String(s) => JsonValue::String(s.clone()),
            Self::Array(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(fields) => JsonValue::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<&JsonValue> for GeneratedValue {
    fn from(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Self::UInt(u)
                } else if let Some(f) = n.as_f64() {
                    Self::Float(f)
                } else {
                    Self::String(n.to_string())
                }
            }
            JsonValue::String(s) => Self::String(s.clone()),
            JsonValue::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
            JsonValue::Object(fields) => Self::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_shape() {
        let json = json!({"name": "x", "tags": [1, 2.5, true, null]});
        let value = GeneratedValue::from(&json);

        assert_eq!(value.get("name").and_then(|v| v.as_str()), Some("x"));
        let tags = value.get("tags").and_then(|v| v.as_array()).unwrap();
        assert_eq!(tags[0], GeneratedValue::Int(1));
        assert_eq!(tags[1], GeneratedValue::Float(2.5));
        assert_eq!(tags[2], GeneratedValue::Bool(true));
        assert!(tags[3].is_null());
        assert_eq!(value.to_json(), json);
    }

    #[test]
    fn test_object_keeps_field_order() {
        let mut fields = IndexMap::new();
        fields.insert("zeta".to_string(), GeneratedValue::Int(1));
        fields.insert("alpha".to_string(), GeneratedValue::Int(2));
        let value = GeneratedValue::Object(fields);

        let serialized = serde_json::to_string(&value).unwrap();
        assert_eq!(serialized, r#"{"zeta":1,"alpha":2}"#);
    }

    #[test]
    fn test_from_json_large_unsigned() {
        let json = json!(u64::MAX);
        let value = GeneratedValue::from(&json);

        assert_eq!(value, GeneratedValue::UInt(u64::MAX));
        assert_eq!(value.as_u64(), Some(u64::MAX));
        assert_eq!(value.as_i64(), None);
        assert_eq!(value.to_json(), json);
        assert_eq!(serde_json::to_string(&value).unwrap(), "18446744073709551615");

        // Values that fit stay signed.
        assert_eq!(GeneratedValue::from(&json!(7u64)), GeneratedValue::Int(7));
    }

    #[test]
    fn test_non_finite_float_to_json() {
        assert_eq!(GeneratedValue::Float(f64::NAN).to_json(), JsonValue::Null);
    }
}
