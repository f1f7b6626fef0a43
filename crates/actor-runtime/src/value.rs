//! # Variant Values
//!
//! Arguments and results cross process (and language) boundaries, so they are carried as a
//! tagged [`Value`] instead of concrete Rust types. Every conversion to a concrete type is
//! explicit and returns a [`ConversionError`] on a shape mismatch.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// A dynamically shaped value with an explicit discriminant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

/// Returned when a [`Value`] does not have the requested shape.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Expected {expected}, found {found}")]
pub struct ConversionError {
    pub expected: &'static str,
    pub found: &'static str,
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    fn mismatch(&self, expected: &'static str) -> ConversionError {
        ConversionError {
            expected,
            found: self.kind(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Result<&str, ConversionError> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(other.mismatch("string")),
        }
    }

    pub fn as_i64(&self) -> Result<i64, ConversionError> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(other.mismatch("int")),
        }
    }

    /// Integers widen to floats; nothing else does.
    pub fn as_f64(&self) -> Result<f64, ConversionError> {
        match self {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            other => Err(other.mismatch("float")),
        }
    }

    pub fn as_bool(&self) -> Result<bool, ConversionError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(other.mismatch("bool")),
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8], ConversionError> {
        match self {
            Value::Bytes(b) => Ok(b),
            other => Err(other.mismatch("bytes")),
        }
    }

    pub fn as_list(&self) -> Result<&[Value], ConversionError> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(other.mismatch("list")),
        }
    }

    pub fn as_map(&self) -> Result<&BTreeMap<String, Value>, ConversionError> {
        match self {
            Value::Map(map) => Ok(map),
            other => Err(other.mismatch("map")),
        }
    }

    /// Converts a list of strings, e.g. the `REDIRECT_DESTINATION` error parameter.
    pub fn to_string_list(&self) -> Result<Vec<String>, ConversionError> {
        self.as_list()?
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect()
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => f.write_str(s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {item}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items.into_iter().map(Value::String).collect())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl TryFrom<Value> for String {
    type Error = ConversionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(other.mismatch("string")),
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = ConversionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.as_i64()
    }
}

impl TryFrom<Value> for bool {
    type Error = ConversionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.as_bool()
    }
}

impl TryFrom<Value> for Vec<String> {
    type Error = ConversionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.to_string_list()
    }
}

impl TryFrom<Value> for () {
    type Error = ConversionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(()),
            other => Err(other.mismatch("null")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_conversions() {
        assert_eq!(Value::from("hello").as_str(), Ok("hello"));
        assert_eq!(Value::from(3_i64).as_f64(), Ok(3.0));
        assert_eq!(
            Value::from(true).as_str(),
            Err(ConversionError {
                expected: "string",
                found: "bool"
            })
        );
    }

    #[test]
    fn test_string_list_rejects_mixed_items() {
        let ok = Value::from(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(ok.to_string_list().unwrap(), vec!["a", "b"]);

        let mixed = Value::List(vec![Value::from("a"), Value::Int(1)]);
        assert!(mixed.to_string_list().is_err());
    }

    #[test]
    fn test_tagged_serialization() {
        let json = serde_json::to_string(&Value::from("x")).unwrap();
        assert_eq!(json, r#"{"type":"string","value":"x"}"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Value::from("x"));
    }
}
