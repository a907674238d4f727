//! Bind values for command parameters
//!
//! This module defines:
//! - ParamValue: closed set of value shapes a parameter can carry
//! - ValueKind: the coarse classification used by id promotion and sequences
//!
//! ## Kind Rules
//!
//! - `Text` and `Guid` are eligible for id promotion
//! - `Int16`, `Int32` and `Int64` are sequence-eligible (`ValueKind::Integer`)
//! - Everything else (bool, float, null, arrays, objects) is `Other`
//!
//! The kind is fixed when the value is bound; nothing downstream inspects
//! runtime types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A parameter value, classified at bind time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    /// UTF-8 string
    Text(String),
    /// GUID, written to documents in hyphenated lower-case form
    Guid(Uuid),
    /// 16-bit signed integer
    Int16(i16),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// Any other JSON value (bool, float, null, array, object)
    Other(serde_json::Value),
}

/// Coarse classification of a [`ParamValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// String value
    Text,
    /// GUID value
    Guid,
    /// Any integer width
    Integer,
    /// Everything else
    Other,
}

impl ValueKind {
    /// Whether values of this kind may be promoted to the document `id`.
    pub fn is_id_kind(self) -> bool {
        matches!(self, ValueKind::Text | ValueKind::Guid)
    }

    /// Whether values of this kind trigger sequence allocation.
    pub fn is_sequence_kind(self) -> bool {
        matches!(self, ValueKind::Integer)
    }
}

impl ParamValue {
    /// The kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            ParamValue::Text(_) => ValueKind::Text,
            ParamValue::Guid(_) => ValueKind::Guid,
            ParamValue::Int16(_) | ParamValue::Int32(_) | ParamValue::Int64(_) => {
                ValueKind::Integer
            }
            ParamValue::Other(_) => ValueKind::Other,
        }
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Text(_) => "Text",
            ParamValue::Guid(_) => "Guid",
            ParamValue::Int16(_) => "Int16",
            ParamValue::Int32(_) => "Int32",
            ParamValue::Int64(_) => "Int64",
            ParamValue::Other(_) => "Other",
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Other(serde_json::Value::Null))
    }

    /// Get as i64 if this is any integer width
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int16(v) => Some(i64::from(*v)),
            ParamValue::Int32(v) => Some(i64::from(*v)),
            ParamValue::Int64(v) => Some(*v),
            ParamValue::Other(v) => v.as_i64(),
            _ => None,
        }
    }

    /// Get as &str if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value the way a document stores it.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ParamValue::Text(s) => serde_json::Value::String(s.clone()),
            ParamValue::Guid(g) => serde_json::Value::String(g.hyphenated().to_string()),
            ParamValue::Int16(v) => serde_json::Value::from(*v),
            ParamValue::Int32(v) => serde_json::Value::from(*v),
            ParamValue::Int64(v) => serde_json::Value::from(*v),
            ParamValue::Other(v) => v.clone(),
        }
    }

    /// The string form used for store-level primary keys.
    ///
    /// Returns `None` for values that cannot act as an `id`.
    pub fn to_id_string(&self) -> Option<String> {
        match self {
            ParamValue::Text(s) => Some(s.clone()),
            ParamValue::Guid(g) => Some(g.hyphenated().to_string()),
            ParamValue::Int16(_) | ParamValue::Int32(_) | ParamValue::Int64(_) => {
                self.as_i64().map(|v| v.to_string())
            }
            ParamValue::Other(_) => None,
        }
    }
}

// From implementations for ergonomic binding

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

impl From<Uuid> for ParamValue {
    fn from(g: Uuid) -> Self {
        ParamValue::Guid(g)
    }
}

impl From<i16> for ParamValue {
    fn from(v: i16) -> Self {
        ParamValue::Int16(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int32(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int64(v)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Other(serde_json::Value::Bool(b))
    }
}

impl From<f64> for ParamValue {
    fn from(f: f64) -> Self {
        ParamValue::Other(serde_json::Value::from(f))
    }
}

impl From<serde_json::Value> for ParamValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::String(s) => ParamValue::Text(s),
            other => ParamValue::Other(other),
        }
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into)
            .unwrap_or(ParamValue::Other(serde_json::Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_widths_share_a_kind() {
        assert_eq!(ParamValue::from(1i16).kind(), ValueKind::Integer);
        assert_eq!(ParamValue::from(1i32).kind(), ValueKind::Integer);
        assert_eq!(ParamValue::from(1i64).kind(), ValueKind::Integer);
        assert!(ValueKind::Integer.is_sequence_kind());
        assert!(!ValueKind::Integer.is_id_kind());
    }

    #[test]
    fn text_and_guid_are_id_kinds() {
        assert!(ParamValue::from("a").kind().is_id_kind());
        assert!(ParamValue::from(Uuid::nil()).kind().is_id_kind());
        assert!(!ParamValue::from(true).kind().is_id_kind());
        assert!(!ParamValue::from(1.5).kind().is_id_kind());
    }

    #[test]
    fn guid_renders_hyphenated() {
        let g = Uuid::parse_str("6ba7b810-9dad-11d1-80b4-00c04fd430c8").unwrap();
        let v = ParamValue::from(g);
        assert_eq!(
            v.to_json(),
            serde_json::json!("6ba7b810-9dad-11d1-80b4-00c04fd430c8")
        );
        assert_eq!(
            v.to_id_string().as_deref(),
            Some("6ba7b810-9dad-11d1-80b4-00c04fd430c8")
        );
    }

    #[test]
    fn json_strings_become_text() {
        assert_eq!(
            ParamValue::from(serde_json::json!("x")),
            ParamValue::Text("x".into())
        );
        assert_eq!(
            ParamValue::from(serde_json::json!(3)).kind(),
            ValueKind::Other
        );
    }

    #[test]
    fn none_is_null() {
        let v: ParamValue = Option::<i32>::None.into();
        assert!(v.is_null());
        assert_eq!(v.to_id_string(), None);
    }

    #[test]
    fn as_i64_widens() {
        assert_eq!(ParamValue::Int16(-3).as_i64(), Some(-3));
        assert_eq!(ParamValue::Int32(7).as_i64(), Some(7));
        assert_eq!(ParamValue::Text("7".into()).as_i64(), None);
    }
}
