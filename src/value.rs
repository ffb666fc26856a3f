//! Persistent value tree shared between the host form and the engine.
//!
//! Arrays and objects sit behind `Arc`, so cloning a tree is cheap and
//! untouched subtrees keep their identity across path updates.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

/// Object map inside a [`ValueTree`].
pub type ObjectMap = IndexMap<String, ValueTree>;

/// Nested data edited by a form.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ValueTree {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Arc<Vec<ValueTree>>),
    Object(Arc<ObjectMap>),
}

impl ValueTree {
    pub fn empty_object() -> Self {
        ValueTree::Object(Arc::new(ObjectMap::new()))
    }

    pub fn empty_array() -> Self {
        ValueTree::Array(Arc::new(Vec::new()))
    }

    /// Build a number, mapping NaN and infinities to `0`.
    pub fn from_f64(value: f64) -> Self {
        Number::from_f64(value)
            .map(ValueTree::Number)
            .unwrap_or_else(|| ValueTree::Number(Number::from(0)))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ValueTree::Null)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, ValueTree::Object(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ValueTree::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ValueTree::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ValueTree::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ValueTree]> {
        match self {
            ValueTree::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectMap> {
        match self {
            ValueTree::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key on an object. Any other variant yields `None`.
    pub fn get(&self, key: &str) -> Option<&ValueTree> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Strict equality used by condition matching.
    ///
    /// Numbers compare by value, so `1` equals `1.0`; everything else compares
    /// structurally.
    pub fn strict_eq(&self, other: &ValueTree) -> bool {
        match (self, other) {
            (ValueTree::Number(a), ValueTree::Number(b)) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => a == b,
            },
            _ => self == other,
        }
    }

    /// Whether both trees are the same allocation (composites) or equal
    /// scalars. Used to detect structural sharing after updates.
    pub fn ptr_eq(&self, other: &ValueTree) -> bool {
        match (self, other) {
            (ValueTree::Array(a), ValueTree::Array(b)) => Arc::ptr_eq(a, b),
            (ValueTree::Object(a), ValueTree::Object(b)) => Arc::ptr_eq(a, b),
            (ValueTree::Array(_), _) | (ValueTree::Object(_), _) => false,
            _ => self == other,
        }
    }

    /// Text shown in a single-line input.
    ///
    /// Strings render raw, other scalars by their JSON spelling, `null` and
    /// composites as empty.
    pub fn display_text(&self) -> String {
        match self {
            ValueTree::Null | ValueTree::Array(_) | ValueTree::Object(_) => String::new(),
            ValueTree::Bool(b) => b.to_string(),
            ValueTree::Number(n) => n.to_string(),
            ValueTree::String(s) => s.clone(),
        }
    }

    pub fn to_json(&self) -> Value {
        Value::from(self)
    }
}

impl From<Value> for ValueTree {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ValueTree::Null,
            Value::Bool(b) => ValueTree::Bool(b),
            Value::Number(n) => ValueTree::Number(n),
            Value::String(s) => ValueTree::String(s),
            Value::Array(arr) => {
                ValueTree::Array(Arc::new(arr.into_iter().map(ValueTree::from).collect()))
            }
            Value::Object(map) => ValueTree::Object(Arc::new(
                map.into_iter()
                    .map(|(k, v)| (k, ValueTree::from(v)))
                    .collect(),
            )),
        }
    }
}

impl From<&Value> for ValueTree {
    fn from(value: &Value) -> Self {
        ValueTree::from(value.clone())
    }
}

impl From<&ValueTree> for Value {
    fn from(value: &ValueTree) -> Self {
        match value {
            ValueTree::Null => Value::Null,
            ValueTree::Bool(b) => Value::Bool(*b),
            ValueTree::Number(n) => Value::Number(n.clone()),
            ValueTree::String(s) => Value::String(s.clone()),
            ValueTree::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            ValueTree::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for ValueTree {
    fn from(s: &str) -> Self {
        ValueTree::String(s.to_string())
    }
}

impl From<String> for ValueTree {
    fn from(s: String) -> Self {
        ValueTree::String(s)
    }
}

impl From<bool> for ValueTree {
    fn from(b: bool) -> Self {
        ValueTree::Bool(b)
    }
}

impl From<i64> for ValueTree {
    fn from(n: i64) -> Self {
        ValueTree::Number(Number::from(n))
    }
}

impl From<Vec<ValueTree>> for ValueTree {
    fn from(items: Vec<ValueTree>) -> Self {
        ValueTree::Array(Arc::new(items))
    }
}

impl From<ObjectMap> for ValueTree {
    fn from(map: ObjectMap) -> Self {
        ValueTree::Object(Arc::new(map))
    }
}

impl Serialize for ValueTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ValueTree::Null => serializer.serialize_unit(),
            ValueTree::Bool(b) => serializer.serialize_bool(*b),
            ValueTree::Number(n) => n.serialize(serializer),
            ValueTree::String(s) => serializer.serialize_str(s),
            ValueTree::Array(items) => items.as_ref().serialize(serializer),
            ValueTree::Object(map) => map.as_ref().serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ValueTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(ValueTree::from)
    }
}

impl fmt::Display for ValueTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
