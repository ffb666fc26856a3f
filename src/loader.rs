//! Schema and data loading.
//!
//! Reads JSON documents from files or strings and parses them into the
//! schema model. Parsing is lenient: anything outside the supported subset
//! degrades to an `Unknown` node instead of failing.

use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::LoadError;
use crate::registry::normalize_reference;
use crate::types::{
    json_type_name, Condition, ConditionFragment, ConditionalBranch, SchemaKind, SchemaNode,
};
use crate::value::ValueTree;

/// Host-supplied error messages keyed by field path.
pub type ErrorMap = HashMap<String, String>;

/// Load a JSON document from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::InvalidJson` if the file isn't valid JSON.
pub fn load_json(path: &Path) -> Result<Value, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_json_str(&content)
}

/// Load a JSON document from a string.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` if the string isn't valid JSON.
pub fn load_json_str(content: &str) -> Result<Value, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
}

/// Load and parse a schema document from a file.
///
/// # Errors
///
/// Fails on IO or JSON errors, or when the root is not an object.
pub fn load_schema(path: &Path) -> Result<SchemaNode, LoadError> {
    let doc = load_json(path)?;
    schema_from_document(&doc)
}

/// Parse a schema document from a JSON string.
///
/// # Errors
///
/// Fails on invalid JSON or when the root is not an object.
pub fn load_schema_str(content: &str) -> Result<SchemaNode, LoadError> {
    let doc = load_json_str(content)?;
    schema_from_document(&doc)
}

/// Load a value tree from a file.
///
/// # Errors
///
/// Fails on IO or JSON errors.
pub fn load_data(path: &Path) -> Result<ValueTree, LoadError> {
    load_json(path).map(ValueTree::from)
}

/// Load a `{ path: message }` error map from a file.
///
/// Non-string messages are rendered as their JSON text.
///
/// # Errors
///
/// Fails on IO or JSON errors, or when the root is not an object.
pub fn load_errors(path: &Path) -> Result<ErrorMap, LoadError> {
    let doc = load_json(path)?;
    let Value::Object(map) = doc else {
        return Err(LoadError::InvalidSchema {
            message: format!("error map must be an object, got {}", json_type_name(&doc)),
        });
    };

    Ok(map
        .into_iter()
        .map(|(path, message)| {
            let message = match message {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (path, message)
        })
        .collect())
}

fn schema_from_document(doc: &Value) -> Result<SchemaNode, LoadError> {
    if !doc.is_object() {
        return Err(LoadError::InvalidSchema {
            message: format!("schema root must be an object, got {}", json_type_name(doc)),
        });
    }
    Ok(parse_schema(doc))
}

/// Parse a schema fragment.
///
/// Non-object input yields an empty `Unknown` node.
pub fn parse_schema(value: &Value) -> SchemaNode {
    let Some(map) = value.as_object() else {
        return SchemaNode::default();
    };

    SchemaNode {
        kind: map
            .get("type")
            .and_then(Value::as_str)
            .map(SchemaKind::parse)
            .unwrap_or_default(),
        properties: map
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .map(|(k, v)| (k.clone(), parse_schema(v)))
                    .collect()
            })
            .unwrap_or_default(),
        items: map
            .get("items")
            .filter(|v| v.is_object())
            .map(|v| Box::new(parse_schema(v))),
        enum_values: map.get("enum").and_then(Value::as_array).map(|arr| {
            arr.iter().filter_map(scalar_text).collect()
        }),
        enum_labels: map.get("enumLabels").and_then(Value::as_array).map(|arr| {
            arr.iter().filter_map(scalar_text).collect()
        }),
        required: parse_required(map),
        all_of: map
            .get("allOf")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(parse_branch).collect())
            .unwrap_or_default(),
        min_length: map.get("minLength").and_then(Value::as_u64),
        max_length: map.get("maxLength").and_then(Value::as_u64),
        minimum: map.get("minimum").and_then(Value::as_f64),
        maximum: map.get("maximum").and_then(Value::as_f64),
        format: string_attr(map, "format"),
        title: string_attr(map, "title"),
        description: string_attr(map, "description"),
        secret: map.get("secret").and_then(Value::as_bool),
        reference: map
            .get("$ref")
            .and_then(Value::as_str)
            .map(|r| normalize_reference(r).to_string()),
    }
}

/// Parse an `if` fragment.
///
/// Leaves keep `const`/`enum` constraints and nested `properties`; every
/// other keyword is ignored.
pub fn parse_condition(value: &Value) -> ConditionFragment {
    let properties = value
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(k, v)| (k.clone(), parse_condition_leaf(v)))
                .collect()
        })
        .unwrap_or_default();

    ConditionFragment { properties }
}

fn parse_condition_leaf(value: &Value) -> Condition {
    Condition {
        constant: value.get("const").map(ValueTree::from),
        enum_values: value
            .get("enum")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().map(ValueTree::from).collect()),
        nested: value
            .get("properties")
            .filter(|v| v.is_object())
            .map(|_| parse_condition(value)),
    }
}

/// Branches missing `if` or `then` are skipped.
fn parse_branch(value: &Value) -> Option<ConditionalBranch> {
    let condition = value.get("if").filter(|v| v.is_object())?;
    let then = value.get("then").filter(|v| v.is_object())?;
    Some(ConditionalBranch {
        condition: parse_condition(condition),
        then: parse_schema(then),
    })
}

fn parse_required(map: &Map<String, Value>) -> Vec<String> {
    let mut required: Vec<String> = Vec::new();
    if let Some(arr) = map.get("required").and_then(Value::as_array) {
        for name in arr.iter().filter_map(Value::as_str) {
            if !required.iter().any(|r| r == name) {
                required.push(name.to_string());
            }
        }
    }
    required
}

fn string_attr(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(String::from)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
