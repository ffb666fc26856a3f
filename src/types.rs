//! Core types for conditional schema resolution.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::value::ValueTree;

/// Default number of fixpoint passes before the resolver reports divergence.
pub const DEFAULT_MAX_PASSES: usize = 5;

/// Default nesting depth for resolution and reference chasing.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Default budget of schema nodes one resolution may descend into.
pub const DEFAULT_MAX_NODES: usize = 10_000;

/// Default nesting depth for the field classifier.
pub const DEFAULT_RENDER_DEPTH: usize = 16;

/// `maxLength` above which a string field is rendered multiline.
pub const MULTILINE_MAX_LENGTH: u64 = 100;

/// `format` value that forces a multiline string field.
pub const TEXTAREA_FORMAT: &str = "textarea";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Declared `type` of a schema node.
///
/// `Unknown` covers both a missing `type` and one outside the supported subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    #[default]
    Unknown,
}

impl SchemaKind {
    /// Parse a JSON Schema `type` keyword.
    ///
    /// Unsupported names map to `Unknown` rather than failing.
    pub fn parse(s: &str) -> Self {
        match s {
            "string" => SchemaKind::String,
            "number" => SchemaKind::Number,
            "integer" => SchemaKind::Integer,
            "boolean" => SchemaKind::Boolean,
            "array" => SchemaKind::Array,
            "object" => SchemaKind::Object,
            _ => SchemaKind::Unknown,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, SchemaKind::Unknown)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, SchemaKind::Number | SchemaKind::Integer)
    }
}

/// Immutable schema fragment.
///
/// Resolution never edits a node in place; merges and dereferences build new
/// nodes. `properties` keeps document order so rendering is stable.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SchemaNode {
    #[serde(rename = "type", skip_serializing_if = "SchemaKind::is_unknown")]
    pub kind: SchemaKind,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(rename = "enumLabels", skip_serializing_if = "Option::is_none")]
    pub enum_labels: Option<Vec<String>>,
    /// Required property names, deduplicated, in first-seen order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(rename = "allOf", skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<ConditionalBranch>,
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<bool>,
    /// Registry name from `$ref`, already normalized.
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl SchemaNode {
    /// Create an empty node of the given kind.
    pub fn of_kind(kind: SchemaKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Parse a schema document. See [`crate::parse_schema`].
    pub fn from_json(value: &Value) -> Self {
        crate::loader::parse_schema(value)
    }

    pub fn is_secret(&self) -> bool {
        self.secret.unwrap_or(false)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Normalized registry name of the node's `$ref`, if any.
    pub fn reference_name(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .map(crate::registry::normalize_reference)
    }

    /// Whether the resolver needs to descend into this node.
    pub fn needs_resolution(&self) -> bool {
        self.kind == SchemaKind::Object || !self.all_of.is_empty()
    }
}

/// One `allOf` entry of the form `{ "if": ..., "then": ... }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ConditionalBranch {
    #[serde(rename = "if")]
    pub condition: ConditionFragment,
    pub then: SchemaNode,
}

/// Restricted schema used as an `if` condition.
///
/// An empty fragment matches every data object.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ConditionFragment {
    pub properties: IndexMap<String, Condition>,
}

/// Constraint on a single property inside a condition fragment.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Condition {
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub constant: Option<ValueTree>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<ValueTree>>,
    #[serde(flatten)]
    pub nested: Option<ConditionFragment>,
}

/// Options for schema resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Maximum fixpoint passes per schema node. Always at least 1.
    pub max_passes: usize,
    /// Maximum nesting depth for object recursion and `$ref` chains.
    pub max_depth: usize,
    /// Maximum number of nested nodes resolved in one call.
    pub max_nodes: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pass cap. Values below 1 are raised to 1.
    pub fn max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }
}

/// Options for the field classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Nesting level past which fields degrade to fallback text.
    pub max_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_RENDER_DEPTH,
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
