//! Field classification - maps a resolved schema and its value onto a tree
//! of field descriptors that a UI layer turns into controls.
//!
//! Classification is pure. Edits come back as [`Change`]s, which the host
//! applies to its value tree with [`crate::path::set`] before resolving and
//! classifying again.

use std::collections::HashSet;

use serde::Serialize;

use crate::loader::ErrorMap;
use crate::path;
use crate::registry::SchemaRegistry;
use crate::required::RequiredOverride;
use crate::resolver::{resolve, Divergence};
use crate::types::{
    RenderOptions, ResolveOptions, SchemaKind, SchemaNode, MULTILINE_MAX_LENGTH, TEXTAREA_FORMAT,
};
use crate::value::ValueTree;

/// Step for `integer` fields.
const INTEGER_STEP: f64 = 1.0;

/// Step for `number` fields.
const NUMBER_STEP: f64 = 0.01;

/// Character shown in place of each character of a masked value.
const MASK_CHAR: char = '•';

/// Closed set of control kinds, in classification order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Pick one of the schema's `enum` values.
    Choice { options: Vec<ChoiceOption> },
    /// Secret string with a presentation-only reveal toggle.
    Masked,
    Multiline,
    Text,
    Numeric {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        step: f64,
        integer: bool,
    },
    Toggle,
    /// Array with add/remove; object items render as nested sub-forms.
    Repeatable { object_items: bool },
    Composite,
    FallbackText,
}

impl FieldKind {
    /// Whether the field renders through its children.
    pub fn is_container(&self) -> bool {
        matches!(self, FieldKind::Repeatable { .. } | FieldKind::Composite)
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Choice { .. } => "choice",
            FieldKind::Masked => "masked",
            FieldKind::Multiline => "multiline",
            FieldKind::Text => "text",
            FieldKind::Numeric { .. } => "numeric",
            FieldKind::Toggle => "toggle",
            FieldKind::Repeatable { .. } => "repeatable",
            FieldKind::Composite => "composite",
            FieldKind::FallbackText => "fallback_text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
}

/// One rendered control and, for containers, its children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    /// Property name, or the index for array items.
    pub name: String,
    /// `title` when the schema has one, otherwise the name.
    pub label: String,
    pub path: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(skip)]
    pub schema: SchemaNode,
    /// Current value, coerced to the shape the kind expects.
    pub value: ValueTree,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub level: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FieldDescriptor>,
}

/// A `(path, value)` update for the host to apply.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub path: String,
    pub value: ValueTree,
}

impl Change {
    /// Apply the change to `tree`, returning the new root.
    pub fn apply(&self, tree: &ValueTree) -> ValueTree {
        path::set(tree, &self.path, self.value.clone())
    }
}

impl FieldDescriptor {
    /// Convert raw control input into a stored value.
    ///
    /// Numeric input that does not parse becomes `0`, never NaN.
    pub fn coerce_input(&self, raw: &str) -> ValueTree {
        match &self.kind {
            FieldKind::Numeric { integer, .. } => coerce_numeric(raw, *integer),
            FieldKind::Toggle => ValueTree::Bool(parse_toggle(raw)),
            FieldKind::Repeatable { .. } | FieldKind::Composite => {
                let parsed = serde_json::from_str::<serde_json::Value>(raw)
                    .ok()
                    .map(ValueTree::from);
                coerce_value(&self.kind, parsed.as_ref())
            }
            FieldKind::Choice { .. }
            | FieldKind::Masked
            | FieldKind::Multiline
            | FieldKind::Text
            | FieldKind::FallbackText => ValueTree::String(raw.to_string()),
        }
    }

    /// Change for raw control input.
    pub fn change(&self, raw: &str) -> Change {
        Change {
            path: self.path.clone(),
            value: self.coerce_input(raw),
        }
    }

    /// Change storing `value`, coerced to this field's kind.
    pub fn change_value(&self, value: ValueTree) -> Change {
        Change {
            path: self.path.clone(),
            value: coerce_value(&self.kind, Some(&value)),
        }
    }

    /// Append an empty item: `{}` for object items, `""` otherwise.
    ///
    /// Returns `None` unless the field is repeatable.
    pub fn append_item(&self) -> Option<Change> {
        let FieldKind::Repeatable { object_items } = self.kind else {
            return None;
        };
        let item = if object_items {
            ValueTree::empty_object()
        } else {
            ValueTree::from("")
        };
        Some(Change {
            path: self.path.clone(),
            value: path::push(&self.value, "", item),
        })
    }

    /// Remove the item at `index`; later items shift down.
    ///
    /// Returns `None` unless the field is repeatable.
    pub fn remove_item(&self, index: usize) -> Option<Change> {
        if !matches!(self.kind, FieldKind::Repeatable { .. }) {
            return None;
        }
        Some(Change {
            path: self.path.clone(),
            value: path::remove_index(&self.value, "", index),
        })
    }

    /// Find a descriptor by path in this subtree.
    pub fn find(&self, path: &str) -> Option<&FieldDescriptor> {
        if self.path == path {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(path))
    }
}

/// Everything classification needs besides the schema and data.
#[derive(Clone, Copy)]
pub struct FormContext<'a> {
    pub registry: &'a SchemaRegistry,
    pub errors: Option<&'a ErrorMap>,
    pub required_override: Option<&'a dyn RequiredOverride>,
    pub resolve: ResolveOptions,
    pub render: RenderOptions,
}

impl<'a> FormContext<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self {
            registry,
            errors: None,
            required_override: None,
            resolve: ResolveOptions::default(),
            render: RenderOptions::default(),
        }
    }

    pub fn with_errors(mut self, errors: &'a ErrorMap) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_required_override(mut self, hook: &'a dyn RequiredOverride) -> Self {
        self.required_override = Some(hook);
        self
    }

    pub fn with_resolve_options(mut self, options: ResolveOptions) -> Self {
        self.resolve = options;
        self
    }

    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }
}

/// A classified form.
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    /// The resolved root schema.
    pub schema: SchemaNode,
    /// One descriptor per top-level property, at level 0.
    pub fields: Vec<FieldDescriptor>,
    /// Divergences from the root and from per-item resolution.
    pub divergences: Vec<Divergence>,
}

impl Form {
    pub fn is_converged(&self) -> bool {
        self.divergences.is_empty()
    }

    pub fn field(&self, path: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find_map(|field| field.find(path))
    }
}

/// Resolve `schema` against `data` and classify every top-level property.
pub fn build_form(schema: &SchemaNode, data: &ValueTree, ctx: &FormContext<'_>) -> Form {
    let resolution = resolve(schema, data, ctx.registry, &ctx.resolve);
    let root = resolution.schema;

    let mut classifier = Classifier::new(ctx, data);
    classifier.divergences = resolution.divergences;
    classifier.active.extend(schema.reference_name().map(str::to_string));

    let mut fields = Vec::with_capacity(root.properties.len());
    for (key, node) in &root.properties {
        fields.push(classifier.classify(key, node, data.get(key), key, 0, &root.required));
    }

    Form {
        schema: root,
        fields,
        divergences: classifier.divergences,
    }
}

/// Recursive schema-to-descriptor walk.
pub struct Classifier<'a> {
    ctx: &'a FormContext<'a>,
    root: &'a ValueTree,
    divergences: Vec<Divergence>,
    /// `$ref` names on the current ancestor chain.
    active: Vec<String>,
}

impl<'a> Classifier<'a> {
    /// `root` is the whole form value, handed to the required-override hook.
    pub fn new(ctx: &'a FormContext<'a>, root: &'a ValueTree) -> Self {
        Self {
            ctx,
            root,
            divergences: Vec::new(),
            active: Vec::new(),
        }
    }

    /// Divergences collected while resolving array items.
    pub fn divergences(&self) -> &[Divergence] {
        &self.divergences
    }

    /// Classify one field.
    ///
    /// `parent_required` is the resolved `required` set of the enclosing
    /// object. Past the render depth cap every node degrades to fallback text,
    /// as does a recursive `$ref` with no container value to show.
    pub fn classify(
        &mut self,
        name: &str,
        node: &SchemaNode,
        value: Option<&ValueTree>,
        path: &str,
        level: usize,
        parent_required: &[String],
    ) -> FieldDescriptor {
        self.build(name, node, value, path, level, parent_required, false)
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        &mut self,
        name: &str,
        node: &SchemaNode,
        value: Option<&ValueTree>,
        path: &str,
        level: usize,
        parent_required: &[String],
        single_line: bool,
    ) -> FieldDescriptor {
        let depth = self.ctx.resolve.max_depth;
        let reference = node.reference_name().map(str::to_string);
        let recursive = reference
            .as_ref()
            .is_some_and(|name| self.active.contains(name))
            && !value.is_some_and(|v| v.is_object() || v.as_array().is_some());
        let mut node = self.ctx.registry.deref(node, depth).into_owned();
        if let Some(items) = node.items.take() {
            node.items = Some(Box::new(self.ctx.registry.deref(&items, depth).into_owned()));
        }

        let mut kind = if recursive || level > self.ctx.render.max_depth {
            FieldKind::FallbackText
        } else {
            classify_kind(&node)
        };
        if single_line {
            kind = match kind {
                FieldKind::Multiline => FieldKind::Text,
                FieldKind::Repeatable { .. } | FieldKind::Composite => FieldKind::FallbackText,
                other => other,
            };
        }

        let required = parent_required.iter().any(|r| r == name)
            || node.min_length.is_some_and(|n| n > 0)
            || self
                .ctx
                .required_override
                .is_some_and(|hook| hook.is_required(path, self.root));
        let error = self.ctx.errors.and_then(|errors| errors.get(path)).cloned();
        let value = coerce_value(&kind, value);

        let pushed = reference.is_some();
        if let Some(name) = reference {
            self.active.push(name);
        }
        let children = match kind {
            FieldKind::Composite => self.object_children(&node, &value, path, level),
            FieldKind::Repeatable { object_items } => {
                self.item_children(&node, &value, path, level, object_items)
            }
            _ => Vec::new(),
        };
        if pushed {
            self.active.pop();
        }

        FieldDescriptor {
            name: name.to_string(),
            label: node.title.clone().unwrap_or_else(|| name.to_string()),
            path: path.to_string(),
            kind,
            schema: node,
            value,
            required,
            error,
            level,
            children,
        }
    }

    fn object_children(
        &mut self,
        node: &SchemaNode,
        value: &ValueTree,
        path: &str,
        level: usize,
    ) -> Vec<FieldDescriptor> {
        let mut children = Vec::with_capacity(node.properties.len());
        for (key, child) in &node.properties {
            let child_path = path::join(path, key);
            children.push(self.classify(
                key,
                child,
                value.get(key),
                &child_path,
                level + 1,
                &node.required,
            ));
        }
        children
    }

    /// Object items are resolved against their own element before they are
    /// classified, so item-level conditions follow each element's data.
    fn item_children(
        &mut self,
        node: &SchemaNode,
        value: &ValueTree,
        path: &str,
        level: usize,
        object_items: bool,
    ) -> Vec<FieldDescriptor> {
        let item_schema = node.items.as_deref().cloned().unwrap_or_default();
        let elements = value.as_array().unwrap_or_default();

        let mut children = Vec::with_capacity(elements.len());
        for (index, element) in elements.iter().enumerate() {
            let name = index.to_string();
            let child_path = path::join(path, &name);

            if !object_items {
                children.push(self.build(
                    &name,
                    &item_schema,
                    Some(element),
                    &child_path,
                    level + 1,
                    &[],
                    true,
                ));
                continue;
            }

            let element_data = if element.is_object() {
                element.clone()
            } else {
                ValueTree::empty_object()
            };
            let resolution = resolve(
                &item_schema,
                &element_data,
                self.ctx.registry,
                &self.ctx.resolve,
            );
            for divergence in resolution.divergences {
                let path = if divergence.path.is_empty() {
                    child_path.clone()
                } else {
                    path::join(&child_path, &divergence.path)
                };
                self.divergences.push(Divergence {
                    path,
                    passes: divergence.passes,
                });
            }
            children.push(self.classify(
                &name,
                &resolution.schema,
                Some(element),
                &child_path,
                level + 1,
                &[],
            ));
        }
        children
    }
}

/// Pick the control kind for a node. First matching rule wins.
pub fn classify_kind(node: &SchemaNode) -> FieldKind {
    if let Some(values) = &node.enum_values {
        let labels = node.enum_labels.as_deref().unwrap_or_default();
        let options = values
            .iter()
            .enumerate()
            .map(|(i, value)| ChoiceOption {
                value: value.clone(),
                label: labels.get(i).cloned().unwrap_or_else(|| value.clone()),
            })
            .collect();
        return FieldKind::Choice { options };
    }

    match node.kind {
        SchemaKind::String if node.is_secret() => FieldKind::Masked,
        SchemaKind::String
            if node.format.as_deref() == Some(TEXTAREA_FORMAT)
                || node.max_length.is_some_and(|n| n > MULTILINE_MAX_LENGTH) =>
        {
            FieldKind::Multiline
        }
        SchemaKind::String => FieldKind::Text,
        SchemaKind::Number | SchemaKind::Integer => {
            let integer = node.kind == SchemaKind::Integer;
            FieldKind::Numeric {
                min: node.minimum,
                max: node.maximum,
                step: if integer { INTEGER_STEP } else { NUMBER_STEP },
                integer,
            }
        }
        SchemaKind::Boolean => FieldKind::Toggle,
        SchemaKind::Array => FieldKind::Repeatable {
            object_items: node
                .items
                .as_ref()
                .is_some_and(|items| items.kind == SchemaKind::Object),
        },
        SchemaKind::Object => FieldKind::Composite,
        SchemaKind::Unknown => FieldKind::FallbackText,
    }
}

/// Parse numeric input from its leading numeric prefix, so `"12abc"` is `12`.
///
/// No prefix, overflow and non-finite results all become `0`. Integer fields
/// stop at the decimal point.
pub fn coerce_numeric(raw: &str, integer: bool) -> ValueTree {
    let prefix = numeric_prefix(raw.trim(), integer);
    if integer {
        return ValueTree::from(prefix.parse::<i64>().unwrap_or(0));
    }
    match prefix.parse::<f64>() {
        Ok(f) => ValueTree::from_f64(f),
        Err(_) => ValueTree::from(0_i64),
    }
}

/// Longest leading `[+-]digits[.digits][e[+-]digits]`; empty without digits.
fn numeric_prefix(raw: &str, integer: bool) -> &str {
    let bytes = raw.as_bytes();
    let digits_from = |mut at: usize| {
        while bytes.get(at).is_some_and(u8::is_ascii_digit) {
            at += 1;
        }
        at
    };

    let start = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let mut end = digits_from(start);
    let mut has_digits = end > start;

    if !integer {
        if bytes.get(end) == Some(&b'.') {
            let fraction_end = digits_from(end + 1);
            if has_digits || fraction_end > end + 1 {
                has_digits = true;
                end = fraction_end;
            }
        }
        if has_digits && matches!(bytes.get(end), Some(b'e' | b'E')) {
            let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
            let exponent_end = digits_from(end + 1 + sign);
            if exponent_end > end + 1 + sign {
                end = exponent_end;
            }
        }
    }

    if has_digits {
        &raw[..end]
    } else {
        ""
    }
}

fn parse_toggle(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "on" | "yes"
    )
}

/// Coerce a stored value to the shape `kind` expects.
fn coerce_value(kind: &FieldKind, value: Option<&ValueTree>) -> ValueTree {
    let value = value.cloned().unwrap_or_default();
    match kind {
        FieldKind::Repeatable { .. } => match value {
            ValueTree::Array(_) => value,
            _ => ValueTree::empty_array(),
        },
        FieldKind::Composite => match value {
            ValueTree::Object(_) => value,
            _ => ValueTree::empty_object(),
        },
        FieldKind::Toggle => match value {
            ValueTree::Bool(_) => value,
            _ => ValueTree::Bool(false),
        },
        FieldKind::Numeric { integer, .. } => match value {
            ValueTree::Number(_) | ValueTree::Null => value,
            ValueTree::String(s) => coerce_numeric(&s, *integer),
            _ => ValueTree::from(0_i64),
        },
        FieldKind::Choice { .. } => match value {
            ValueTree::Array(_) | ValueTree::Object(_) => ValueTree::Null,
            scalar => scalar,
        },
        FieldKind::Masked | FieldKind::Multiline | FieldKind::Text | FieldKind::FallbackText => {
            match value {
                ValueTree::Null | ValueTree::String(_) => value,
                ValueTree::Bool(_) | ValueTree::Number(_) => {
                    ValueTree::String(value.display_text())
                }
                ValueTree::Array(_) | ValueTree::Object(_) => ValueTree::Null,
            }
        }
    }
}

/// Presentation-only reveal flags for masked fields, keyed by path.
///
/// Toggling never touches the form value.
#[derive(Debug, Clone, Default)]
pub struct RevealToggles {
    revealed: HashSet<String>,
}

impl RevealToggles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the flag for `path`, returning the new state.
    pub fn toggle(&mut self, path: &str) -> bool {
        if self.revealed.remove(path) {
            false
        } else {
            self.revealed.insert(path.to_string());
            true
        }
    }

    pub fn is_revealed(&self, path: &str) -> bool {
        self.revealed.contains(path)
    }

    /// Text to show for `field`: masked characters unless revealed.
    pub fn display(&self, field: &FieldDescriptor) -> String {
        let text = field.value.display_text();
        if field.kind == FieldKind::Masked && !self.is_revealed(&field.path) {
            std::iter::repeat(MASK_CHAR)
                .take(text.chars().count())
                .collect()
        } else {
            text
        }
    }
}

/// Strategy for turning descriptors into output.
///
/// [`walk`] drives the recursion: leaves go to `leaf`, containers to
/// `composite` after their children are rendered.
pub trait FieldRenderer {
    type Output;

    fn leaf(&mut self, field: &FieldDescriptor) -> Self::Output;

    fn composite(&mut self, field: &FieldDescriptor, children: Vec<Self::Output>)
        -> Self::Output;
}

pub fn walk<R: FieldRenderer + ?Sized>(field: &FieldDescriptor, renderer: &mut R) -> R::Output {
    if !field.kind.is_container() {
        return renderer.leaf(field);
    }
    let mut children = Vec::with_capacity(field.children.len());
    for child in &field.children {
        children.push(walk(child, renderer));
    }
    renderer.composite(field, children)
}

/// Indented plain-text outline, one line per field.
#[derive(Debug, Clone, Default)]
pub struct OutlineRenderer {
    pub toggles: RevealToggles,
}

impl OutlineRenderer {
    pub fn new(toggles: RevealToggles) -> Self {
        Self { toggles }
    }

    fn header(field: &FieldDescriptor) -> String {
        format!(
            "{}- {}{} [{}]",
            "  ".repeat(field.level),
            field.label,
            if field.required { "*" } else { "" },
            field.kind.name()
        )
    }
}

impl FieldRenderer for OutlineRenderer {
    type Output = String;

    fn leaf(&mut self, field: &FieldDescriptor) -> String {
        let mut line = format!("{} = {}", Self::header(field), self.toggles.display(field));
        if let Some(error) = &field.error {
            line.push_str(&format!("  ! {}", error));
        }
        line
    }

    fn composite(&mut self, field: &FieldDescriptor, children: Vec<String>) -> String {
        let mut lines = vec![Self::header(field)];
        if let Some(error) = &field.error {
            lines[0].push_str(&format!("  ! {}", error));
        }
        lines.extend(children);
        lines.join("\n")
    }
}

/// Render a whole form as an outline.
pub fn render_outline(form: &Form, toggles: &RevealToggles) -> String {
    let mut renderer = OutlineRenderer::new(toggles.clone());
    form.fields
        .iter()
        .map(|field| walk(field, &mut renderer))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_schema;
    use serde_json::json;

    fn kind_of(schema: serde_json::Value) -> FieldKind {
        classify_kind(&parse_schema(&schema))
    }

    #[test]
    fn enum_wins_over_type() {
        let kind = kind_of(json!({
            "type": "string",
            "secret": true,
            "enum": ["CSV", "JSON"],
            "enumLabels": ["Comma separated"]
        }));
        assert_eq!(
            kind,
            FieldKind::Choice {
                options: vec![
                    ChoiceOption {
                        value: "CSV".into(),
                        label: "Comma separated".into()
                    },
                    ChoiceOption {
                        value: "JSON".into(),
                        label: "JSON".into()
                    },
                ]
            }
        );
    }

    #[test]
    fn string_kinds() {
        assert_eq!(kind_of(json!({ "type": "string", "secret": true })), FieldKind::Masked);
        assert_eq!(
            kind_of(json!({ "type": "string", "format": "textarea" })),
            FieldKind::Multiline
        );
        assert_eq!(
            kind_of(json!({ "type": "string", "maxLength": 101 })),
            FieldKind::Multiline
        );
        assert_eq!(kind_of(json!({ "type": "string", "maxLength": 100 })), FieldKind::Text);
        assert_eq!(kind_of(json!({ "type": "string" })), FieldKind::Text);
    }

    #[test]
    fn numeric_steps() {
        assert_eq!(
            kind_of(json!({ "type": "integer", "minimum": 1, "maximum": 10 })),
            FieldKind::Numeric {
                min: Some(1.0),
                max: Some(10.0),
                step: 1.0,
                integer: true
            }
        );
        assert_eq!(
            kind_of(json!({ "type": "number" })),
            FieldKind::Numeric {
                min: None,
                max: None,
                step: 0.01,
                integer: false
            }
        );
    }

    #[test]
    fn container_and_fallback_kinds() {
        assert_eq!(kind_of(json!({ "type": "boolean" })), FieldKind::Toggle);
        assert_eq!(
            kind_of(json!({ "type": "array", "items": { "type": "object" } })),
            FieldKind::Repeatable { object_items: true }
        );
        assert_eq!(
            kind_of(json!({ "type": "array" })),
            FieldKind::Repeatable {
                object_items: false
            }
        );
        assert_eq!(kind_of(json!({ "type": "object" })), FieldKind::Composite);
        assert_eq!(kind_of(json!({})), FieldKind::FallbackText);
        assert_eq!(kind_of(json!("garbage")), FieldKind::FallbackText);
    }

    #[test]
    fn coerce_numeric_never_nan() {
        assert_eq!(coerce_numeric("abc", true), ValueTree::from(0_i64));
        assert_eq!(coerce_numeric("abc", false), ValueTree::from(0_i64));
        assert_eq!(coerce_numeric("NaN", false), ValueTree::from(0_i64));
        assert_eq!(coerce_numeric(" 42 ", true), ValueTree::from(42_i64));
        assert_eq!(coerce_numeric("4.9", true), ValueTree::from(4_i64));
        assert_eq!(coerce_numeric("0.25", false).as_f64(), Some(0.25));
    }

    #[test]
    fn coerce_numeric_reads_leading_prefix() {
        assert_eq!(coerce_numeric("12abc", true), ValueTree::from(12_i64));
        assert_eq!(coerce_numeric("-7 items", true), ValueTree::from(-7_i64));
        assert_eq!(coerce_numeric("1e3", true), ValueTree::from(1_i64));
        assert_eq!(coerce_numeric("3.5kg", false).as_f64(), Some(3.5));
        assert_eq!(coerce_numeric(".5", false).as_f64(), Some(0.5));
        assert_eq!(coerce_numeric("1e3x", false).as_f64(), Some(1000.0));
        assert_eq!(coerce_numeric("2e", false).as_f64(), Some(2.0));
        assert_eq!(coerce_numeric("1e999", false), ValueTree::from(0_i64));
        assert_eq!(coerce_numeric("-", false), ValueTree::from(0_i64));
        assert_eq!(coerce_numeric("99999999999999999999", true), ValueTree::from(0_i64));
    }

    #[test]
    fn wrong_shapes_coerce_to_defaults() {
        assert_eq!(
            coerce_value(
                &FieldKind::Repeatable { object_items: true },
                Some(&ValueTree::from("x"))
            ),
            ValueTree::empty_array()
        );
        assert_eq!(
            coerce_value(&FieldKind::Composite, Some(&ValueTree::from(3_i64))),
            ValueTree::empty_object()
        );
        assert_eq!(coerce_value(&FieldKind::Toggle, None), ValueTree::Bool(false));
        assert_eq!(
            coerce_value(&FieldKind::Text, Some(&ValueTree::from(7_i64))),
            ValueTree::from("7")
        );
    }

    #[test]
    fn reveal_toggle_is_presentation_only() {
        let mut toggles = RevealToggles::new();
        assert!(toggles.toggle("password"));
        assert!(toggles.is_revealed("password"));
        assert!(!toggles.toggle("password"));
        assert!(!toggles.is_revealed("password"));
    }
}
