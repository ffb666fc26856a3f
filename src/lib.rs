//! Schema Forms
//!
//! Conditional schema resolution and schema-driven form descriptors.
//!
//! A schema document with nested `allOf[{ if, then }]` branches is resolved
//! against partially-filled data into an *effective* schema, which is then
//! mapped onto a tree of field descriptors for a UI layer to render.
//!
//! # Example
//!
//! ```
//! use schema_forms::{build_form, parse_schema, FieldKind, FormContext, SchemaRegistry, ValueTree};
//! use serde_json::json;
//!
//! let schema = parse_schema(&json!({
//!     "type": "object",
//!     "properties": {
//!         "file_type": { "enum": ["CSV", "JSON"] }
//!     },
//!     "allOf": [{
//!         "if": { "properties": { "file_type": { "const": "CSV" } } },
//!         "then": { "properties": { "delimiter": { "type": "string" } } }
//!     }]
//! }));
//!
//! let registry = SchemaRegistry::new();
//! let ctx = FormContext::new(&registry);
//! let data = ValueTree::from(json!({ "file_type": "CSV" }));
//! let form = build_form(&schema, &data, &ctx);
//!
//! // The CSV branch contributed a delimiter field
//! let delimiter = form.field("delimiter").unwrap();
//! assert_eq!(delimiter.kind, FieldKind::Text);
//!
//! // Edits flow back as (path, value) changes
//! let data = delimiter.change(";").apply(&data);
//! assert_eq!(data.get("delimiter"), Some(&ValueTree::from(";")));
//! ```
//!
//! # Resolution
//!
//! | Keyword | Merge rule |
//! |---------|------------|
//! | `properties` | Shallow union, `then` replaces same-named entries |
//! | `required` | Set union |
//! | `allOf` | Appended; nested branches are evaluated in the same pass |
//! | other | Overwritten when present on `then` |
//!
//! Resolution repeats until `properties` and `required` stop changing or the
//! pass cap is hit, then recurses into nested objects using the matching
//! slice of the data. Hitting the cap is reported as a [`Divergence`], never
//! as an error. A `$ref` that recurses into itself only unfolds as deep as
//! the data does.
//!
//! # Field kinds
//!
//! | Rule (first match wins) | Kind |
//! |-------------------------|------|
//! | `enum` present | Choice |
//! | string + `secret` | Masked |
//! | string + `format: textarea` or `maxLength > 100` | Multiline |
//! | string | Text |
//! | number / integer | Numeric |
//! | boolean | Toggle |
//! | array | Repeatable |
//! | object | Composite |
//! | anything else | FallbackText |

mod error;
mod loader;
mod matcher;
mod merge;
pub mod path;
mod registry;
mod render;
mod required;
mod resolver;
mod types;
mod value;

pub use error::LoadError;
pub use loader::{
    load_data, load_errors, load_json, load_json_str, load_schema, load_schema_str,
    parse_condition, parse_schema, ErrorMap,
};
pub use matcher::matches;
pub use merge::merge;
pub use registry::{normalize_reference, SchemaRegistry};
pub use render::{
    build_form, classify_kind, coerce_numeric, render_outline, walk, Change, ChoiceOption,
    Classifier, FieldDescriptor, FieldKind, FieldRenderer, Form, FormContext, OutlineRenderer,
    RevealToggles,
};
pub use required::{RequiredOverride, RequirementTable};
pub use resolver::{
    resolve, resolve_with_observer, Divergence, Resolution, ResolveEvent, ResolveObserver,
    TracingObserver,
};
pub use types::{
    json_type_name, Condition, ConditionFragment, ConditionalBranch, RenderOptions,
    ResolveOptions, SchemaKind, SchemaNode, DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES,
    DEFAULT_MAX_PASSES, DEFAULT_RENDER_DEPTH,
};
pub use value::{ObjectMap, ValueTree};
