//! Required-field overrides.
//!
//! Some forms decide requiredness from a discriminator elsewhere in the data
//! using their own condition table, outside the general resolver. The
//! renderer consults a [`RequiredOverride`] for every field in addition to
//! the resolved `required` sets.

use crate::matcher::matches;
use crate::merge::merge;
use crate::registry::SchemaRegistry;
use crate::types::{SchemaKind, SchemaNode, DEFAULT_MAX_DEPTH};
use crate::value::ValueTree;

/// Hook deciding whether the field at `path` is required for `data`.
///
/// `data` is the whole form value, not the field's own value.
pub trait RequiredOverride {
    fn is_required(&self, path: &str, data: &ValueTree) -> bool;
}

impl<F> RequiredOverride for F
where
    F: Fn(&str, &ValueTree) -> bool,
{
    fn is_required(&self, path: &str, data: &ValueTree) -> bool {
        self(path, data)
    }
}

/// Requiredness driven by a separate schema document.
///
/// The document is walked along the field path. At every level the `allOf`
/// branches whose conditions hold for the data at that level are folded in
/// (one pass, no fixpoint), and the field is required when its name appears
/// in its parent's `required`.
#[derive(Debug, Clone)]
pub struct RequirementTable {
    schema: SchemaNode,
    registry: SchemaRegistry,
}

impl RequirementTable {
    pub fn new(schema: SchemaNode) -> Self {
        Self {
            schema,
            registry: SchemaRegistry::new(),
        }
    }

    /// Resolve `$ref` nodes in the table through `registry`.
    pub fn with_registry(mut self, registry: SchemaRegistry) -> Self {
        self.registry = registry;
        self
    }

    fn effective(&self, node: &SchemaNode, scope: &ValueTree) -> SchemaNode {
        let mut node = self.registry.deref(node, DEFAULT_MAX_DEPTH).into_owned();
        let branches = std::mem::take(&mut node.all_of);
        for branch in &branches {
            if matches(&branch.condition, scope) {
                let then = self.registry.deref(&branch.then, DEFAULT_MAX_DEPTH);
                node = merge(&node, &then);
            }
        }
        node
    }
}

impl RequiredOverride for RequirementTable {
    fn is_required(&self, path: &str, data: &ValueTree) -> bool {
        let segments: Vec<&str> = path.split('.').collect();
        let Some((leaf, parents)) = segments.split_last() else {
            return false;
        };

        let empty = ValueTree::empty_object();
        let mut node = self.effective(&self.schema, data);
        let mut scope = data;

        for segment in parents {
            let next = if node.kind == SchemaKind::Array && segment.parse::<usize>().is_ok() {
                node.items.as_deref().cloned()
            } else {
                node.properties.get(*segment).cloned()
            };
            let Some(next) = next else {
                return false;
            };

            scope = match scope {
                ValueTree::Object(map) => map.get(*segment).unwrap_or(&empty),
                ValueTree::Array(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| items.get(i))
                    .unwrap_or(&empty),
                _ => &empty,
            };
            node = self.effective(&next, scope);
        }

        node.is_required(leaf)
    }
}
