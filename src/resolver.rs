//! Schema resolution - folds matching conditional branches into an
//! effective schema for the current data.

use crate::matcher::matches;
use crate::merge::merge;
use crate::path;
use crate::registry::SchemaRegistry;
use crate::types::{ResolveOptions, SchemaNode};
use crate::value::ValueTree;

/// Event emitted while resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveEvent<'a> {
    /// The `allOf` entry at `index` matched and was merged at `path`.
    BranchApplied { path: &'a str, index: usize },
    /// The node at `path` did not stabilize within `passes` passes.
    Diverged { path: &'a str, passes: usize },
    /// Recursion stopped at `path` because the depth cap was reached.
    DepthLimited { path: &'a str },
    /// `reference` is already being resolved higher up and the data has no
    /// object at `path`, so the reference was left in place.
    CycleSkipped { path: &'a str, reference: &'a str },
    /// The node budget ran out before `path` could be resolved.
    NodeLimited { path: &'a str },
}

/// Subscriber for resolution diagnostics.
pub trait ResolveObserver {
    fn observe(&self, event: &ResolveEvent<'_>);
}

impl<F> ResolveObserver for F
where
    F: Fn(&ResolveEvent<'_>),
{
    fn observe(&self, event: &ResolveEvent<'_>) {
        self(event)
    }
}

/// Default observer: forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ResolveObserver for TracingObserver {
    fn observe(&self, event: &ResolveEvent<'_>) {
        match *event {
            ResolveEvent::BranchApplied { path, index } => {
                tracing::debug!(path, index, "applied conditional branch");
            }
            ResolveEvent::Diverged { path, passes } => {
                tracing::warn!(path, passes, "schema resolution did not converge");
            }
            ResolveEvent::DepthLimited { path } => {
                tracing::warn!(path, "schema resolution depth limit reached");
            }
            ResolveEvent::CycleSkipped { path, reference } => {
                tracing::debug!(path, reference, "recursive reference left unresolved");
            }
            ResolveEvent::NodeLimited { path } => {
                tracing::warn!(path, "schema resolution node budget exhausted");
            }
        }
    }
}

/// A node that hit the pass cap without stabilizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
    /// Dot path of the schema node; empty for the root.
    pub path: String,
    pub passes: usize,
}

/// Result of [`resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The effective schema. Best effort when divergences are present.
    pub schema: SchemaNode,
    /// Passes spent on the root node.
    pub passes: usize,
    pub divergences: Vec<Divergence>,
}

impl Resolution {
    pub fn is_converged(&self) -> bool {
        self.divergences.is_empty()
    }
}

/// Resolve `schema` against `data`, logging diagnostics through `tracing`.
///
/// Branch conditions at each object level are matched against the data at
/// that level. The result is a pure function of the inputs.
pub fn resolve(
    schema: &SchemaNode,
    data: &ValueTree,
    registry: &SchemaRegistry,
    options: &ResolveOptions,
) -> Resolution {
    resolve_with_observer(schema, data, registry, options, &TracingObserver)
}

/// Resolve with a caller-supplied observer.
pub fn resolve_with_observer(
    schema: &SchemaNode,
    data: &ValueTree,
    registry: &SchemaRegistry,
    options: &ResolveOptions,
    observer: &dyn ResolveObserver,
) -> Resolution {
    let mut run = Run {
        registry,
        options,
        observer,
        divergences: Vec::new(),
        active: schema.reference_name().map(str::to_string).into_iter().collect(),
        nodes: 1,
    };
    let (schema, passes) = run.resolve_node(schema, data, "", 0);

    Resolution {
        schema,
        passes,
        divergences: run.divergences,
    }
}

struct Run<'a> {
    registry: &'a SchemaRegistry,
    options: &'a ResolveOptions,
    observer: &'a dyn ResolveObserver,
    divergences: Vec<Divergence>,
    /// `$ref` names being resolved on the current ancestor chain.
    active: Vec<String>,
    /// Nodes entered so far, checked against `max_nodes`.
    nodes: usize,
}

impl Run<'_> {
    fn resolve_node(
        &mut self,
        schema: &SchemaNode,
        data: &ValueTree,
        path: &str,
        depth: usize,
    ) -> (SchemaNode, usize) {
        let mut state = self
            .registry
            .deref(schema, self.options.max_depth)
            .into_owned();

        let max_passes = self.options.max_passes.max(1);
        let mut passes = 0;
        let mut converged = false;
        while passes < max_passes {
            passes += 1;
            let properties_before = state.properties.clone();
            let required_before = state.required.clone();

            self.apply_pass(&mut state, data, path);

            if state.properties == properties_before && state.required == required_before {
                converged = true;
                break;
            }
        }

        if !converged {
            self.observer
                .observe(&ResolveEvent::Diverged { path, passes });
            self.divergences.push(Divergence {
                path: path.to_string(),
                passes,
            });
        }

        if depth >= self.options.max_depth {
            self.observer.observe(&ResolveEvent::DepthLimited { path });
            return (state, passes);
        }

        let empty = ValueTree::empty_object();
        for (key, prop) in state.properties.iter_mut() {
            let reference = prop.reference_name().map(str::to_string);
            let child = self
                .registry
                .deref(prop, self.options.max_depth)
                .into_owned();
            if !child.needs_resolution() {
                *prop = child;
                continue;
            }

            let child_path = path::join(path, key);
            let child_data = match data.get(key) {
                Some(value @ ValueTree::Object(_)) => Some(value),
                _ => None,
            };

            // A recursive reference only unfolds as far as the data goes
            if let Some(name) = &reference {
                if child_data.is_none() && self.active.contains(name) {
                    self.observer.observe(&ResolveEvent::CycleSkipped {
                        path: &child_path,
                        reference: name,
                    });
                    continue;
                }
            }
            if self.nodes >= self.options.max_nodes {
                self.observer
                    .observe(&ResolveEvent::NodeLimited { path: &child_path });
                continue;
            }
            self.nodes += 1;

            let pushed = reference.is_some();
            if let Some(name) = reference {
                self.active.push(name);
            }
            let child_data = child_data.unwrap_or(&empty);
            let (resolved, _) = self.resolve_node(&child, child_data, &child_path, depth + 1);
            if pushed {
                self.active.pop();
            }
            *prop = resolved;
        }

        (state, passes)
    }

    /// Apply every matching branch once, in document order.
    ///
    /// Merges land immediately, so branches appended by an earlier merge are
    /// evaluated later in the same pass.
    fn apply_pass(&mut self, state: &mut SchemaNode, data: &ValueTree, path: &str) {
        let mut index = 0;
        while let Some(branch) = state.all_of.get(index) {
            if matches(&branch.condition, data) {
                let then = self
                    .registry
                    .deref(&branch.then, self.options.max_depth)
                    .into_owned();
                *state = merge(state, &then);
                self.observer
                    .observe(&ResolveEvent::BranchApplied { path, index });
            }
            index += 1;
        }
    }
}
