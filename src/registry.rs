//! Named schema fragments shared between parent schemas.
//!
//! A registry is built once at startup and handed to the resolver and the
//! renderer. Nodes point into it with `$ref`, using a flat name lookup.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::LoadError;
use crate::loader::{load_json, parse_schema};
use crate::merge::merge;
use crate::types::SchemaNode;

/// Read-only mapping from reference name to schema fragment.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, SchemaNode>,
}

/// Normalize a `$ref` value to a registry name.
///
/// `#/$defs/source`, `#/definitions/source`, `source.json` and `source` all
/// name `source`.
pub fn normalize_reference(reference: &str) -> &str {
    let name = reference
        .strip_prefix("#/$defs/")
        .or_else(|| reference.strip_prefix("#/definitions/"))
        .unwrap_or(reference);
    name.strip_suffix(".json").unwrap_or(name)
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fragment, returning any fragment previously under `name`.
    pub fn insert(&mut self, name: impl Into<String>, schema: SchemaNode) -> Option<SchemaNode> {
        self.schemas.insert(name.into(), schema)
    }

    /// Builder form of [`SchemaRegistry::insert`].
    pub fn with(mut self, name: impl Into<String>, schema: SchemaNode) -> Self {
        self.insert(name, schema);
        self
    }

    /// Look up a fragment by name. The name is normalized first.
    pub fn resolve(&self, name: &str) -> Option<&SchemaNode> {
        self.schemas.get(normalize_reference(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Register every `$defs` / `definitions` entry of a raw document.
    ///
    /// Returns the number of fragments registered.
    pub fn register_document(&mut self, doc: &Value) -> usize {
        let mut count = 0;
        for key in ["$defs", "definitions"] {
            if let Some(defs) = doc.get(key).and_then(Value::as_object) {
                for (name, def) in defs {
                    self.insert(name.clone(), parse_schema(def));
                    count += 1;
                }
            }
        }
        count
    }

    /// Build a registry from every `.json` file under `dir`.
    ///
    /// Each file is registered under its file stem, along with its `$defs`.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the directory or any file cannot be read or
    /// parsed.
    pub fn load_dir(dir: &Path) -> Result<Self, LoadError> {
        if !dir.is_dir() {
            return Err(LoadError::FileNotFound {
                path: dir.to_path_buf(),
            });
        }

        let mut files = Vec::new();
        collect_files_recursive(dir, &mut files)?;
        files.sort();

        let mut registry = Self::new();
        for file in &files {
            let doc = load_json(file)?;
            registry.register_document(&doc);
            if let Some(stem) = file.file_stem().and_then(|s| s.to_str()) {
                registry.insert(stem, parse_schema(&doc));
            }
        }

        tracing::debug!(
            dir = %dir.display(),
            schemas = registry.len(),
            "loaded schema registry"
        );
        Ok(registry)
    }

    /// Replace a `$ref` node with the fragment it names.
    ///
    /// The node's own attributes are layered over the fragment, so local
    /// `title`, `required` and the like win. Chains of references are followed
    /// up to `max_depth` links. Nodes without a reference are borrowed as-is;
    /// unknown names drop the reference and keep the local attributes.
    pub fn deref<'a>(&self, node: &'a SchemaNode, max_depth: usize) -> Cow<'a, SchemaNode> {
        if node.reference.is_none() {
            return Cow::Borrowed(node);
        }

        let mut current = node.clone();
        for _ in 0..max_depth {
            let Some(name) = current.reference.take() else {
                return Cow::Owned(current);
            };
            let Some(target) = self.resolve(&name) else {
                tracing::warn!(reference = %name, "unresolved schema reference");
                return Cow::Owned(current);
            };
            current = merge(target, &current);
        }

        if let Some(name) = current.reference.take() {
            tracing::warn!(
                reference = %name,
                max_depth,
                "schema reference chain exceeds depth limit"
            );
        }
        Cow::Owned(current)
    }
}

fn collect_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|source| LoadError::ReadError {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files_recursive(&path, files)?;
        } else if path.extension().map(|e| e == "json").unwrap_or(false) {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SchemaKind;
    use serde_json::json;
    use tempfile::tempdir;

    fn connection() -> SchemaNode {
        parse_schema(&json!({
            "type": "object",
            "title": "Connection",
            "properties": {
                "host": { "type": "string" },
                "port": { "type": "integer" }
            },
            "required": ["host"]
        }))
    }

    #[test]
    fn normalize_reference_forms() {
        assert_eq!(normalize_reference("source"), "source");
        assert_eq!(normalize_reference("source.json"), "source");
        assert_eq!(normalize_reference("#/$defs/source"), "source");
        assert_eq!(normalize_reference("#/definitions/source"), "source");
    }

    #[test]
    fn deref_layers_local_attributes() {
        let registry = SchemaRegistry::new().with("connection", connection());
        let node = parse_schema(&json!({
            "$ref": "connection",
            "title": "Source",
            "required": ["port"]
        }));

        let resolved = registry.deref(&node, 8);
        assert_eq!(resolved.kind, SchemaKind::Object);
        assert_eq!(resolved.title.as_deref(), Some("Source"));
        assert_eq!(resolved.required, vec!["host", "port"]);
        assert!(resolved.properties.contains_key("host"));
        assert!(resolved.reference.is_none());
    }

    #[test]
    fn deref_without_reference_borrows() {
        let registry = SchemaRegistry::new();
        let node = connection();
        assert!(matches!(registry.deref(&node, 8), Cow::Borrowed(_)));
    }

    #[test]
    fn deref_unknown_reference_keeps_local() {
        let registry = SchemaRegistry::new();
        let node = parse_schema(&json!({ "$ref": "missing", "title": "Orphan" }));

        let resolved = registry.deref(&node, 8);
        assert_eq!(resolved.kind, SchemaKind::Unknown);
        assert_eq!(resolved.title.as_deref(), Some("Orphan"));
        assert!(resolved.reference.is_none());
    }

    #[test]
    fn deref_follows_chains_and_stops_on_cycles() {
        let registry = SchemaRegistry::new()
            .with("a", parse_schema(&json!({ "$ref": "b", "title": "A" })))
            .with("b", parse_schema(&json!({ "type": "string" })))
            .with("loop", parse_schema(&json!({ "$ref": "loop" })));

        let chained_root = parse_schema(&json!({ "$ref": "a" }));
        let chained = registry.deref(&chained_root, 8);
        assert_eq!(chained.kind, SchemaKind::String);
        assert_eq!(chained.title.as_deref(), Some("A"));

        let cyclic_root = parse_schema(&json!({ "$ref": "loop" }));
        let cyclic = registry.deref(&cyclic_root, 8);
        assert!(cyclic.reference.is_none());
    }

    #[test]
    fn register_document_defs() {
        let mut registry = SchemaRegistry::new();
        let count = registry.register_document(&json!({
            "$defs": { "a": { "type": "string" } },
            "definitions": { "b": { "type": "number" } }
        }));
        assert_eq!(count, 2);
        assert_eq!(registry.resolve("#/$defs/a").unwrap().kind, SchemaKind::String);
        assert_eq!(registry.resolve("b").unwrap().kind, SchemaKind::Number);
    }

    #[test]
    fn load_dir_registers_file_stems() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("connection.json"),
            serde_json::to_string(&json!({
                "type": "object",
                "$defs": { "port": { "type": "integer" } }
            }))
            .unwrap(),
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let registry = SchemaRegistry::load_dir(dir.path()).unwrap();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["connection", "port"]);
    }

    #[test]
    fn load_dir_missing_directory() {
        let result = SchemaRegistry::load_dir(Path::new("/nonexistent/registry"));
        assert!(matches!(result, Err(LoadError::FileNotFound { .. })));
    }
}
