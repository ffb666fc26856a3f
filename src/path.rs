//! Dot-addressed access into a [`ValueTree`].
//!
//! Paths look like `source.bucket` or `columns.0.name`; numeric segments
//! index into arrays. Updates are persistent: [`set`] returns a new root
//! and every subtree off the updated route is shared with the input.

use std::sync::Arc;

use crate::value::{ObjectMap, ValueTree};

/// Join a parent path and a child key. The root path is empty.
pub fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

/// Split a path into its parent path and last segment.
///
/// `"a.b.c"` yields `("a.b", "c")`; `"a"` yields `("", "a")`.
pub fn split_last(path: &str) -> (&str, &str) {
    match path.rfind('.') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}

/// Read the value at `path`.
///
/// Returns `None` as soon as a segment is absent. The empty path addresses
/// the root itself.
pub fn get<'a>(tree: &'a ValueTree, path: &str) -> Option<&'a ValueTree> {
    if path.is_empty() {
        return Some(tree);
    }

    let mut current = tree;
    for segment in path.split('.') {
        current = match current {
            ValueTree::Object(map) => map.get(segment)?,
            ValueTree::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Return a new tree with `value` stored at `path`.
///
/// Ancestors along the route are shallow-copied; everything else keeps its
/// identity. Missing or scalar intermediates become objects. An array index
/// equal to the length appends; anything further out leaves the array as it
/// is. An empty path returns the input unchanged.
pub fn set(tree: &ValueTree, path: &str, value: ValueTree) -> ValueTree {
    if path.is_empty() {
        return tree.clone();
    }

    let segments: Vec<&str> = path.split('.').collect();
    set_in(tree, &segments, value)
}

/// Return a new tree with `item` appended to the array at `path`.
///
/// A missing or non-array target is treated as an empty array. The empty
/// path addresses the root.
pub fn push(tree: &ValueTree, path: &str, item: ValueTree) -> ValueTree {
    let mut items = array_at(tree, path);
    items.push(item);
    replace(tree, path, ValueTree::from(items))
}

/// Return a new tree without the array element at `index` under `path`.
///
/// Later elements shift down by one; an out-of-range index leaves the
/// elements as they are.
pub fn remove_index(tree: &ValueTree, path: &str, index: usize) -> ValueTree {
    let mut items = array_at(tree, path);
    if index < items.len() {
        items.remove(index);
    }
    replace(tree, path, ValueTree::from(items))
}

fn array_at(tree: &ValueTree, path: &str) -> Vec<ValueTree> {
    get(tree, path)
        .and_then(ValueTree::as_array)
        .map(<[_]>::to_vec)
        .unwrap_or_default()
}

fn replace(tree: &ValueTree, path: &str, value: ValueTree) -> ValueTree {
    if path.is_empty() {
        value
    } else {
        set(tree, path, value)
    }
}

fn set_in(node: &ValueTree, segments: &[&str], value: ValueTree) -> ValueTree {
    let Some((head, rest)) = segments.split_first() else {
        return value;
    };

    if let ValueTree::Array(items) = node {
        if let Ok(index) = head.parse::<usize>() {
            if index > items.len() {
                return node.clone();
            }
            let mut items: Vec<ValueTree> = items.as_ref().clone();
            if index == items.len() {
                items.push(set_in(&ValueTree::Null, rest, value));
            } else {
                let child = std::mem::take(&mut items[index]);
                items[index] = set_in(&child, rest, value);
            }
            return ValueTree::Array(Arc::new(items));
        }
    }

    let mut map: ObjectMap = match node {
        ValueTree::Object(map) => map.as_ref().clone(),
        _ => ObjectMap::new(),
    };
    let child = map.get(*head).cloned().unwrap_or_default();
    map.insert(head.to_string(), set_in(&child, rest, value));
    ValueTree::Object(Arc::new(map))
}
