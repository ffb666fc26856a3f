//! Condition matching for `allOf[{ if, then }]` branches.

use crate::types::{Condition, ConditionFragment};
use crate::value::ValueTree;

/// Whether `data` satisfies every constraint in `condition`.
///
/// Matching is fail-closed: a key absent from `data` fails any `const` or
/// `enum` constraint on it. Nested fragments are matched against the nested
/// object, or an empty object when the data has none.
pub fn matches(condition: &ConditionFragment, data: &ValueTree) -> bool {
    condition
        .properties
        .iter()
        .all(|(key, leaf)| leaf_matches(leaf, data.get(key)))
}

fn leaf_matches(leaf: &Condition, value: Option<&ValueTree>) -> bool {
    if let Some(expected) = &leaf.constant {
        if !value.is_some_and(|v| v.strict_eq(expected)) {
            return false;
        }
    }

    if let Some(options) = &leaf.enum_values {
        let Some(v) = value else {
            return false;
        };
        if !options.iter().any(|option| v.strict_eq(option)) {
            return false;
        }
    }

    match &leaf.nested {
        Some(nested) => match value {
            Some(v @ ValueTree::Object(_)) => matches(nested, v),
            _ => matches(nested, &ValueTree::empty_object()),
        },
        None => true,
    }
}
