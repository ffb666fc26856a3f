//! Merging a matched `then` fragment into a resolved schema.

use crate::types::{SchemaKind, SchemaNode};

/// Combine `base` with a matched `then` fragment.
///
/// - `properties`: shallow union, `then` replaces same-named entries whole.
/// - `required`: set union, base order first.
/// - `allOf`: appended, skipping branches `base` already carries.
/// - other attributes: overwritten when present on `then`.
///
/// Neither input is modified.
pub fn merge(base: &SchemaNode, then: &SchemaNode) -> SchemaNode {
    let mut merged = base.clone();

    for (key, prop) in &then.properties {
        merged.properties.insert(key.clone(), prop.clone());
    }

    for name in &then.required {
        if !merged.is_required(name) {
            merged.required.push(name.clone());
        }
    }

    for branch in &then.all_of {
        if !merged.all_of.contains(branch) {
            merged.all_of.push(branch.clone());
        }
    }

    if then.kind != SchemaKind::Unknown {
        merged.kind = then.kind;
    }

    overwrite(&mut merged.items, &then.items);
    overwrite(&mut merged.enum_values, &then.enum_values);
    overwrite(&mut merged.enum_labels, &then.enum_labels);
    overwrite(&mut merged.min_length, &then.min_length);
    overwrite(&mut merged.max_length, &then.max_length);
    overwrite(&mut merged.minimum, &then.minimum);
    overwrite(&mut merged.maximum, &then.maximum);
    overwrite(&mut merged.format, &then.format);
    overwrite(&mut merged.title, &then.title);
    overwrite(&mut merged.description, &then.description);
    overwrite(&mut merged.secret, &then.secret);
    overwrite(&mut merged.reference, &then.reference);

    merged
}

fn overwrite<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if let Some(v) = value {
        *slot = Some(v.clone());
    }
}
