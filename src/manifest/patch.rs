//! Strategic merge of patch documents onto resources
//!
//! Without type schemas the list merge keys are fixed per field name: see
//! [`merge_keys`]. A list whose patch elements all carry the field's merge key
//! is merged element by element, any other list is replaced.

use serde_yaml::{Mapping, Value};

const DIRECTIVE: &str = "$patch";

/// Fields identifying the elements of the list stored under `field`, in
/// order of preference
pub fn merge_keys(field: Option<&str>) -> &'static [&'static str] {
    match field {
        Some("volumeMounts") => &["mountPath"],
        Some("ports") => &["containerPort", "port"],
        Some("volumeDevices") => &["devicePath"],
        Some("hostAliases") => &["ip"],
        _ => &["name"],
    }
}

/// Whether a patch document asks for its target to be removed
pub fn is_delete(patch: &Value) -> bool {
    directive(patch) == Some("delete")
}

fn directive(value: &Value) -> Option<&str> {
    value.get(DIRECTIVE).and_then(Value::as_str)
}

/// Merge `patch` into `base` in place
pub fn merge(base: &mut Value, patch: &Value) {
    merge_field(base, patch, None);
}

fn merge_field(base: &mut Value, patch: &Value, field: Option<&str>) {
    match patch {
        Value::Mapping(patch_map) if base.is_mapping() && directive(patch) != Some("replace") => {
            if let Value::Mapping(base_map) = base {
                merge_maps(base_map, patch_map);
            }
        }
        Value::Sequence(patch_items) if base.is_sequence() => {
            if let Value::Sequence(base_items) = base {
                merge_sequences(base_items, patch_items, merge_keys(field));
            }
        }
        _ => *base = strip_directives(patch),
    }
}

fn merge_maps(base: &mut Mapping, patch: &Mapping) {
    for (key, value) in patch {
        if key.as_str() == Some(DIRECTIVE) {
            continue;
        }
        if value.is_null() || is_delete(value) {
            base.remove(key);
            continue;
        }
        match base.get_mut(key) {
            Some(existing) => merge_field(existing, value, key.as_str()),
            None => {
                base.insert(key.clone(), strip_directives(value));
            }
        }
    }
}

fn merge_sequences(base: &mut Vec<Value>, patch: &[Value], keys: &[&'static str]) {
    if patch
        .iter()
        .any(|item| directive(item) == Some("replace") && item.as_mapping().map(Mapping::len) == Some(1))
    {
        *base = patch
            .iter()
            .filter(|item| directive(item) != Some("replace"))
            .map(strip_directives)
            .collect();
        return;
    }

    if !patch.iter().all(|item| merge_key(item, keys).is_some()) {
        *base = patch.iter().map(strip_directives).collect();
        return;
    }

    for item in patch {
        let Some((key, id)) = merge_key(item, keys) else {
            continue;
        };
        let position = base
            .iter()
            .position(|existing| existing.get(key) == Some(id));
        match (position, is_delete(item)) {
            (Some(index), true) => {
                base.remove(index);
            }
            (Some(index), false) => merge(&mut base[index], item),
            (None, true) => {}
            (None, false) => base.push(strip_directives(item)),
        }
    }
}

fn merge_key<'a>(item: &'a Value, keys: &[&'static str]) -> Option<(&'static str, &'a Value)> {
    let map = item.as_mapping()?;
    keys.iter().find_map(|key| map.get(*key).map(|id| (*key, id)))
}

/// Copy of `value` without `$patch` directives
fn strip_directives(value: &Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.iter()
                .filter(|(key, _)| key.as_str() != Some(DIRECTIVE))
                .map(|(key, value)| (key.clone(), strip_directives(value)))
                .collect(),
        ),
        Value::Sequence(items) => Value::Sequence(items.iter().map(strip_directives).collect()),
        other => other.clone(),
    }
}
