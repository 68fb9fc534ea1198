//! Merge helpers for layered inputs.

use serde_json::{Map, Value};

/// Merge overlay values into the base. Null and blank string values are
/// treated as unset and leave the base untouched.
pub(super) fn merge_input_values(base: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        let unset = match value {
            Value::Null => true,
            Value::String(text) => text.trim().is_empty(),
            _ => false,
        };
        if unset {
            continue;
        }
        base.insert(key.clone(), value.clone());
    }
}
