//! Configuration layer merging
//!
//! Later layers override earlier ones, allowing for layered configuration:
//! - appsettings.json (defaults)
//! - appsettings.<environment>.json (env-specific)
//!
//! Objects are merged key by key (keys match case-insensitively). Scalars and
//! arrays in the overlay replace the base value.

use serde_json::Value;

/// Merge `overlay` into `base`
pub fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let existing = base_map
                    .keys()
                    .find(|k| k.eq_ignore_ascii_case(&key))
                    .cloned()
                    .unwrap_or(key);

                match base_map.get_mut(&existing) {
                    Some(base_value) => merge_values(base_value, overlay_value),
                    None => {
                        base_map.insert(existing, overlay_value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_nested_objects() {
        let mut base = json!({
            "Core": { "ModuleRoot": "modules", "AvailableModules": [] },
            "Logging": { "Level": "info" }
        });
        merge_values(
            &mut base,
            json!({ "Core": { "ModuleRoot": "/opt/modules" } }),
        );

        assert_eq!(base["Core"]["ModuleRoot"], "/opt/modules");
        assert_eq!(base["Core"]["AvailableModules"], json!([]));
        assert_eq!(base["Logging"]["Level"], "info");
    }

    #[test]
    fn test_arrays_are_replaced() {
        let mut base = json!({ "Modules": [1, 2, 3] });
        merge_values(&mut base, json!({ "Modules": [4] }));
        assert_eq!(base["Modules"], json!([4]));
    }

    #[test]
    fn test_keys_match_case_insensitively() {
        let mut base = json!({ "Core": { "ModuleRoot": "a" } });
        merge_values(&mut base, json!({ "core": { "moduleroot": "b" } }));
        assert_eq!(base, json!({ "Core": { "ModuleRoot": "b" } }));
    }

    #[test]
    fn test_new_keys_are_added() {
        let mut base = json!({ "A": 1 });
        merge_values(&mut base, json!({ "B": 2 }));
        assert_eq!(base, json!({ "A": 1, "B": 2 }));
    }
}
