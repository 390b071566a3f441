//! Field-by-field merging of settings tiers.
//!
//! Tiers are read as YAML and converted to JSON values before merging.
//! Arrays are replaced entirely, not concatenated.

use serde_json::Value;

/// Deep merge two JSON values, with `overlay` taking precedence over `base`.
///
/// - Objects are merged recursively: keys in overlay override keys in base
/// - Arrays, strings, numbers, booleans are replaced entirely
/// - A null overlay keeps the base value (null means "not specified")
///
/// # Example
/// ```
/// use serde_json::json;
/// use tsconfig_graph::config::deep_merge;
///
/// let defaults = json!({ "concurrency": 50, "patterns": ["**/tsconfig*.json"] });
/// let project = json!({ "patterns": ["packages/*/tsconfig.json"] });
/// let merged = deep_merge(defaults, project);
/// assert_eq!(
///     merged,
///     json!({ "concurrency": 50, "patterns": ["packages/*/tsconfig.json"] })
/// );
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (base, Value::Null) => base,
        (Value::Object(mut merged), Value::Object(tier)) => {
            for (key, value) in tier {
                let slot = merged.entry(key).or_insert(Value::Null);
                *slot = deep_merge(slot.take(), value);
            }
            Value::Object(merged)
        }
        (_, overlay) => overlay,
    }
}

/// Merge tiers in order, later tiers taking precedence.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_overlay_scalar_wins() {
        let result = deep_merge(json!({"concurrency": 50, "dot": false}), json!({"dot": true}));
        assert_eq!(result, json!({"concurrency": 50, "dot": true}));
    }

    #[test]
    fn test_patterns_replaced_not_appended() {
        let result = deep_merge(
            json!({"patterns": ["**/tsconfig*.json"]}),
            json!({"patterns": ["apps/*/tsconfig.json", "libs/*/tsconfig.json"]}),
        );
        assert_eq!(
            result,
            json!({"patterns": ["apps/*/tsconfig.json", "libs/*/tsconfig.json"]})
        );
    }

    #[test]
    fn test_empty_yaml_tier_is_ignored() {
        // An empty YAML document deserializes to null
        let result = deep_merge(json!({"pretty": true}), Value::Null);
        assert_eq!(result, json!({"pretty": true}));
    }

    #[test]
    fn test_null_field_keeps_base() {
        let result = deep_merge(json!({"concurrency": 4}), json!({"concurrency": null}));
        assert_eq!(result, json!({"concurrency": 4}));
    }

    #[test]
    fn test_new_keys_are_added() {
        let result = deep_merge(json!({"concurrency": 50}), json!({"gitignore": true}));
        assert_eq!(result, json!({"concurrency": 50, "gitignore": true}));
    }

    #[test]
    fn test_merge_all_tiers() {
        let tiers = vec![
            json!({"concurrency": 50, "pretty": false}),
            json!({"concurrency": 10}),
            json!({"pretty": true}),
        ];
        assert_eq!(deep_merge_all(tiers), json!({"concurrency": 10, "pretty": true}));
    }
}
