//! Deep merge of configuration layers.
//!
//! Mappings merge key by key, recursively. Anything else (scalars, sequences,
//! null) in a higher layer replaces the lower layer's value outright.

use super::types::ConfigMap;
use serde_json::Value;

/// Deep merge two JSON values, with `overlay` taking precedence over `base`.
///
/// - Objects are merged recursively: keys in overlay override keys in base
/// - Arrays, strings, numbers, booleans and nulls replace the base entirely
///
/// # Example
/// ```
/// use serde_json::json;
/// use yaml_conf::config::deep_merge;
///
/// let base = json!({
///     "server": { "port": 8080, "host": "localhost" },
///     "features": ["a", "b"]
/// });
/// let overlay = json!({
///     "server": { "port": 9000 },
///     "features": ["c"]
/// });
/// let result = deep_merge(base, overlay);
/// assert_eq!(result, json!({
///     "server": { "port": 9000, "host": "localhost" },
///     "features": ["c"]
/// }));
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            Value::Object(merge_maps(base_map, overlay_map))
        }
        (_, overlay) => overlay,
    }
}

/// Merge `overlay` into `base` key by key.
pub fn merge_maps(mut base: ConfigMap, overlay: ConfigMap) -> ConfigMap {
    for (key, overlay_value) in overlay {
        let merged_value = match base.remove(&key) {
            Some(base_value) => deep_merge(base_value, overlay_value),
            None => overlay_value,
        };
        base.insert(key, merged_value);
    }
    base
}

/// Merge layers given highest precedence first.
///
/// The first layer that defines a key wins; lower layers only fill in keys
/// (at any depth) that higher layers leave out. The result is a fresh map.
pub fn merge_layers(layers: impl IntoIterator<Item = ConfigMap>) -> ConfigMap {
    let layers: Vec<ConfigMap> = layers.into_iter().collect();
    layers.into_iter().rev().fold(ConfigMap::new(), merge_maps)
}
