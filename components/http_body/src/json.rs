//! JSON body encoding

use bytes::Bytes;
use http_errors::HttpResult;
use http_types::JsonOptions;
use serde_json::Value;

/// Serialize a JSON value per §4.1: `Content-Type: application/json`, with object
/// keys sorted by default so that the encoded body (and anything derived from it,
/// like a cache key) stays stable across semantically-equal inputs.
pub fn encode_json(value: &Value, options: JsonOptions) -> HttpResult<Bytes> {
    let value = if options.sorted_keys {
        sort_keys(value)
    } else {
        value.clone()
    };
    let bytes = serde_json::to_vec(&value)?;
    Ok(Bytes::from(bytes))
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted = serde_json::Map::new();
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                sorted.insert(key.clone(), sort_keys(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
