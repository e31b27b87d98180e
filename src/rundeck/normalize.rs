/*!
Response normalization.

Removes presentation-only fields (hyperlinks, permalinks) from API records and
rewrites keys by stripping configured substrings, so that keys such as
`date-started` become `datestarted` before they reach the output tree.

Rules:
  - Only nested *mappings* are normalized recursively. A list stored as a
    value is passed through untouched, elements included.
  - Every strip substring is removed from a key, in the order given.
  - When two keys collapse to the same name the later one wins.
  - A top-level list must contain only mappings.
*/

use serde_json::{Map, Value};

use super::error::{Error, Result, json_type_name};

/// Normalize a single mapping or a list of mappings.
pub fn normalize(value: &Value, drop_keys: &[&str], strip: &[&str]) -> Result<Value> {
    match value {
        Value::Object(map) => Ok(Value::Object(normalize_map(map, drop_keys, strip))),
        Value::Array(items) => normalize_list(items, drop_keys, strip).map(Value::Array),
        other => Err(Error::Shape {
            position: "at top level".into(),
            found: json_type_name(other),
        }),
    }
}

/// Normalize each element of a list; every element must be a mapping.
pub fn normalize_list(items: &[Value], drop_keys: &[&str], strip: &[&str]) -> Result<Vec<Value>> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(map) => Ok(Value::Object(normalize_map(map, drop_keys, strip))),
            other => Err(Error::Shape {
                position: format!("at list index {idx}"),
                found: json_type_name(other),
            }),
        })
        .collect()
}

pub fn normalize_map(
    map: &Map<String, Value>,
    drop_keys: &[&str],
    strip: &[&str],
) -> Map<String, Value> {
    let mut out = Map::with_capacity(map.len());
    for (key, value) in map {
        if drop_keys.contains(&key.as_str()) {
            continue;
        }
        let value = match value {
            Value::Object(nested) => Value::Object(normalize_map(nested, drop_keys, strip)),
            other => other.clone(),
        };
        out.insert(strip_key(key, strip), value);
    }
    out
}

fn strip_key(key: &str, strip: &[&str]) -> String {
    strip
        .iter()
        .filter(|s| !s.is_empty())
        .fold(key.to_string(), |acc, s| acc.replace(s, ""))
}
