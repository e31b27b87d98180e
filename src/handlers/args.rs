//! Command argument map and value coercion helpers.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::rundeck::{Error, Flag, Result};

/// String arguments for one command invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArgs(BTreeMap<String, String>);

impl CommandArgs {
    pub fn new(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }

    /// Supplied value, trimmed. Empty values count as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| Error::MissingArgument(key.to_string()))
    }

    pub fn list(&self, key: &str) -> Vec<String> {
        arg_to_list(self.get(key))
    }

    /// Integer argument; `name` is used in the error message.
    pub fn int(&self, key: &str, name: &str) -> Result<Option<i64>> {
        convert_str_to_int(self.get(key), name)
    }

    pub fn flag(&self, key: &str) -> Result<Flag> {
        Flag::parse(self.get(key), key)
    }

    pub fn pairs(&self, key: &str) -> Result<Option<Map<String, Value>>> {
        attribute_pairs_to_dict(self.get(key), ",")
    }

    /// JSON document argument (e.g. a webhook payload).
    pub fn json(&self, key: &str) -> Result<Option<Value>> {
        self.get(key)
            .map(|raw| serde_json::from_str::<Value>(raw))
            .transpose()
            .map_err(Error::from)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CommandArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// `"42"` -> `Some(42)`; absent/empty -> `None`; otherwise a number error.
pub fn convert_str_to_int(value: Option<&str>, name: &str) -> Result<Option<i64>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse::<i64>()
            .map(Some)
            .map_err(|_| Error::NotANumber(name.to_string())),
    }
}

/// Parse `key=value` segments separated by `delim`.
///
/// Each segment splits at its last `=`; keys and values are trimmed.
pub fn attribute_pairs_to_dict(
    value: Option<&str>,
    delim: &str,
) -> Result<Option<Map<String, Value>>> {
    let Some(raw) = value.filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let mut attrs = Map::new();
    for segment in raw.split(delim) {
        let (k, v) = segment
            .rsplit_once('=')
            .ok_or_else(|| Error::Parse(segment.to_string()))?;
        attrs.insert(k.trim().to_string(), Value::String(v.trim().to_string()));
    }
    Ok(Some(attrs))
}

/// A JSON array literal or a comma separated string, as a list.
pub fn arg_to_list(value: Option<&str>) -> Vec<String> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Vec::new();
    };
    if raw.starts_with('[')
        && let Ok(Value::Array(items)) = serde_json::from_str::<Value>(raw)
    {
        return items
            .into_iter()
            .map(|v| match v {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .filter(|s| !s.trim().is_empty())
            .collect();
    }
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
