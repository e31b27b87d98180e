//! Response shape classification.
//!
//! Bodies are classified once, right after the HTTP call. Handlers then ask
//! for the shape they expect and get an `UnexpectedShape` error otherwise.

use serde_json::{Map, Value};

use super::error::{Error, Result};

/// Longest raw body excerpt carried in shape errors.
const RAW_EXCERPT_CHARS: usize = 300;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Object(Map<String, Value>),
    List(Vec<Value>),
    /// Object the service flagged with `"error": true`.
    Error {
        message: String,
        code: Option<String>,
    },
    /// Scalar, null or empty body.
    Other(Value),
}

impl ApiResponse {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) if map.get("error").and_then(Value::as_bool) == Some(true) => {
                let message = map
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string();
                let code = map
                    .get("errorCode")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                ApiResponse::Error { message, code }
            }
            Value::Object(map) => ApiResponse::Object(map),
            Value::Array(items) => ApiResponse::List(items),
            other => ApiResponse::Other(other),
        }
    }

    /// Parse a raw body. Empty bodies become `Other(Null)`; non-JSON text is
    /// kept as `Other(String)`.
    pub fn from_body(body: &str) -> Self {
        if body.trim().is_empty() {
            return ApiResponse::Other(Value::Null);
        }
        match serde_json::from_str::<Value>(body) {
            Ok(v) => Self::from_value(v),
            Err(_) => ApiResponse::Other(Value::String(body.to_string())),
        }
    }

    pub fn into_object(self) -> Result<Map<String, Value>> {
        match self {
            ApiResponse::Object(map) => Ok(map),
            other => Err(other.mismatch("a single object")),
        }
    }

    pub fn into_list(self) -> Result<Vec<Value>> {
        match self {
            ApiResponse::List(items) => Ok(items),
            other => Err(other.mismatch("a list of objects")),
        }
    }

    /// Either shape, as a plain value.
    pub fn into_object_or_list(self) -> Result<Value> {
        match self {
            ApiResponse::Object(map) => Ok(Value::Object(map)),
            ApiResponse::List(items) => Ok(Value::Array(items)),
            other => Err(other.mismatch("an object or a list of objects")),
        }
    }

    fn mismatch(self, expected: &'static str) -> Error {
        match self {
            ApiResponse::Error { message, code } => Error::Api { message, code },
            other => Error::UnexpectedShape {
                expected,
                raw: excerpt(&other.into_value().to_string()),
            },
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            ApiResponse::Object(map) => Value::Object(map),
            ApiResponse::List(items) => Value::Array(items),
            ApiResponse::Error { message, code } => serde_json::json!({
                "error": true,
                "message": message,
                "errorCode": code,
            }),
            ApiResponse::Other(v) => v,
        }
    }
}

fn excerpt(raw: &str) -> String {
    if raw.chars().count() <= RAW_EXCERPT_CHARS {
        return raw.to_string();
    }
    let mut out: String = raw.chars().take(RAW_EXCERPT_CHARS).collect();
    out.push('…');
    out
}
