//! Error type for the Rundeck client, request builder and normalizer.

/// Errors surfaced by the Rundeck integration layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Non-success HTTP status returned by the remote service.
    #[error("Error in API call [{status}] - {reason}\n{body}")]
    Upstream {
        status: u16,
        reason: String,
        body: String,
    },

    /// Request never completed. Built with the URL stripped, so the
    /// `authtoken` query value cannot reach the message.
    #[error("Connection error")]
    Transport(#[source] reqwest::Error),

    /// A success-status body that the service flagged as an error.
    #[error(
        "API returned an error: {message}{}",
        .code.as_deref().map(|c| format!(" ({c})")).unwrap_or_default()
    )]
    Api {
        message: String,
        code: Option<String>,
    },

    #[error("Got unexpected response from api (expected {expected}): {raw}")]
    UnexpectedShape { expected: &'static str, raw: String },

    #[error("'{0}' must be a number.")]
    NotANumber(String),

    #[error("'{name}' must be either 'true' or 'false', got '{value}'")]
    InvalidFlag { name: String, value: String },

    #[error("'{0}' is required")]
    MissingArgument(String),

    #[error("Could not find file path to the next entry id: {0}. \nPlease provide another one.")]
    FileNotFound(String),

    #[error("Could not parse field: {0}")]
    Parse(String),

    /// Normalizer input that is not a mapping where one is required.
    #[error("expected a mapping {position}, found {found}")]
    Shape { position: String, found: &'static str },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True when the error text suggests the token was rejected. A 401
    /// matches through its `Unauthorized` reason; a bare 403 does not.
    pub fn is_unauthorized(&self) -> bool {
        self.to_string().to_ascii_lowercase().contains("unauthorized")
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// JSON type name used in shape error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "mapping",
    }
}
