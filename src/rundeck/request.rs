/*!
Request assembly for the Rundeck REST API.

Every remote call is described by an [`Operation`] (method + path template)
and a [`Params`] set holding only the parameters the caller actually supplied.
[`build_request`] combines both with the immutable [`RequestContext`] into a
[`Request`] ready for the client.

Body placement per operation:
  - query only      : list/query endpoints, ad-hoc command
  - JSON body       : job execute / retry (supplied params go in the body)
  - form body       : script from URL (`scriptURL` in the body, rest in query)
  - multipart body  : script upload (`scriptFile`, rest in query)

The auth token lives in `RequestContext::base_params` and is merged into the
query string last, so it wins any key collision.
*/

use std::path::PathBuf;

use reqwest::Method;
use serde_json::{Map, Value};
use url::Url;

use super::error::{Error, Result};
use super::files::FileResolver;

/// Path prefix of the supported API version.
pub const DEFAULT_API_VERSION: u32 = 24;

/* -------------------------------------------------------------------------- */
/* Parameter values                                                           */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    List(Vec<String>),
    Int(i64),
    Map(Map<String, Value>),
}

impl ParamValue {
    fn to_json(&self) -> Value {
        match self {
            ParamValue::Str(s) => Value::String(s.clone()),
            ParamValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            ParamValue::Int(n) => Value::Number((*n).into()),
            ParamValue::Map(m) => Value::Object(m.clone()),
        }
    }
}

/// Tri-state boolean parameter. `Unset` is never sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Flag {
    #[default]
    Unset,
    True,
    False,
}

impl Flag {
    /// Parse a raw argument; empty or absent means `Unset`.
    pub fn parse(raw: Option<&str>, name: &str) -> Result<Self> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Flag::Unset);
        };
        match raw.to_ascii_lowercase().as_str() {
            "true" => Ok(Flag::True),
            "false" => Ok(Flag::False),
            _ => Err(Error::InvalidFlag {
                name: name.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    pub fn as_wire(&self) -> Option<&'static str> {
        match self {
            Flag::Unset => None,
            Flag::True => Some("true"),
            Flag::False => Some("false"),
        }
    }
}

/// Ordered wire-key -> value mapping that only records supplied values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<(String, ParamValue)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string value; empty strings are skipped.
    pub fn str(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.insert(key, ParamValue::Str(v.to_string()));
        }
        self
    }

    /// Add a list value sent as repeated query keys; empty lists are skipped.
    pub fn list(mut self, key: &str, values: &[String]) -> Self {
        if !values.is_empty() {
            self.insert(key, ParamValue::List(values.to_vec()));
        }
        self
    }

    /// Add a list value joined into one string (e.g. `idlist=a,b`).
    pub fn joined(self, key: &str, values: &[String], sep: &str) -> Self {
        let joined = values.join(sep);
        self.str(key, Some(joined.as_str()))
    }

    pub fn int(mut self, key: &str, value: Option<i64>) -> Self {
        if let Some(n) = value {
            self.insert(key, ParamValue::Int(n));
        }
        self
    }

    pub fn flag(self, key: &str, flag: Flag) -> Self {
        let wire = flag.as_wire();
        self.str(key, wire)
    }

    pub fn map(mut self, key: &str, value: Option<Map<String, Value>>) -> Self {
        if let Some(m) = value.filter(|m| !m.is_empty()) {
            self.insert(key, ParamValue::Map(m));
        }
        self
    }

    /// Insert or replace in place (first-seen position is kept).
    pub fn insert(&mut self, key: &str, value: ParamValue) {
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key.to_string(), value)),
        }
    }

    /// Merge another set on top; its values overwrite ours.
    pub fn merge(&mut self, other: &Params) {
        for (k, v) in &other.0 {
            self.insert(k, v.clone());
        }
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    /// Flatten into query pairs; lists become repeated keys.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.0.len());
        for (k, v) in &self.0 {
            match v {
                ParamValue::Str(s) => pairs.push((k.clone(), s.clone())),
                ParamValue::List(items) => {
                    pairs.extend(items.iter().map(|i| (k.clone(), i.clone())));
                }
                ParamValue::Int(n) => pairs.push((k.clone(), n.to_string())),
                ParamValue::Map(m) => pairs.push((k.clone(), Value::Object(m.clone()).to_string())),
            }
        }
        pairs
    }

    pub fn to_json(&self) -> Value {
        let mut obj = Map::with_capacity(self.0.len());
        for (k, v) in &self.0 {
            obj.insert(k.clone(), v.to_json());
        }
        Value::Object(obj)
    }
}

/* -------------------------------------------------------------------------- */
/* Request context                                                            */
/* -------------------------------------------------------------------------- */

/// Immutable per-invocation settings shared by every request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Base endpoint including the `/api/<version>` prefix.
    pub base_url: Url,
    pub default_project: Option<String>,
    /// Merged into every query string last (auth token).
    pub base_params: Params,
    pub verify_tls: bool,
    pub use_proxy: bool,
}

impl RequestContext {
    pub fn new(
        url: &str,
        api_version: u32,
        token: &str,
        default_project: Option<String>,
        verify_tls: bool,
        use_proxy: bool,
    ) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
        // Absolute-path join: any path on the configured URL is replaced.
        let base_url = parsed
            .join(&format!("/api/{api_version}"))
            .map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
        Ok(Self {
            base_url,
            default_project: default_project.filter(|p| !p.trim().is_empty()),
            base_params: Params::new().str("authtoken", Some(token)),
            verify_tls,
            use_proxy,
        })
    }

    /// Call-specific project, falling back to the configured default.
    pub fn project<'a>(&'a self, supplied: Option<&'a str>) -> Result<&'a str> {
        supplied
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .or(self.default_project.as_deref())
            .ok_or_else(|| Error::MissingArgument("project_name".into()))
    }

    /// Absolute URL for path segments under the versioned base. Each
    /// segment is percent-encoded, so `/`, `?` and `#` stay inside it.
    pub fn url_for<S: AsRef<str>>(&self, segments: &[S]) -> Result<Url> {
        // The url crate silently drops dot segments.
        if let Some(dot) = segments
            .iter()
            .map(|s| s.as_ref())
            .find(|s| matches!(*s, "." | ".."))
        {
            return Err(Error::InvalidUrl(format!("path segment '{dot}' is not allowed")));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(format!("{}: cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/* -------------------------------------------------------------------------- */
/* Operations                                                                 */
/* -------------------------------------------------------------------------- */

/// One fixed remote call shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    ListProjects,
    ListJobs { project: Option<String> },
    ListWebhooks { project: Option<String> },
    ExecuteJob { job_id: String },
    RetryJob { job_id: String, execution_id: String },
    QueryExecutions { project: Option<String> },
    ExecutionOutput { execution_id: i64 },
    AbortExecution { execution_id: i64 },
    RunCommand { project: Option<String> },
    RunScript { project: Option<String>, entry_id: String },
    RunScriptUrl { project: Option<String>, script_url: String },
    SendWebhookEvent { auth_token: String, payload: Option<Value> },
}

impl Operation {
    pub fn method(&self) -> Method {
        match self {
            Operation::ListProjects
            | Operation::ListJobs { .. }
            | Operation::ListWebhooks { .. }
            | Operation::ExecutionOutput { .. }
            | Operation::AbortExecution { .. }
            | Operation::RunCommand { .. } => Method::GET,
            Operation::ExecuteJob { .. }
            | Operation::RetryJob { .. }
            | Operation::QueryExecutions { .. }
            | Operation::RunScript { .. }
            | Operation::RunScriptUrl { .. }
            | Operation::SendWebhookEvent { .. } => Method::POST,
        }
    }

    /// Path segments relative to the versioned base URL, caller values
    /// kept whole.
    pub fn segments(&self, ctx: &RequestContext) -> Result<Vec<String>> {
        let project = |p: &Option<String>| ctx.project(p.as_deref()).map(str::to_string);
        let segments: Vec<String> = match self {
            Operation::ListProjects => vec!["projects".to_string()],
            Operation::ListJobs { project: p } => {
                vec!["project".into(), project(p)?, "jobs".into()]
            }
            Operation::ListWebhooks { project: p } => {
                vec!["project".into(), project(p)?, "webhooks".into()]
            }
            Operation::ExecuteJob { job_id } => {
                vec!["job".into(), require(job_id, "job_id")?.into(), "executions".into()]
            }
            Operation::RetryJob { job_id, execution_id } => vec![
                "job".into(),
                require(job_id, "job_id")?.into(),
                "retry".into(),
                require(execution_id, "execution_id")?.into(),
            ],
            Operation::QueryExecutions { project: p } => {
                vec!["project".into(), project(p)?, "executions".into()]
            }
            Operation::ExecutionOutput { execution_id } => vec![
                "execution".into(),
                execution_id.to_string(),
                "output".into(),
                "state".into(),
            ],
            Operation::AbortExecution { execution_id } => {
                vec!["execution".into(), execution_id.to_string(), "abort".into()]
            }
            Operation::RunCommand { project: p } => {
                vec!["project".into(), project(p)?, "run".into(), "command".into()]
            }
            Operation::RunScript { project: p, .. } => {
                vec!["project".into(), project(p)?, "run".into(), "script".into()]
            }
            Operation::RunScriptUrl { project: p, .. } => {
                vec!["project".into(), project(p)?, "run".into(), "url".into()]
            }
            Operation::SendWebhookEvent { auth_token, .. } => {
                vec!["webhook".into(), require(auth_token, "auth_token")?.into()]
            }
        };
        Ok(segments)
    }
}

fn require<'a>(value: &'a str, name: &str) -> Result<&'a str> {
    let v = value.trim();
    if v.is_empty() {
        return Err(Error::MissingArgument(name.to_string()));
    }
    Ok(v)
}

/* -------------------------------------------------------------------------- */
/* Built request                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(Value),
    Form(Vec<(String, String)>),
    Multipart {
        field: String,
        path: PathBuf,
        file_name: String,
    },
}

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub segments: Vec<String>,
    pub query: Params,
    pub body: Body,
}

impl Request {
    /// Unencoded `/a/b` form, for logs.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// Assemble the outbound request for an operation.
pub fn build_request(
    op: &Operation,
    supplied: Params,
    ctx: &RequestContext,
    files: &dyn FileResolver,
) -> Result<Request> {
    let segments = op.segments(ctx)?;

    let (mut query, body) = match op {
        Operation::ExecuteJob { .. } | Operation::RetryJob { .. } => {
            (Params::new(), Body::Json(supplied.to_json()))
        }
        Operation::RunScriptUrl { script_url, .. } => {
            let url = require(script_url, "script_url")?;
            (
                supplied,
                Body::Form(vec![("scriptURL".to_string(), url.to_string())]),
            )
        }
        Operation::RunScript { entry_id, .. } => {
            let file_path = files
                .resolve(entry_id)
                .ok_or_else(|| Error::FileNotFound(entry_id.clone()))?;
            let file_name = file_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| Error::FileNotFound(entry_id.clone()))?;
            (
                supplied,
                Body::Multipart {
                    field: "scriptFile".into(),
                    path: file_path,
                    file_name,
                },
            )
        }
        Operation::SendWebhookEvent { payload, .. } => {
            let body = match payload {
                Some(v) => Body::Json(v.clone()),
                None => Body::Empty,
            };
            (supplied, body)
        }
        _ => (supplied, Body::Empty),
    };

    query.merge(&ctx.base_params);

    Ok(Request {
        method: op.method(),
        segments,
        query,
        body,
    })
}
