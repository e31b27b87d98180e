/*!
Command handlers and the dispatch table.

Every handler follows the same shape: read its arguments, build one
[`Operation`](crate::rundeck::Operation), check the response shape, normalize
it and wrap it in [`CommandResults`] (title, output prefix, key field and the
structured outputs). Rendering is left to the caller.

  projects.rs   : projects list, webhooks list, connectivity test
  jobs.rs       : jobs list, job execute, job retry
  executions.rs : executions query, execution output, execution abort
  adhoc.rs      : ad-hoc command / script / script-from-URL, webhook event
  args.rs       : CommandArgs + value coercion
*/

pub mod adhoc;
pub mod args;
pub mod executions;
pub mod jobs;
pub mod projects;

use serde_json::{Map, Value};

use crate::cmd::command::CommandName;
use crate::rundeck::{Client, FileResolver, Result};

pub use args::CommandArgs;

/// Presentation-only fields removed from job and execution records.
pub const LINK_FIELDS: &[&str] = &["href", "permalink"];
/// Substrings stripped from every record key.
pub const KEY_STRIP: &[&str] = &["-"];

/// Result of one command, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResults {
    pub title: String,
    /// Dotted output path, e.g. `Rundeck.Jobs`.
    pub outputs_prefix: Option<String>,
    pub outputs_key_field: Option<String>,
    /// Object, list of objects, or `Null` for message-only results.
    pub outputs: Value,
    /// Plain text shown instead of a table.
    pub message: Option<String>,
}

impl CommandResults {
    pub fn new(title: &str, prefix: &str, key_field: &str, outputs: Value) -> Self {
        Self {
            title: title.to_string(),
            outputs_prefix: Some(prefix.to_string()),
            outputs_key_field: Some(key_field.to_string()),
            outputs,
            message: None,
        }
    }

    pub fn message(title: &str, text: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            outputs_prefix: None,
            outputs_key_field: None,
            outputs: Value::Null,
            message: Some(text.into()),
        }
    }

    /// Table rows: one per object.
    pub fn records(&self) -> Vec<&Map<String, Value>> {
        match &self.outputs {
            Value::Object(map) => vec![map],
            Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
            _ => Vec::new(),
        }
    }

    /// Column keys: union of record keys in first-seen order.
    pub fn headers(&self) -> Vec<String> {
        let mut headers: Vec<String> = Vec::new();
        for record in self.records() {
            for key in record.keys() {
                if !headers.iter().any(|h| h == key) {
                    headers.push(key.clone());
                }
            }
        }
        headers
    }

    /// Outputs nested under the dotted prefix (`Rundeck.Jobs` ->
    /// `{"Rundeck": {"Jobs": ...}}`). `Null` without a prefix.
    pub fn context_tree(&self) -> Value {
        let Some(prefix) = &self.outputs_prefix else {
            return Value::Null;
        };
        prefix
            .split('.')
            .rev()
            .fold(self.outputs.clone(), |inner, segment| {
                let mut map = Map::new();
                map.insert(segment.to_string(), inner);
                Value::Object(map)
            })
    }
}

/// Run one named command.
pub async fn dispatch(
    name: CommandName,
    client: &Client,
    args: &CommandArgs,
    files: &dyn FileResolver,
) -> Result<CommandResults> {
    match name {
        CommandName::TestModule => projects::test_module(client).await,
        CommandName::ProjectsList => projects::projects_list(client).await,
        CommandName::JobsList => jobs::jobs_list(client, args).await,
        CommandName::WebhooksList => projects::webhooks_list(client, args).await,
        CommandName::JobExecute => jobs::job_execute(client, args).await,
        CommandName::JobRetry => jobs::job_retry(client, args).await,
        CommandName::ExecutionsQuery => executions::executions_query(client, args).await,
        CommandName::ExecutionOutput => executions::execution_output(client, args).await,
        CommandName::ExecutionAbort => executions::execution_abort(client, args).await,
        CommandName::AdhocCommandRun => adhoc::command_run(client, args).await,
        CommandName::AdhocScriptRun => adhoc::script_run(client, args, files).await,
        CommandName::AdhocScriptRunFromUrl => adhoc::script_run_from_url(client, args).await,
        CommandName::WebhookEventSend => adhoc::webhook_event_send(client, args).await,
    }
}

/// Shared test fixtures for handler modules.
#[cfg(test)]
pub(crate) mod testing {
    use wiremock::MockServer;

    use crate::rundeck::{Client, DEFAULT_API_VERSION, RequestContext};

    pub fn client_for(server: &MockServer) -> Client {
        let ctx = RequestContext::new(
            &server.uri(),
            DEFAULT_API_VERSION,
            "tok",
            Some("demo".into()),
            true,
            false,
        )
        .unwrap();
        Client::new(ctx).unwrap()
    }
}
