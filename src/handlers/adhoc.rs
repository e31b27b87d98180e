//! Ad-hoc runs (command, uploaded script, script URL) and webhook events.

use serde_json::{Map, Value};

use super::{CommandArgs, CommandResults, KEY_STRIP, LINK_FIELDS};
use crate::rundeck::{Client, FileResolver, Operation, Params, Result, normalize};

fn project(args: &CommandArgs) -> Option<String> {
    args.get("project_name").map(str::to_string)
}

/// Node dispatch parameters shared by all ad-hoc runs.
fn node_params(args: &CommandArgs) -> Result<Params> {
    Ok(Params::new()
        .str("nodeThreadcount", args.get("node_thread_count"))
        .flag("nodeKeepgoing", args.flag("node_keepgoing")?)
        .str("asUser", args.get("as_user"))
        .str("filter", args.get("node_filter")))
}

/// Script parameters shared by the upload and URL variants.
fn script_params(args: &CommandArgs) -> Result<Params> {
    Ok(node_params(args)?
        .str("argString", args.get("arg_string"))
        .str("scriptInterpreter", args.get("script_interpreter"))
        .flag("interpreterArgsQuoted", args.flag("interpreter_args_quoted")?)
        .str("fileExtension", args.get("file_extension")))
}

fn results(title: &str, prefix: &str, record: Map<String, Value>) -> Result<CommandResults> {
    let outputs = normalize(&Value::Object(record), LINK_FIELDS, KEY_STRIP)?;
    Ok(CommandResults::new(title, prefix, "id", outputs))
}

pub async fn command_run(client: &Client, args: &CommandArgs) -> Result<CommandResults> {
    let mut params = Params::new().str("exec", Some(args.require("exec")?));
    params.merge(&node_params(args)?);

    let op = Operation::RunCommand {
        project: project(args),
    };
    let record = client.call(&op, params).await?.into_object()?;
    results("Adhoc Run:", "Rundeck.ExecuteCommand", record)
}

pub async fn script_run(
    client: &Client,
    args: &CommandArgs,
    files: &dyn FileResolver,
) -> Result<CommandResults> {
    let op = Operation::RunScript {
        project: project(args),
        entry_id: args.require("entry_id")?.to_string(),
    };
    let record = client
        .call_with_files(&op, script_params(args)?, files)
        .await?
        .into_object()?;
    results("Adhoc Run Script:", "Rundeck.ExecuteScriptFile", record)
}

pub async fn script_run_from_url(client: &Client, args: &CommandArgs) -> Result<CommandResults> {
    let op = Operation::RunScriptUrl {
        project: project(args),
        script_url: args.require("script_url")?.to_string(),
    };
    let record = client
        .call(&op, script_params(args)?)
        .await?
        .into_object()?;
    results(
        "Adhoc Run Script From Url:",
        "Rundeck.ScriptExecutionFromUrl",
        record,
    )
}

pub async fn webhook_event_send(client: &Client, args: &CommandArgs) -> Result<CommandResults> {
    let op = Operation::SendWebhookEvent {
        auth_token: args.require("auth_token")?.to_string(),
        payload: args.json("json")?,
    };
    let record = client.call(&op, Params::new()).await?.into_object()?;
    results("Webhook Event Send:", "Rundeck.WebhookEvent", record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::client_for;
    use crate::rundeck::Error;
    use crate::rundeck::files::StaticFiles;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn started() -> serde_json::Value {
        json!({
            "message": "Immediate execution scheduled (7)",
            "execution": {"id": 7, "href": "http://x/api/24/execution/7", "permalink": "p"}
        })
    }

    #[tokio::test]
    async fn command_run_sends_keepgoing_false() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/24/project/demo/run/command"))
            .and(query_param("exec", "uptime"))
            .and(query_param("nodeKeepgoing", "false"))
            .and(query_param("filter", "tags: web"))
            .respond_with(ResponseTemplate::new(200).set_body_json(started()))
            .expect(1)
            .mount(&server)
            .await;

        let args: CommandArgs = [
            ("exec", "uptime"),
            ("node_keepgoing", "false"),
            ("node_filter", "tags: web"),
        ]
        .into_iter()
        .collect();
        let r = command_run(&client_for(&server), &args).await.unwrap();
        assert_eq!(r.outputs["execution"], json!({"id": 7}));
    }

    #[tokio::test]
    async fn command_run_rejects_bad_flag() {
        let server = MockServer::start().await;
        let args: CommandArgs = [("exec", "ls"), ("node_keepgoing", "sometimes")]
            .into_iter()
            .collect();
        let err = command_run(&client_for(&server), &args).await.unwrap_err();
        assert!(matches!(err, Error::InvalidFlag { .. }));
    }

    #[tokio::test]
    async fn script_run_uploads_resolved_file() {
        let server = MockServer::start().await;
        let script = std::env::temp_dir().join("rundeck_cli_adhoc.sh");
        std::fs::write(&script, "#!/bin/sh\necho adhoc").unwrap();

        Mock::given(method("POST"))
            .and(path("/api/24/project/demo/run/script"))
            .and(query_param("scriptInterpreter", "bash"))
            .and(query_param("interpreterArgsQuoted", "true"))
            .and(body_string_contains("echo adhoc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(started()))
            .expect(1)
            .mount(&server)
            .await;

        let files = StaticFiles::default().with("42@7", script);
        let args: CommandArgs = [
            ("entry_id", "42@7"),
            ("script_interpreter", "bash"),
            ("interpreter_args_quoted", "true"),
        ]
        .into_iter()
        .collect();
        let r = script_run(&client_for(&server), &args, &files).await.unwrap();
        assert_eq!(r.outputs_prefix.as_deref(), Some("Rundeck.ExecuteScriptFile"));
    }

    #[tokio::test]
    async fn script_run_unknown_entry_is_not_found() {
        let server = MockServer::start().await;
        let args: CommandArgs = [("entry_id", "nope")].into_iter().collect();
        let err = script_run(&client_for(&server), &args, &StaticFiles::default())
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Could not find file path"));
    }

    #[tokio::test]
    async fn script_from_url_requires_url() {
        let server = MockServer::start().await;
        let err = script_run_from_url(&client_for(&server), &CommandArgs::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingArgument(ref n) if n == "script_url"));
    }

    #[tokio::test]
    async fn webhook_event_posts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/24/webhook/hook-token"))
            .and(body_json(json!({"event": "deploy"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"msg": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let args: CommandArgs = [("auth_token", "hook-token"), ("json", r#"{"event":"deploy"}"#)]
            .into_iter()
            .collect();
        let r = webhook_event_send(&client_for(&server), &args).await.unwrap();
        assert_eq!(r.outputs, json!({"msg": "ok"}));
    }

    #[tokio::test]
    async fn webhook_event_without_payload_sends_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/24/webhook/hook-token"))
            .and(query_param("authtoken", "tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"msg": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let args: CommandArgs = [("auth_token", "hook-token")].into_iter().collect();
        let r = webhook_event_send(&client_for(&server), &args).await.unwrap();
        assert_eq!(r.outputs, json!({"msg": "ok"}));

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
        assert!(received[0].body.is_empty());
    }
}
