//! Job commands: list, execute, retry.

use serde_json::Value;

use super::{CommandArgs, CommandResults, KEY_STRIP, LINK_FIELDS};
use crate::rundeck::{Client, Operation, Params, Result, normalize};

pub async fn jobs_list(client: &Client, args: &CommandArgs) -> Result<CommandResults> {
    let params = Params::new()
        .joined("idlist", &args.list("id_list"), ",")
        .str("groupPath", args.get("group_path"))
        .str("jobFilter", args.get("job_filter"))
        .str("jobExactFilter", args.get("job_exec_filter"))
        .str("groupPathExact", args.get("group_path_exact"))
        .flag("scheduledFilter", args.flag("scheduled_filter")?)
        .str("serverNodeUUIDFilter", args.get("server_node_uuid_filter"));

    let op = Operation::ListJobs {
        project: args.get("project_name").map(str::to_string),
    };
    let items = client.call(&op, params).await?.into_list()?;

    let outputs = normalize(&Value::Array(items), LINK_FIELDS, KEY_STRIP)?;
    Ok(CommandResults::new("Jobs List:", "Rundeck.Jobs", "Id", outputs))
}

/// Parameters shared by execute and retry.
fn run_params(args: &CommandArgs) -> Result<Params> {
    Ok(Params::new()
        .str("argString", args.get("arg_string"))
        .str("loglevel", args.get("log_level"))
        .str("asUser", args.get("as_user"))
        .map("options", args.pairs("options")?))
}

pub async fn job_execute(client: &Client, args: &CommandArgs) -> Result<CommandResults> {
    let params = run_params(args)?
        .str("filter", args.get("filter"))
        .str("runAtTime", args.get("run_at_time"));

    let op = Operation::ExecuteJob {
        job_id: args.require("job_id")?.to_string(),
    };
    let record = client.call(&op, params).await?.into_object()?;

    let outputs = normalize(&Value::Object(record), LINK_FIELDS, KEY_STRIP)?;
    Ok(CommandResults::new(
        "Execute Job:",
        "Rundeck.ExecutedJobs",
        "id",
        outputs,
    ))
}

pub async fn job_retry(client: &Client, args: &CommandArgs) -> Result<CommandResults> {
    let params = run_params(args)?.flag("failedNodes", args.flag("failed_nodes")?);

    let op = Operation::RetryJob {
        job_id: args.require("job_id")?.to_string(),
        execution_id: args.require("execution_id")?.to_string(),
    };
    let record = client.call(&op, params).await?.into_object()?;

    let outputs = normalize(&Value::Object(record), LINK_FIELDS, KEY_STRIP)?;
    Ok(CommandResults::new(
        "Retry Job:",
        "Rundeck.ExecutedJobs",
        "id",
        outputs,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::client_for;
    use crate::rundeck::Error;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn jobs_list_by_group_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/24/project/demo/jobs"))
            .and(query_param("groupPath", "ops"))
            .and(query_param("authtoken", "tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": "j-1",
                    "name": "backup",
                    "group": "ops",
                    "project": "demo",
                    "href": "http://x/api/24/job/j-1",
                    "permalink": "http://x/project/demo/job/show/j-1",
                    "scheduled": true
                }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let args: CommandArgs = [("group_path", "ops")].into_iter().collect();
        let r = jobs_list(&client_for(&server), &args).await.unwrap();

        assert_eq!(r.outputs_key_field.as_deref(), Some("Id"));
        let record = r.records()[0];
        assert!(record.get("href").is_none());
        assert!(record.get("permalink").is_none());
        assert_eq!(record["name"], json!("backup"));
    }

    #[tokio::test]
    async fn jobs_list_joins_id_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/24/project/demo/jobs"))
            .and(query_param("idlist", "a,b"))
            .and(query_param("scheduledFilter", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let args: CommandArgs = [("id_list", "a,b"), ("scheduled_filter", "false")]
            .into_iter()
            .collect();
        let r = jobs_list(&client_for(&server), &args).await.unwrap();
        assert!(r.records().is_empty());
    }

    #[tokio::test]
    async fn execute_sends_options_in_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/24/job/j-1/executions"))
            .and(body_json(json!({
                "argString": "-env prod",
                "loglevel": "DEBUG",
                "options": {"env": "prod", "dry": "no"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 41,
                "href": "http://x/api/24/execution/41",
                "status": "running",
                "date-started": {"unixtime": 1, "date": "2020-01-01T00:00:00Z"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let args: CommandArgs = [
            ("job_id", "j-1"),
            ("arg_string", "-env prod"),
            ("log_level", "DEBUG"),
            ("options", "env=prod,dry=no"),
        ]
        .into_iter()
        .collect();
        let r = job_execute(&client_for(&server), &args).await.unwrap();
        assert_eq!(
            r.outputs,
            json!({
                "id": 41,
                "status": "running",
                "datestarted": {"unixtime": 1, "date": "2020-01-01T00:00:00Z"}
            })
        );
    }

    #[tokio::test]
    async fn execute_without_job_id_fails_before_request() {
        let server = MockServer::start().await;
        let args = CommandArgs::default();
        let err = job_execute(&client_for(&server), &args).await.unwrap_err();
        assert!(matches!(err, Error::MissingArgument(ref n) if n == "job_id"));
    }

    #[tokio::test]
    async fn execute_with_malformed_options_fails() {
        let server = MockServer::start().await;
        let args: CommandArgs = [("job_id", "j"), ("options", "a=1,broken")]
            .into_iter()
            .collect();
        let err = job_execute(&client_for(&server), &args).await.unwrap_err();
        assert_eq!(err.to_string(), "Could not parse field: broken");
    }

    #[tokio::test]
    async fn retry_sends_explicit_false_failed_nodes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/24/job/j-1/retry/40"))
            .and(body_json(json!({"failedNodes": "false"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42})))
            .expect(1)
            .mount(&server)
            .await;

        let args: CommandArgs = [
            ("job_id", "j-1"),
            ("execution_id", "40"),
            ("failed_nodes", "false"),
        ]
        .into_iter()
        .collect();
        let r = job_retry(&client_for(&server), &args).await.unwrap();
        assert_eq!(r.outputs, json!({"id": 42}));
    }

    #[tokio::test]
    async fn retry_list_response_is_unexpected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/24/job/j-1/retry/40"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .mount(&server)
            .await;

        let args: CommandArgs = [("job_id", "j-1"), ("execution_id", "40")]
            .into_iter()
            .collect();
        let err = job_retry(&client_for(&server), &args).await.unwrap_err();
        assert!(matches!(err, Error::UnexpectedShape { .. }));
    }
}
