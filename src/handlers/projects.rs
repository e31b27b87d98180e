//! Project level commands and the connectivity test.

use serde_json::Value;
use tracing::{debug, warn};

use super::{CommandArgs, CommandResults, KEY_STRIP, LINK_FIELDS};
use crate::rundeck::{Client, Operation, Params, Result, normalize};

const AUTH_HINT: &str = "Authorization Error: make sure your token is correctly set";

pub async fn projects_list(client: &Client) -> Result<CommandResults> {
    let items = client
        .call(&Operation::ListProjects, Params::new())
        .await?
        .into_list()?;
    debug!(count = items.len(), "projects fetched");

    let outputs = normalize(&Value::Array(items), &["url"], KEY_STRIP)?;
    Ok(CommandResults::new(
        "Projects List:",
        "Rundeck.Projects",
        "name",
        outputs,
    ))
}

pub async fn webhooks_list(client: &Client, args: &CommandArgs) -> Result<CommandResults> {
    let op = Operation::ListWebhooks {
        project: args.get("project_name").map(str::to_string),
    };
    let items = client.call(&op, Params::new()).await?.into_list()?;

    let outputs = normalize(&Value::Array(items), LINK_FIELDS, KEY_STRIP)?;
    Ok(CommandResults::new(
        "Webhooks List:",
        "Rundeck.Webhooks",
        "id",
        outputs,
    ))
}

/// `ok` when projects can be listed; an authorization hint when the token is
/// rejected. Other failures propagate.
pub async fn test_module(client: &Client) -> Result<CommandResults> {
    match client.call(&Operation::ListProjects, Params::new()).await {
        Ok(_) => Ok(CommandResults::message("Test:", "ok")),
        Err(e) if e.is_unauthorized() => {
            warn!(error = %e, "token rejected");
            Ok(CommandResults::message("Test:", AUTH_HINT))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::client_for;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn projects_drop_url_and_key_by_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/24/projects"))
            .and(query_param("authtoken", "tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"url": "http://x/api/24/project/demo", "name": "demo", "description": ""},
                {"url": "http://x/api/24/project/ops", "name": "ops", "description": "Ops"}
            ])))
            .mount(&server)
            .await;

        let r = projects_list(&client_for(&server)).await.unwrap();
        assert_eq!(r.outputs_key_field.as_deref(), Some("name"));
        assert_eq!(
            r.outputs,
            json!([
                {"name": "demo", "description": ""},
                {"name": "ops", "description": "Ops"}
            ])
        );
    }

    #[tokio::test]
    async fn projects_object_response_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/24/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "x"})))
            .mount(&server)
            .await;

        let err = projects_list(&client_for(&server)).await.unwrap_err();
        assert!(err.to_string().contains("unexpected response"));
    }

    #[tokio::test]
    async fn webhooks_for_explicit_project() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/24/project/ops/webhooks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 3, "name": "deploy", "authToken": "abc", "eventPlugin": "log-webhook-event"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let args: CommandArgs = [("project_name", "ops")].into_iter().collect();
        let r = webhooks_list(&client_for(&server), &args).await.unwrap();
        assert_eq!(r.outputs_prefix.as_deref(), Some("Rundeck.Webhooks"));
        assert_eq!(r.records().len(), 1);
    }

    #[tokio::test]
    async fn test_module_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/24/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let r = test_module(&client_for(&server)).await.unwrap();
        assert_eq!(r.message.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_module_unauthorized_hint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/24/projects"))
            .respond_with(ResponseTemplate::new(403).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let r = test_module(&client_for(&server)).await.unwrap();
        assert_eq!(r.message.as_deref(), Some(AUTH_HINT));
    }

    #[tokio::test]
    async fn test_module_plain_forbidden_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/24/projects"))
            .respond_with(ResponseTemplate::new(403).set_body_string("project acl denies read"))
            .mount(&server)
            .await;

        let err = test_module(&client_for(&server)).await.unwrap_err();
        assert!(err.to_string().contains("[403]"));
    }

    #[tokio::test]
    async fn test_module_other_errors_propagate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/24/projects"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = test_module(&client_for(&server)).await.unwrap_err();
        assert!(err.to_string().contains("[500]"));
    }
}
