//! Execution commands: query, output state, abort.

use serde_json::Value;
use tracing::debug;

use super::{CommandArgs, CommandResults, KEY_STRIP, LINK_FIELDS};
use crate::rundeck::{ApiResponse, Client, Error, Operation, Params, Result, normalize};

const NO_RESULTS: &str = "No results were found";

fn execution_id(args: &CommandArgs) -> Result<i64> {
    args.int("execution_id", "execution_id")?
        .ok_or_else(|| Error::MissingArgument("execution_id".into()))
}

pub async fn executions_query(client: &Client, args: &CommandArgs) -> Result<CommandResults> {
    let params = Params::new()
        .str("statusFilter", args.get("status_filter"))
        .str("abortedbyFilter", args.get("aborted_by_filter"))
        .str("userFilter", args.get("user_filter"))
        .str("recentFilter", args.get("recent_filter"))
        .str("olderFilter", args.get("older_filter"))
        .str("begin", args.get("begin"))
        .str("end", args.get("end"))
        .flag("adhoc", args.flag("adhoc")?)
        .list("jobIdListFilter", &args.list("job_id_list_filter"))
        .list("excludeJobIdListFilter", &args.list("exclude_job_id_list_filter"))
        .list("jobListFilter", &args.list("job_list_filter"))
        .list("excludeJobListFilter", &args.list("exclude_job_list_filter"))
        .str("groupPath", args.get("group_path"))
        .str("groupPathExact", args.get("group_path_exact"))
        .str("excludeGroupPath", args.get("exclude_group_path"))
        .str("excludeGroupPathExact", args.get("exclude_group_path_exact"))
        .str("jobFilter", args.get("job_filter"))
        .str("excludeJobFilter", args.get("exclude_job_filter"))
        .str("jobExactFilter", args.get("job_exact_filter"))
        .str("excludeJobExactFilter", args.get("exclude_job_exact_filter"))
        .str("executionTypeFilter", args.get("execution_type_filter"))
        .int("max", args.int("max_paging", "max")?)
        .int("offset", args.int("offset", "offset")?);

    let op = Operation::QueryExecutions {
        project: args.get("project_name").map(str::to_string),
    };

    let executions = match client.call(&op, params).await? {
        ApiResponse::Object(mut map) => {
            // Single page only; paging metadata is logged, not followed.
            if let Some(paging) = map.get("paging") {
                debug!(%paging, "executions page");
            }
            match map.remove("executions") {
                Some(Value::Array(items)) if items.is_empty() => Value::Null,
                Some(v) => v,
                None => Value::Null,
            }
        }
        other => other.into_object_or_list()?,
    };
    if executions.is_null() {
        return Ok(CommandResults::message("Job Execution Query:", NO_RESULTS));
    }

    let outputs = normalize(&executions, LINK_FIELDS, KEY_STRIP)?;
    Ok(CommandResults::new(
        "Job Execution Query:",
        "Rundeck.Query",
        "id",
        outputs,
    ))
}

pub async fn execution_output(client: &Client, args: &CommandArgs) -> Result<CommandResults> {
    let op = Operation::ExecutionOutput {
        execution_id: execution_id(args)?,
    };
    let value = client.call(&op, Params::new()).await?.into_object_or_list()?;

    let outputs = normalize(&value, LINK_FIELDS, KEY_STRIP)?;
    Ok(CommandResults::new(
        "Job Execution Output:",
        "Rundeck.ExecutionsOutput",
        "id",
        outputs,
    ))
}

pub async fn execution_abort(client: &Client, args: &CommandArgs) -> Result<CommandResults> {
    let op = Operation::AbortExecution {
        execution_id: execution_id(args)?,
    };
    let record = client.call(&op, Params::new()).await?.into_object()?;

    let outputs = normalize(&Value::Object(record), LINK_FIELDS, KEY_STRIP)?;
    Ok(CommandResults::new(
        "Job Execution Abort:",
        "Rundeck.Aborted",
        "id",
        outputs,
    ))
}
