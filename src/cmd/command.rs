/*!
Command names accepted by `exec`.

Names follow the host platform's hyphenated convention
(`rundeck-jobs-list`, ...). `test-module` is the connectivity check.

Helpers:
  - variants()
  - from_str_ci()
  - description()
  - as_str()
*/

use std::fmt;

#[derive(clap::ValueEnum, Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CommandName {
    /// Connectivity / credentials check
    #[value(name = "test-module")]
    TestModule,
    #[value(name = "rundeck-projects-list")]
    ProjectsList,
    #[value(name = "rundeck-jobs-list")]
    JobsList,
    #[value(name = "rundeck-webhooks-list")]
    WebhooksList,
    #[value(name = "rundeck-job-execute")]
    JobExecute,
    #[value(name = "rundeck-job-retry")]
    JobRetry,
    #[value(name = "rundeck-job-executions-query")]
    ExecutionsQuery,
    #[value(name = "rundeck-job-execution-output")]
    ExecutionOutput,
    #[value(name = "rundeck-job-execution-abort")]
    ExecutionAbort,
    #[value(name = "rundeck-adhoc-command-run")]
    AdhocCommandRun,
    #[value(name = "rundeck-adhoc-script-run")]
    AdhocScriptRun,
    #[value(name = "rundeck-adhoc-script-run-from-url")]
    AdhocScriptRunFromUrl,
    #[value(name = "rundeck-webhook-event-send")]
    WebhookEventSend,
}

impl CommandName {
    /// All commands in help / listing order.
    pub const fn variants() -> &'static [CommandName] {
        &[
            CommandName::TestModule,
            CommandName::ProjectsList,
            CommandName::JobsList,
            CommandName::WebhooksList,
            CommandName::JobExecute,
            CommandName::JobRetry,
            CommandName::ExecutionsQuery,
            CommandName::ExecutionOutput,
            CommandName::ExecutionAbort,
            CommandName::AdhocCommandRun,
            CommandName::AdhocScriptRun,
            CommandName::AdhocScriptRunFromUrl,
            CommandName::WebhookEventSend,
        ]
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            CommandName::TestModule => "test-module",
            CommandName::ProjectsList => "rundeck-projects-list",
            CommandName::JobsList => "rundeck-jobs-list",
            CommandName::WebhooksList => "rundeck-webhooks-list",
            CommandName::JobExecute => "rundeck-job-execute",
            CommandName::JobRetry => "rundeck-job-retry",
            CommandName::ExecutionsQuery => "rundeck-job-executions-query",
            CommandName::ExecutionOutput => "rundeck-job-execution-output",
            CommandName::ExecutionAbort => "rundeck-job-execution-abort",
            CommandName::AdhocCommandRun => "rundeck-adhoc-command-run",
            CommandName::AdhocScriptRun => "rundeck-adhoc-script-run",
            CommandName::AdhocScriptRunFromUrl => "rundeck-adhoc-script-run-from-url",
            CommandName::WebhookEventSend => "rundeck-webhook-event-send",
        }
    }

    /// Case-insensitive lookup, accepting names without the `rundeck-` prefix.
    pub fn from_str_ci(s: &str) -> Option<Self> {
        let norm = s.trim().to_ascii_lowercase();
        Self::variants().iter().copied().find(|c| {
            let full = c.as_str();
            full == norm || full.strip_prefix("rundeck-") == Some(norm.as_str())
        })
    }

    pub const fn description(&self) -> &'static str {
        match self {
            CommandName::TestModule => "Check connectivity and token validity",
            CommandName::ProjectsList => "List all existing projects",
            CommandName::JobsList => "List jobs in a project",
            CommandName::WebhooksList => "List webhooks in a project",
            CommandName::JobExecute => "Execute an existing job",
            CommandName::JobRetry => "Retry a failed job execution",
            CommandName::ExecutionsQuery => "Query previous and active executions",
            CommandName::ExecutionOutput => "Get workflow state metadata of an execution",
            CommandName::ExecutionAbort => "Abort an active execution",
            CommandName::AdhocCommandRun => "Run a shell command on nodes",
            CommandName::AdhocScriptRun => "Run an uploaded script file on nodes",
            CommandName::AdhocScriptRunFromUrl => "Run a script downloaded from a URL on nodes",
            CommandName::WebhookEventSend => "Send an event to a webhook",
        }
    }

    /// Argument names understood by the command (required ones first).
    pub const fn arguments(&self) -> &'static [&'static str] {
        match self {
            CommandName::TestModule | CommandName::ProjectsList => &[],
            CommandName::JobsList => &[
                "project_name",
                "id_list",
                "group_path",
                "job_filter",
                "job_exec_filter",
                "group_path_exact",
                "scheduled_filter",
                "server_node_uuid_filter",
            ],
            CommandName::WebhooksList => &["project_name"],
            CommandName::JobExecute => &[
                "job_id",
                "arg_string",
                "log_level",
                "as_user",
                "filter",
                "run_at_time",
                "options",
            ],
            CommandName::JobRetry => &[
                "job_id",
                "execution_id",
                "arg_string",
                "log_level",
                "as_user",
                "failed_nodes",
                "options",
            ],
            CommandName::ExecutionsQuery => &[
                "project_name",
                "status_filter",
                "aborted_by_filter",
                "user_filter",
                "recent_filter",
                "older_filter",
                "begin",
                "end",
                "adhoc",
                "job_id_list_filter",
                "exclude_job_id_list_filter",
                "job_list_filter",
                "exclude_job_list_filter",
                "group_path",
                "group_path_exact",
                "exclude_group_path",
                "exclude_group_path_exact",
                "job_filter",
                "exclude_job_filter",
                "job_exact_filter",
                "exclude_job_exact_filter",
                "execution_type_filter",
                "max_paging",
                "offset",
            ],
            CommandName::ExecutionOutput | CommandName::ExecutionAbort => &["execution_id"],
            CommandName::AdhocCommandRun => &[
                "exec",
                "project_name",
                "node_thread_count",
                "node_keepgoing",
                "as_user",
                "node_filter",
            ],
            CommandName::AdhocScriptRun => &[
                "entry_id",
                "project_name",
                "arg_string",
                "node_thread_count",
                "node_keepgoing",
                "as_user",
                "node_filter",
                "script_interpreter",
                "interpreter_args_quoted",
                "file_extension",
            ],
            CommandName::AdhocScriptRunFromUrl => &[
                "script_url",
                "project_name",
                "arg_string",
                "node_thread_count",
                "node_keepgoing",
                "as_user",
                "node_filter",
                "script_interpreter",
                "interpreter_args_quoted",
                "file_extension",
            ],
            CommandName::WebhookEventSend => &["auth_token", "json"],
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/* --------------------------------- Tests ---------------------------------- */

#[cfg(test)]
mod tests {
    use super::CommandName;
    use clap::ValueEnum;

    #[test]
    fn parse_case_insensitive() {
        assert_eq!(
            CommandName::from_str_ci("RUNDECK-JOBS-LIST"),
            Some(CommandName::JobsList)
        );
        assert_eq!(
            CommandName::from_str_ci(" job-execution-abort "),
            Some(CommandName::ExecutionAbort)
        );
        assert_eq!(
            CommandName::from_str_ci("test-module"),
            Some(CommandName::TestModule)
        );
        assert_eq!(CommandName::from_str_ci("unknown"), None);
    }

    #[test]
    fn value_enum_names_match_as_str() {
        for c in CommandName::variants() {
            let pv = c.to_possible_value().unwrap();
            assert_eq!(pv.get_name(), c.as_str());
        }
    }

    #[test]
    fn variants_cover_all_commands() {
        assert_eq!(CommandName::variants().len(), CommandName::value_variants().len());
    }

    #[test]
    fn display_output() {
        assert_eq!(CommandName::JobsList.to_string(), "rundeck-jobs-list");
    }
}
