use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

mod cmd;
mod config;
mod handlers;
mod rundeck;
mod utils;

use cmd::{ExecArgs, ListArgs, TestArgs};
use config::{Config, ConfigFile};

/// Rundeck CLI - run Rundeck REST API operations from the command line
///
/// Command layout:
///   rundeck-cli list [FILTER] [--json]
///   rundeck-cli test [--json]
///   rundeck-cli exec <COMMAND> [--arg KEY=VALUE ...] [--args-file PATH] [--json]
///
/// Connection settings (highest precedence first):
///   --url / --token / --project / --insecure[=BOOL] / --proxy[=BOOL] / --file-store
///   RUNDECK_URL, RUNDECK_TOKEN, RUNDECK_PROJECT, RUNDECK_INSECURE,
///   RUNDECK_PROXY, RUNDECK_FILE_STORE
///   --config PATH (or RUNDECK_CONFIG): YAML or JSON file
///
/// Examples:
///   rundeck-cli exec rundeck-jobs-list --arg project_name=ops --arg group_path=backup
///   rundeck-cli exec job-execute --arg job_id=<uuid> --arg options=env=prod,dry=no --json
///   rundeck-cli exec rundeck-job-execution-abort --arg execution_id=123
#[derive(Parser, Debug)]
#[command(
    name = "rundeck-cli",
    version,
    about = "Rundeck CLI - jobs, executions, ad-hoc runs and webhooks over the REST API",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file (YAML or JSON)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Server URL, e.g. https://rundeck.example.com:4440
    #[arg(long, global = true, value_name = "URL")]
    url: Option<String>,

    /// API token
    #[arg(long, global = true, value_name = "TOKEN")]
    token: Option<String>,

    /// Default project for project-scoped commands
    #[arg(short = 'p', long = "project", global = true, value_name = "NAME")]
    project: Option<String>,

    /// Skip TLS certificate verification (--insecure=false turns it back on)
    #[arg(
        long,
        global = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    insecure: Option<bool>,

    /// Honor the system proxy settings (--proxy=false ignores them)
    #[arg(
        long,
        global = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    proxy: Option<bool>,

    /// Directory that script entry ids are resolved against
    #[arg(long = "file-store", global = true, value_name = "DIR")]
    file_store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available commands
    List(ListArgs),

    /// Check connectivity and credentials
    Test(TestArgs),

    /// Execute a command
    Exec(ExecArgs),
}

impl Cli {
    /// Flag layer of the configuration; unset flags leave lower layers alone.
    fn overrides(&self) -> ConfigFile {
        ConfigFile {
            url: self.url.clone(),
            token: self.token.clone(),
            project_name: self.project.clone(),
            insecure: self.insecure,
            proxy: self.proxy,
            api_version: None,
            file_store: self.file_store.clone(),
        }
    }
}

impl Commands {
    fn label(&self) -> String {
        match self {
            Commands::List(_) => "list".to_string(),
            Commands::Test(_) => "test-module".to_string(),
            Commands::Exec(args) => args.command.to_string(),
        }
    }

    fn json(&self) -> bool {
        match self {
            Commands::List(a) => a.json,
            Commands::Test(a) => a.json,
            Commands::Exec(a) => a.json,
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let overrides = cli.overrides();
    let config_path = cli.config.clone();
    let load = || Config::from_sources(config_path.as_deref(), overrides.clone());

    match cli.command {
        Commands::List(args) => cmd::execute_list(args),
        Commands::Test(args) => cmd::execute_test(args, &load()?),
        Commands::Exec(args) => cmd::execute_exec(args, &load()?),
    }
}

fn main() {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    let label = cli.command.label();
    let json = cli.command.json();

    if let Err(err) = run(cli) {
        error!(command = %label, error = %format!("{err:#}"), "command failed");
        if json {
            let out = serde_json::json!({
                "status": "error",
                "command": label,
                "error": format!("{err:#}"),
            });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string())
            );
        } else {
            eprintln!("Failed to execute {label} command.\nError:\n{err:#}");
        }
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::command::CommandName;

    #[test]
    fn parses_exec_with_globals_anywhere() {
        let cli = Cli::try_parse_from([
            "rundeck-cli",
            "exec",
            "jobs-list",
            "--arg",
            "group_path=ops",
            "--url",
            "https://r:4440",
            "-p",
            "demo",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.url.as_deref(), Some("https://r:4440"));
        assert_eq!(cli.command.label(), "rundeck-jobs-list");
        assert!(cli.command.json());
        let Commands::Exec(args) = &cli.command else {
            panic!("expected exec");
        };
        assert_eq!(args.command, CommandName::JobsList);
        assert_eq!(args.args, ["group_path=ops"]);
    }

    #[test]
    fn unset_flags_do_not_override() {
        let cli = Cli::try_parse_from(["rundeck-cli", "list"]).unwrap();
        let o = cli.overrides();
        assert_eq!(o, ConfigFile::default());

        let cli = Cli::try_parse_from(["rundeck-cli", "--insecure", "test"]).unwrap();
        assert_eq!(cli.overrides().insecure, Some(true));
        assert_eq!(cli.command.label(), "test-module");
    }

    #[test]
    fn bool_flags_can_switch_settings_off() {
        let cli = Cli::try_parse_from([
            "rundeck-cli",
            "--insecure=false",
            "--proxy=true",
            "test",
        ])
        .unwrap();
        let o = cli.overrides();
        assert_eq!(o.insecure, Some(false));
        assert_eq!(o.proxy, Some(true));

        let file = ConfigFile {
            url: Some("https://r:4440".into()),
            token: Some("t".into()),
            insecure: Some(true),
            ..Default::default()
        };
        let cfg = Config::resolve(Some(file), |_| None, o).unwrap();
        assert!(!cfg.insecure);
        assert!(cfg.proxy);

        assert!(Cli::try_parse_from(["rundeck-cli", "--insecure=maybe", "test"]).is_err());
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(Cli::try_parse_from(["rundeck-cli", "exec", "rundeck-nope"]).is_err());
    }
}
