/*!
`exec.rs`

Implements the `exec` subcommand: run one named Rundeck command against the
configured server.

Arguments reach the handler as a flat string map built from:
  --arg KEY=VALUE              (repeatable)
  --args-file args.(json|yaml) (merged; CLI --arg overrides file entries)

JSON Success Output:
{
  "status": "ok",
  "command": "rundeck-jobs-list",
  "title": "Jobs List:",
  "key_field": "Id",
  "outputs": { "Rundeck": { "Jobs": [ ... ] } }
}

Message-only results (test-module, empty execution query) carry a
`"message"` field and `"outputs": null`.
*/

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::command::CommandName;
use crate::cmd::format::{StyleOptions, render_results};
use crate::config::Config;
use crate::handlers::{self, CommandArgs, CommandResults};
use crate::rundeck::{Client, LocalFileStore};

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Command to run (see `list`); the `rundeck-` prefix is optional
    #[arg(value_name = "COMMAND", value_parser = parse_command_name)]
    pub command: CommandName,

    /// Provide argument (KEY=VALUE), repeatable
    #[arg(long = "arg", value_name = "KEY=VALUE")]
    pub args: Vec<String>,

    /// Load arguments from file (JSON or YAML object). CLI --arg overrides file entries
    #[arg(long = "args-file", value_name = "PATH")]
    pub args_file: Option<String>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

pub fn parse_command_name(raw: &str) -> std::result::Result<CommandName, String> {
    CommandName::from_str_ci(raw).ok_or_else(|| {
        format!("unknown command '{raw}' (run `rundeck-cli list` for the available commands)")
    })
}

pub fn execute_exec(args: ExecArgs, cfg: &Config) -> Result<()> {
    let mut provided = parse_arg_pairs(&args.args)?;
    if let Some(path) = &args.args_file {
        load_args_file_into_map(path, &mut provided)?;
    }

    for key in provided.keys() {
        if !args.command.arguments().contains(&key.as_str()) {
            warn!(command = %args.command, argument = %key, "argument not used by this command");
        }
    }

    run_command(args.command, CommandArgs::new(provided), cfg, args.json)
}

/// Build the client, run one command on a fresh runtime and print the result.
pub fn run_command(name: CommandName, args: CommandArgs, cfg: &Config, json: bool) -> Result<()> {
    let client = Client::new(cfg.request_context()?).context("failed to build HTTP client")?;
    let files = LocalFileStore::new(cfg.file_store.clone());

    debug!(command = %name, arguments = ?args.keys().collect::<Vec<_>>(), "dispatching");
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let results = rt.block_on(handlers::dispatch(name, &client, &args, &files))?;
    info!(command = %name, "command finished");

    if json {
        let out = json_output(name, &results);
        println!(
            "{}",
            serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string())
        );
    } else {
        println!("{}", render_results(&results, &StyleOptions::detect()));
    }
    Ok(())
}

pub fn json_output(name: CommandName, results: &CommandResults) -> Value {
    let mut out = json!({
        "status": "ok",
        "command": name.as_str(),
        "title": results.title,
        "key_field": results.outputs_key_field,
        "outputs": results.context_tree(),
    });
    if let (Some(message), Value::Object(map)) = (&results.message, &mut out) {
        map.insert("message".into(), Value::String(message.clone()));
    }
    out
}

/* -------------------------------------------------------------------------- */
/* Argument collection                                                        */
/* -------------------------------------------------------------------------- */

fn parse_arg_pairs(raw: &[String]) -> Result<BTreeMap<String, String>> {
    let mut provided = BTreeMap::new();
    for kv in raw {
        let Some((k, v)) = kv.split_once('=') else {
            bail!("invalid --arg (expected KEY=VALUE): {kv}");
        };
        let key = k.trim();
        if key.is_empty() {
            bail!("invalid --arg (empty key): {kv}");
        }
        provided.insert(key.to_string(), v.trim().to_string());
    }
    Ok(provided)
}

fn load_args_file_into_map(path: &str, provided: &mut BTreeMap<String, String>) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read args file: {path}"))?;
    let lower = path.to_ascii_lowercase();

    let value: Value = if lower.ends_with(".yaml") || lower.ends_with(".yml") {
        let yaml_v: serde_yaml::Value =
            serde_yaml::from_str(&raw).context("failed to parse YAML args file")?;
        serde_json::to_value(yaml_v).context("failed to convert YAML to JSON")?
    } else {
        serde_json::from_str(&raw).context("failed to parse JSON args file")?
    };

    let Value::Object(obj) = value else {
        bail!("args file root must be an object");
    };

    for (k, v) in obj {
        if provided.contains_key(&k) {
            continue;
        }
        // Nested values (e.g. a webhook payload) are passed on as JSON text.
        let s = match v {
            Value::String(sv) => sv,
            Value::Null => continue,
            other => other.to_string(),
        };
        provided.insert(k, s);
    }
    Ok(())
}
