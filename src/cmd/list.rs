/*!
`list.rs`

Implements the `list` subcommand: the commands `exec` accepts, with their
descriptions and argument names. Needs no server configuration.

JSON Output Shape:
{
  "status": "ok",
  "count": 13,
  "commands": [
    { "name": "rundeck-jobs-list", "description": "...", "arguments": ["project_name", ...] }
  ]
}
*/

use anyhow::Result;
use clap::Args;
use serde_json::{Value, json};

use crate::cmd::command::CommandName;
use crate::cmd::format::{Role, StyleOptions, TableOpts, box_header, color, table};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only commands whose name contains this text
    #[arg(value_name = "FILTER")]
    pub filter: Option<String>,

    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,
}

pub fn execute_list(args: ListArgs) -> Result<()> {
    let commands = matching(args.filter.as_deref());

    if args.json {
        println!("{}", list_json(&commands));
        return Ok(());
    }

    let style = StyleOptions::detect();
    println!(
        "{}",
        box_header(
            format!("Commands ({})", commands.len()),
            args.filter.as_deref().map(|f| format!("filter={f}")),
            &style
        )
    );
    if commands.is_empty() {
        println!("{}", color(Role::Dim, "(none)", &style));
        return Ok(());
    }

    let rows: Vec<Vec<String>> = commands
        .iter()
        .map(|c| {
            let arguments = match c.arguments() {
                [] => "-".to_string(),
                names => names.join(", "),
            };
            vec![c.as_str().to_string(), c.description().to_string(), arguments]
        })
        .collect();
    println!(
        "{}",
        table(
            &["NAME", "DESCRIPTION", "ARGUMENTS"],
            &rows,
            TableOpts::default(),
            &style
        )
    );
    println!(
        "\n{}",
        color(
            Role::Dim,
            "Use `rundeck-cli exec <NAME> --arg KEY=VALUE` to run a command",
            &style
        )
    );
    Ok(())
}

fn matching(filter: Option<&str>) -> Vec<CommandName> {
    let needle = filter.map(|f| f.trim().to_ascii_lowercase());
    CommandName::variants()
        .iter()
        .copied()
        .filter(|c| match &needle {
            Some(n) => c.as_str().contains(n.as_str()),
            None => true,
        })
        .collect()
}

fn list_json(commands: &[CommandName]) -> Value {
    let items: Vec<Value> = commands
        .iter()
        .map(|c| {
            json!({
                "name": c.as_str(),
                "description": c.description(),
                "arguments": c.arguments(),
            })
        })
        .collect();
    json!({
        "status": "ok",
        "count": commands.len(),
        "commands": items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        cmd: TestSub,
    }

    #[derive(clap::Subcommand, Debug)]
    enum TestSub {
        List(ListArgs),
    }

    #[test]
    fn clap_parses_list_with_filter() {
        let cli = TestCli::try_parse_from(["t", "list", "job", "--json"]).unwrap();
        let TestSub::List(a) = cli.cmd;
        assert_eq!(a.filter.as_deref(), Some("job"));
        assert!(a.json);
    }

    #[test]
    fn filter_matches_substring() {
        let found = matching(Some("ADHOC"));
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|c| c.as_str().contains("adhoc")));
        assert_eq!(matching(None).len(), CommandName::variants().len());
    }

    #[test]
    fn json_lists_arguments() {
        let v = list_json(&[CommandName::ExecutionAbort]);
        assert_eq!(v["count"], 1);
        assert_eq!(v["commands"][0]["name"], "rundeck-job-execution-abort");
        assert_eq!(v["commands"][0]["arguments"], json!(["execution_id"]));
    }
}
