//! `test` subcommand: connectivity and token check (`test-module`).

use anyhow::Result;
use clap::Args;

use super::command::CommandName;
use super::exec::run_command;
use crate::config::Config;
use crate::handlers::CommandArgs;

#[derive(Args, Debug)]
pub struct TestArgs {
    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute_test(args: TestArgs, cfg: &Config) -> Result<()> {
    run_command(CommandName::TestModule, CommandArgs::default(), cfg, args.json)
}
