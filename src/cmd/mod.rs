/*!
Subcommand modules.

  command.rs : CommandName (names accepted by `exec`)
  exec.rs    : ExecArgs + execute_exec (runs one command)
  list.rs    : ListArgs + execute_list (available commands)
  check.rs   : TestArgs + execute_test (connectivity check)
  format.rs  : box / table rendering for human output

Each subcommand module exposes one public `execute_*` function returning
`anyhow::Result<()>`.
*/

pub mod check;
pub mod command;
pub mod exec;
pub mod format;
pub mod list;

pub use check::{TestArgs, execute_test};
pub use exec::{ExecArgs, execute_exec};
pub use list::{ListArgs, execute_list};
