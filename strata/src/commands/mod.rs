//! Command implementations for the CLI.

mod info;
mod label;
mod run_reporter;

use std::env;

use anyhow::Result;
use strata_core::{Error, Workspace};

pub use info::cmd_info;
pub use label::{cmd_clean, cmd_echo, cmd_format, cmd_run, cmd_test, SelectionArgs, TestOutput};

/// The workspace enclosing the current directory, with every built-in runtime.
fn current_workspace() -> Result<Workspace> {
    let cwd = env::current_dir()?;
    let workspace = Workspace::find(&cwd)?.ok_or(Error::WorkspaceNotFound(cwd))?;
    Ok(workspace.with_runtimes(strata_runtimes::registry()))
}
