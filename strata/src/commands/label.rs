//! Commands that run a target over the packages a label selects.

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use strata_core::{
    BuildTool, BuildToolHandler, CommitRange, EchoHandler, InterruptFlag, LabelRunner,
    ProcessPolicy, RunOrder, RunReporter, Target, TargetHandler,
};
use tracing::debug;

use super::current_workspace;
use super::run_reporter::CliRunReporter;

/// Options shared by every label command.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Also run the target in every package the selection depends on.
    #[arg(long, action)]
    pub with_ancestors: bool,

    /// Also run the target in every package depending on the selection.
    #[arg(long, action)]
    pub with_descendants: bool,

    /// Only keep packages with files modified in `rev` or `rev1..rev2`.
    #[arg(long, value_name = "RANGE")]
    pub modified_since: Option<String>,
}

/// How the output of `test` reaches the terminal.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestOutput {
    /// Show output as it is produced.
    Streamed,
    /// Only show the output of failing packages.
    Errors,
}

/// How a label command treats its label and packages.
struct LabelCommand {
    default_target: Option<&'static str>,
    run_order: RunOrder,
}

impl LabelCommand {
    fn execute<F>(&self, label: &str, selection: &SelectionArgs, make_handler: F) -> Result<()>
    where
        F: FnOnce(BuildTool) -> Box<dyn TargetHandler>,
    {
        let workspace = current_workspace()?;
        let cwd = env::current_dir()?;
        let modified_since = selection
            .modified_since
            .as_deref()
            .map(str::parse::<CommitRange>)
            .transpose()?;
        let handler = make_handler(BuildTool::from_config(workspace.config()));

        let report = LabelRunner::new(&workspace, handler.as_ref())
            .with_default_target(self.default_target.map(Target::new))
            .with_run_order(self.run_order)
            .with_ancestors(selection.with_ancestors)
            .with_descendants(selection.with_descendants)
            .with_modified_since(modified_since)
            .run(label, &cwd)?;

        debug!(
            succeeded = report.succeeded.len(),
            skipped = report.skipped.len(),
            "run complete"
        );
        Ok(())
    }
}

fn reporter() -> Arc<dyn RunReporter> {
    Arc::new(CliRunReporter)
}

pub fn cmd_test(label: String, selection: SelectionArgs, output: TestOutput) -> Result<()> {
    let policy = match output {
        TestOutput::Streamed => ProcessPolicy::Streamed,
        TestOutput::Errors => ProcessPolicy::CaptureErrors,
    };

    LabelCommand {
        default_target: Some("test"),
        run_order: RunOrder::Ordered,
    }
    .execute(&label, &selection, |tool| {
        Box::new(BuildToolHandler::new(tool, policy, reporter()))
    })
}

pub fn cmd_run(label: String, selection: SelectionArgs) -> Result<()> {
    let interrupts = InterruptFlag::new();
    let flag = interrupts.clone();
    ctrlc::set_handler(move || flag.trigger()).context("Failed to install ctrl-c handler")?;

    LabelCommand {
        default_target: None,
        run_order: RunOrder::Ordered,
    }
    .execute(&label, &selection, |tool| {
        Box::new(BuildToolHandler::new(
            tool,
            ProcessPolicy::PassInterrupt(interrupts),
            reporter(),
        ))
    })
}

pub fn cmd_clean(label: String, selection: SelectionArgs) -> Result<()> {
    LabelCommand {
        default_target: Some("clean"),
        run_order: RunOrder::Reversed,
    }
    .execute(&label, &selection, |tool| {
        Box::new(BuildToolHandler::new(tool, ProcessPolicy::Streamed, reporter()))
    })
}

pub fn cmd_format(label: String, selection: SelectionArgs) -> Result<()> {
    LabelCommand {
        default_target: Some("format"),
        run_order: RunOrder::Unordered,
    }
    .execute(&label, &selection, |tool| {
        Box::new(BuildToolHandler::new(tool, ProcessPolicy::Streamed, reporter()))
    })
}

pub fn cmd_echo(label: String, selection: SelectionArgs) -> Result<()> {
    LabelCommand {
        default_target: Some("echo"),
        run_order: RunOrder::Ordered,
    }
    .execute(&label, &selection, |_| Box::new(EchoHandler::new(reporter())))
}
