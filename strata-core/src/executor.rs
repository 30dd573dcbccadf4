//! Per-package target execution through the external build tool.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::WorkspaceConfig;
use crate::error::Result;
use crate::label::Target;
use crate::package::Package;
use crate::reporter::RunReporter;

/// Exit code the build tool uses for a dry run of an unknown target.
pub const MISSING_TARGET_EXIT_CODE: i32 = 2;

/// Marker the build tool writes to stderr for an unknown target.
pub const MISSING_TARGET_MARKER: &str = "No rule to make target";

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Outcome of handling one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Succeeded,
    /// The package does not define the target.
    Skipped,
    Failed(Failure),
}

/// A build tool process that exited unsuccessfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub package: Package,
    pub command: String,
    pub status: Option<i32>,
}

/// Runs a target for a single package.
///
/// `Err` is reserved for conditions that must abort the whole run (the tool
/// cannot be spawned, broken configuration). A process exiting unsuccessfully
/// is reported as [`Invocation::Failed`].
pub trait TargetHandler {
    fn handle(&self, package: &Package, target: &Target) -> Result<Invocation>;
}

/// Display label for a package and target, e.g. `//libs/core:test`.
pub fn target_label(package: &Package, target: &Target) -> String {
    format!("{}:{}", package.label_path(), target)
}

/// Counts interrupt requests (ctrl-c) observed by the process.
///
/// Cloning shares the counter, so the signal handler and the waiting loop can
/// each hold one.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicUsize>);

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// How the build tool process is attached to the terminal.
#[derive(Debug, Clone)]
pub enum ProcessPolicy {
    /// Inherit stdio, skipping packages without the target.
    Streamed,
    /// Buffer stdout/stderr and only surface them on failure, skipping packages
    /// without the target.
    CaptureErrors,
    /// Inherit stdio and forward every interrupt to the child instead of
    /// stopping. No dry-run gate.
    PassInterrupt(InterruptFlag),
}

/// The external target-based command runner (`make` by default).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTool {
    program: String,
}

impl BuildTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn from_config(config: &WorkspaceConfig) -> Self {
        Self::new(config.build_tool())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// The command line run for `target`, as shown to users.
    pub fn command_line(&self, target: &Target) -> String {
        format!("{} -s {}", self.program, target)
    }

    fn command(&self, package: &Package, target: &Target) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-s").arg(target.name()).current_dir(package.path());
        cmd
    }

    /// Dry-runs `target` to find out whether the package defines it.
    pub fn target_exists(&self, package: &Package, target: &Target) -> Result<bool> {
        let output = Command::new(&self.program)
            .arg("-n")
            .arg(target.name())
            .current_dir(package.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .output()?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        Ok(!is_missing_target(output.status.code(), &stderr))
    }
}

impl Default for BuildTool {
    fn default() -> Self {
        Self::from_config(&WorkspaceConfig::default())
    }
}

/// Whether a dry run's exit code and stderr mean "no such target".
pub fn is_missing_target(code: Option<i32>, stderr: &str) -> bool {
    code == Some(MISSING_TARGET_EXIT_CODE) && stderr.contains(MISSING_TARGET_MARKER)
}

/// Runs the target through a [`BuildTool`] following a [`ProcessPolicy`].
pub struct BuildToolHandler {
    tool: BuildTool,
    policy: ProcessPolicy,
    reporter: Arc<dyn RunReporter>,
}

impl BuildToolHandler {
    pub fn new(tool: BuildTool, policy: ProcessPolicy, reporter: Arc<dyn RunReporter>) -> Self {
        Self {
            tool,
            policy,
            reporter,
        }
    }

    fn run_streamed(&self, package: &Package, target: &Target) -> Result<ExitStatus> {
        Ok(self.tool.command(package, target).status()?)
    }

    fn run_captured(&self, package: &Package, target: &Target, label: &str) -> Result<ExitStatus> {
        // stdout and stderr share one pipe so the buffer keeps write order.
        let (mut reader, writer) = io::pipe()?;
        let mut child = {
            let mut cmd = self.tool.command(package, target);
            cmd.stdin(Stdio::null())
                .stdout(writer.try_clone()?)
                .stderr(writer);
            cmd.spawn()?
        };

        let mut captured = Vec::new();
        reader.read_to_end(&mut captured)?;
        let status = child.wait()?;
        if !status.success() {
            self.reporter.output(label, &String::from_utf8_lossy(&captured));
        }
        Ok(status)
    }

    fn run_passing_interrupts(
        &self,
        package: &Package,
        target: &Target,
        interrupts: &InterruptFlag,
    ) -> Result<(ExitStatus, bool)> {
        let mut child = self.tool.command(package, target).spawn()?;
        let mut seen = interrupts.count();
        let mut forwarded = false;

        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }

            let current = interrupts.count();
            if current != seen {
                seen = current;
                forwarded = true;
                info!(package = %package, pid = child.id(), "forwarding interrupt");
                forward_interrupt(&child)?;
            }
            thread::sleep(POLL_INTERVAL);
        };

        Ok((status, forwarded))
    }
}

impl TargetHandler for BuildToolHandler {
    fn handle(&self, package: &Package, target: &Target) -> Result<Invocation> {
        let gated = !matches!(self.policy, ProcessPolicy::PassInterrupt(_));
        if gated && !self.tool.target_exists(package, target)? {
            debug!(package = %package, target = %target, "target not defined, skipping");
            return Ok(Invocation::Skipped);
        }

        let label = target_label(package, target);
        self.reporter.started(&label);
        let start = Instant::now();

        let (status, success) = match &self.policy {
            ProcessPolicy::Streamed => {
                let status = self.run_streamed(package, target)?;
                (status, status.success())
            }
            ProcessPolicy::CaptureErrors => {
                let status = self.run_captured(package, target, &label)?;
                (status, status.success())
            }
            ProcessPolicy::PassInterrupt(interrupts) => {
                let (status, forwarded) =
                    self.run_passing_interrupts(package, target, interrupts)?;
                // Stopping on a forwarded interrupt is how the user asked to quit.
                (status, status.success() || (forwarded && stopped_by_interrupt(&status)))
            }
        };

        self.reporter.finished(&label, start.elapsed(), success);

        if success {
            Ok(Invocation::Succeeded)
        } else {
            Ok(Invocation::Failed(Failure {
                package: package.clone(),
                command: self.tool.command_line(target),
                status: status.code(),
            }))
        }
    }
}

/// Reports the package and target without running anything.
pub struct EchoHandler {
    reporter: Arc<dyn RunReporter>,
}

impl EchoHandler {
    pub fn new(reporter: Arc<dyn RunReporter>) -> Self {
        Self { reporter }
    }
}

impl TargetHandler for EchoHandler {
    fn handle(&self, package: &Package, target: &Target) -> Result<Invocation> {
        self.reporter.started(&target_label(package, target));
        Ok(Invocation::Succeeded)
    }
}

#[cfg(unix)]
fn forward_interrupt(child: &Child) -> Result<()> {
    // SAFETY: kill(2) has no memory-safety preconditions.
    let rc = unsafe { libc::kill(child.id() as libc::pid_t, libc::SIGINT) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        // The child may have exited between try_wait and kill.
        if err.raw_os_error() != Some(libc::ESRCH) {
            return Err(err.into());
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn forward_interrupt(child: &Child) -> Result<()> {
    debug!(pid = child.id(), "interrupt forwarding is not supported on this platform");
    Ok(())
}

#[cfg(unix)]
fn stopped_by_interrupt(status: &ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    status.signal() == Some(libc::SIGINT)
}

#[cfg(not(unix))]
fn stopped_by_interrupt(_status: &ExitStatus) -> bool {
    false
}
