//! Label execution: resolve, filter, expand, order, then run a target in every
//! selected package.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::change::{ChangeDetector, CommitRange, GitCli, Vcs};
use crate::error::{Error, Result};
use crate::executor::{Failure, Invocation, TargetHandler};
use crate::graph::PackageGraph;
use crate::label::{Label, Target};
use crate::package::Package;
use crate::workspace::Workspace;

/// Order in which selected packages are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunOrder {
    /// Resolution order, no graph needed.
    #[default]
    Unordered,
    /// Dependencies before dependents.
    Ordered,
    /// Dependents before dependencies.
    Reversed,
}

/// Outcome of a whole run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub succeeded: Vec<Package>,
    pub skipped: Vec<Package>,
    pub failures: Vec<Failure>,
}

impl RunReport {
    fn record(&mut self, package: &Package, invocation: Invocation) {
        match invocation {
            Invocation::Succeeded => self.succeeded.push(package.clone()),
            Invocation::Skipped => self.skipped.push(package.clone()),
            Invocation::Failed(failure) => {
                warn!(
                    package = %failure.package,
                    command = %failure.command,
                    status = ?failure.status,
                    "target failed"
                );
                self.failures.push(failure);
            }
        }
    }

    /// Turns the first failure, if any, into [`Error::ProcessFailure`].
    pub fn into_result(self) -> Result<Self> {
        match self.failures.first() {
            None => Ok(self),
            Some(first) => Err(Error::ProcessFailure {
                package: first.package.label_path().to_string(),
                command: first.command.clone(),
                status: first.status,
                others: self.failures.len() - 1,
            }),
        }
    }
}

/// Sorts `packages` by their position in the dependency order of `graph`.
///
/// Packages absent from the graph keep their relative order at the end.
pub fn package_order(
    packages: Vec<Package>,
    graph: &PackageGraph,
    run_order: RunOrder,
) -> Result<Vec<Package>> {
    let ordering = match run_order {
        RunOrder::Unordered => return Ok(packages),
        RunOrder::Ordered => graph.order()?,
        RunOrder::Reversed => graph.invert().order()?,
    };

    let position: HashMap<&Package, usize> = ordering
        .iter()
        .enumerate()
        .map(|(index, package)| (package, index))
        .collect();

    let mut packages = packages;
    packages.sort_by_key(|package| position.get(package).copied().unwrap_or(usize::MAX));
    Ok(packages)
}

/// Runs a target over the packages a label selects.
pub struct LabelRunner<'a> {
    workspace: &'a Workspace,
    handler: &'a dyn TargetHandler,
    default_target: Option<Target>,
    run_order: RunOrder,
    with_ancestors: bool,
    with_descendants: bool,
    modified_since: Option<CommitRange>,
    vcs: Box<dyn Vcs + 'a>,
}

impl<'a> LabelRunner<'a> {
    pub fn new(workspace: &'a Workspace, handler: &'a dyn TargetHandler) -> Self {
        Self {
            workspace,
            handler,
            default_target: None,
            run_order: RunOrder::default(),
            with_ancestors: false,
            with_descendants: false,
            modified_since: None,
            vcs: Box::new(GitCli),
        }
    }

    /// Target used when the label does not name one.
    pub fn with_default_target(mut self, target: Option<Target>) -> Self {
        self.default_target = target;
        self
    }

    pub fn with_run_order(mut self, run_order: RunOrder) -> Self {
        self.run_order = run_order;
        self
    }

    pub fn with_ancestors(mut self, enabled: bool) -> Self {
        self.with_ancestors = enabled;
        self
    }

    pub fn with_descendants(mut self, enabled: bool) -> Self {
        self.with_descendants = enabled;
        self
    }

    /// Restricts the selection to packages with files modified in `range`.
    pub fn with_modified_since(mut self, range: Option<CommitRange>) -> Self {
        self.modified_since = range;
        self
    }

    pub fn with_vcs(mut self, vcs: impl Vcs + 'a) -> Self {
        self.vcs = Box::new(vcs);
        self
    }

    /// Parses `label`, resolves it from `cwd` and runs the target.
    ///
    /// Every selected package is attempted even after a failure. The first
    /// failure is then returned as [`Error::ProcessFailure`].
    pub fn run(&self, label: &str, cwd: impl AsRef<Path>) -> Result<RunReport> {
        let parsed = Label::parse(label)?;
        let resolved = self.workspace.resolve_label(&parsed, cwd)?;
        let target = resolved
            .target
            .or_else(|| self.default_target.clone())
            .ok_or_else(|| Error::MissingTarget(label.to_string()))?;

        let packages = self.select(resolved.packages)?;
        info!(
            target = %target,
            packages = packages.len(),
            order = ?self.run_order,
            "running target"
        );

        let mut report = RunReport::default();
        for package in &packages {
            let invocation = self.handler.handle(package, &target)?;
            report.record(package, invocation);
        }
        report.into_result()
    }

    /// Applies the change filter, expansion and ordering to `packages`.
    pub fn select(&self, packages: Vec<Package>) -> Result<Vec<Package>> {
        let packages = match &self.modified_since {
            Some(range) => {
                let modified =
                    ChangeDetector::modified_packages(self.workspace, self.vcs.as_ref(), range)?;
                let kept: Vec<Package> = packages
                    .into_iter()
                    .filter(|package| modified.contains(package))
                    .collect();
                debug!(range = %range, kept = kept.len(), "filtered by modification");
                kept
            }
            None => packages,
        };

        let expanding = self.with_ancestors || self.with_descendants;
        if !expanding && self.run_order == RunOrder::Unordered {
            return Ok(packages);
        }

        let graph = self.workspace.graph()?;
        let packages = if expanding {
            graph.expand(&packages, self.with_ancestors, self.with_descendants)
        } else {
            packages
        };
        package_order(packages, &graph, self.run_order)
    }
}
