//! Core library for label-driven monorepo builds.
//!
//! A workspace is a directory holding `WORKSPACE.toml`; every directory below
//! it with a `BUILD.toml` is a package. Packages depend on each other
//! explicitly (`depends_on`) or implicitly through their runtimes, and targets
//! are run per package by an external build tool in dependency order.

pub mod change;
pub mod config;
pub mod error;
pub mod executor;
pub mod graph;
pub mod info;
pub mod label;
pub mod package;
pub mod path_utils;
pub mod reporter;
pub mod runner;
pub mod runtime;
pub mod scanner;
pub mod workspace;

pub use change::{ChangeDetector, CommitRange, GitCli, Vcs};
pub use config::{BuildManifest, WorkspaceConfig};
pub use error::{Error, Result};
pub use executor::{
    BuildTool, BuildToolHandler, EchoHandler, Failure, InterruptFlag, Invocation, ProcessPolicy,
    TargetHandler,
};
pub use graph::{Node, PackageGraph};
pub use info::{FactValue, Info};
pub use label::{Label, ResolvedLabel, Target};
pub use package::Package;
pub use reporter::RunReporter;
pub use runner::{LabelRunner, RunOrder, RunReport};
pub use runtime::{Runtime, RuntimeRegistry};
pub use scanner::Scanner;
pub use workspace::Workspace;
