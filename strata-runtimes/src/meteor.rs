//! Meteor runtime: JavaScript dependencies plus local Meteor packages.
//!
//! Local Meteor packages live in the application's `packages/` directory (not
//! to be confused with workspace packages); symlinks there point at other
//! workspace packages.

use std::fs;

use strata_core::error::Result;
use strata_core::runtime::Runtime;
use strata_core::{Package, Workspace};

use crate::javascript::JavascriptRuntime;

const METEOR_PACKAGES_DIR: &str = "packages";

/// Packages using this runtime do not also need to declare `javascript`.
pub struct MeteorRuntime;

impl MeteorRuntime {
    fn linked_packages(package: &Package, workspace: &Workspace) -> Result<Vec<Package>> {
        let dir = package.path().join(METEOR_PACKAGES_DIR);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut links = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_symlink() {
                links.push(entry.path());
            }
        }
        links.sort();

        links
            .iter()
            .map(|link| package.relative_package(workspace, link))
            .collect()
    }
}

impl Runtime for MeteorRuntime {
    fn label(&self) -> &'static str {
        "meteor"
    }

    fn workspace_dependencies(
        &self,
        package: &Package,
        workspace: &Workspace,
    ) -> Result<Vec<Package>> {
        let mut deps = JavascriptRuntime.workspace_dependencies(package, workspace)?;
        for linked in Self::linked_packages(package, workspace)? {
            if !deps.contains(&linked) {
                deps.push(linked);
            }
        }
        Ok(deps)
    }
}
