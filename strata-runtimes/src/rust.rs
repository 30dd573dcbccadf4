//! Rust runtime reading path dependencies from `Cargo.toml`.

use std::path::Path;

use strata_core::error::Result;
use strata_core::runtime::Runtime;
use strata_core::{Package, Workspace};
use toml::Value;
use tracing::trace;

use crate::sibling_package;

const CARGO_TOML: &str = "Cargo.toml";
const SECTIONS: &[&str] = &["dependencies", "dev-dependencies", "build-dependencies"];

pub struct RustRuntime;

impl Runtime for RustRuntime {
    fn label(&self) -> &'static str {
        "rust"
    }

    fn workspace_dependencies(
        &self,
        package: &Package,
        workspace: &Workspace,
    ) -> Result<Vec<Package>> {
        let manifest = package.read_toml(CARGO_TOML)?;

        let mut deps: Vec<Package> = Vec::new();
        for section in SECTIONS {
            let Some(table) = manifest.get(*section).and_then(Value::as_table) else {
                continue;
            };
            for (name, spec) in table {
                let Some(path) = spec.get("path").and_then(Value::as_str) else {
                    continue;
                };
                if !Path::new(path).is_relative() {
                    continue;
                }
                trace!(package = %package, dependency = %name, path, "cargo path dependency");
                // The same crate often appears in several sections.
                if let Some(dep) = sibling_package(package, workspace, path)? {
                    if !deps.contains(&dep) {
                        deps.push(dep);
                    }
                }
            }
        }
        Ok(deps)
    }
}
