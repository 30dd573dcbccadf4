//! JavaScript runtime reading `file:` dependencies from `package.json`.
//!
//! See <https://docs.npmjs.com/cli/configuring-npm/package-json#local-paths>.

use serde_json::Value;
use strata_core::error::{Error, Result};
use strata_core::runtime::Runtime;
use strata_core::{Package, Workspace};
use tracing::trace;

use crate::sibling_package;

const PACKAGE_JSON: &str = "package.json";
const FILE_PREFIX: &str = "file:";

pub struct JavascriptRuntime;

impl JavascriptRuntime {
    fn read_package_json(package: &Package) -> Result<Value> {
        let content = package.read_path(PACKAGE_JSON)?;
        serde_json::from_str(&content).map_err(|e| Error::Json {
            message: e.to_string(),
            context: package.path().join(PACKAGE_JSON).display().to_string(),
        })
    }
}

impl Runtime for JavascriptRuntime {
    fn label(&self) -> &'static str {
        "javascript"
    }

    fn workspace_dependencies(
        &self,
        package: &Package,
        workspace: &Workspace,
    ) -> Result<Vec<Package>> {
        let package_json = Self::read_package_json(package)?;

        // devDependencies override dependencies of the same name.
        let mut entries: Vec<(&str, &str)> = Vec::new();
        for section in ["dependencies", "devDependencies"] {
            let Some(table) = package_json.get(section).and_then(Value::as_object) else {
                continue;
            };
            for (name, version) in table {
                let Some(version) = version.as_str() else {
                    continue;
                };
                match entries.iter_mut().find(|(existing, _)| *existing == name.as_str()) {
                    Some(entry) => entry.1 = version,
                    None => entries.push((name.as_str(), version)),
                }
            }
        }

        let mut deps = Vec::new();
        for (name, version) in entries {
            let Some(path) = version.strip_prefix(FILE_PREFIX) else {
                continue;
            };
            trace!(package = %package, dependency = name, path, "javascript file dependency");
            if let Some(dep) = sibling_package(package, workspace, path)? {
                deps.push(dep);
            }
        }
        Ok(deps)
    }
}
