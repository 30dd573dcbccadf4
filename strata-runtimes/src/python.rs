//! Python runtime reading Poetry path dependencies from `pyproject.toml`.

use strata_core::error::Result;
use strata_core::runtime::Runtime;
use strata_core::{Package, Workspace};
use toml::Value;
use tracing::trace;

use crate::sibling_package;

const PYPROJECT_TOML: &str = "pyproject.toml";

/// Finds dependencies declared as `{ path = "../other" }` in
/// `tool.poetry.dependencies`, `tool.poetry.dev-dependencies` and every
/// `tool.poetry.group.<name>.dependencies`.
pub struct PythonRuntime;

impl PythonRuntime {
    /// Every dependency entry, later sections overriding earlier ones by name.
    fn dependency_entries(pyproject: &Value) -> Vec<(&str, &Value)> {
        let Some(poetry) = pyproject.get("tool").and_then(|t| t.get("poetry")) else {
            return Vec::new();
        };

        let mut sections: Vec<&Value> = ["dependencies", "dev-dependencies"]
            .iter()
            .filter_map(|name| poetry.get(*name))
            .collect();
        if let Some(groups) = poetry.get("group").and_then(Value::as_table) {
            sections.extend(groups.values().filter_map(|g| g.get("dependencies")));
        }

        let mut entries: Vec<(&str, &Value)> = Vec::new();
        for table in sections.iter().filter_map(|s| s.as_table()) {
            for (name, spec) in table {
                match entries.iter_mut().find(|(existing, _)| *existing == name.as_str()) {
                    Some(entry) => entry.1 = spec,
                    None => entries.push((name.as_str(), spec)),
                }
            }
        }
        entries
    }

    /// The `path` of a dependency that points at a parent directory.
    fn local_path(spec: &Value) -> Option<&str> {
        spec.get("path")
            .and_then(Value::as_str)
            .filter(|path| path.starts_with(".."))
    }
}

impl Runtime for PythonRuntime {
    fn label(&self) -> &'static str {
        "python"
    }

    fn workspace_dependencies(
        &self,
        package: &Package,
        workspace: &Workspace,
    ) -> Result<Vec<Package>> {
        let pyproject = package.read_toml(PYPROJECT_TOML)?;

        let mut deps = Vec::new();
        for (name, spec) in Self::dependency_entries(&pyproject) {
            let Some(path) = Self::local_path(spec) else {
                continue;
            };
            trace!(package = %package, dependency = name, path, "python path dependency");
            if let Some(dep) = sibling_package(package, workspace, path)? {
                deps.push(dep);
            }
        }
        Ok(deps)
    }
}
