//! Facts about the workspace as seen from a directory, for `strata info`.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::package::Package;
use crate::workspace::Workspace;

/// Names accepted by [`Info::fact`], in display order.
pub const FACTS: &[&str] = &[
    "workspace_path",
    "active_package",
    "active_package_path",
    "packages",
    "py_project_poetry_name",
];

const PYPROJECT_TOML: &str = "pyproject.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactValue {
    /// The fact does not apply here, e.g. no active package.
    Missing,
    Text(String),
    List(Vec<String>),
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Missing => Ok(()),
            FactValue::Text(text) => f.write_str(text),
            FactValue::List(items) => f.write_str(&items.join("\n")),
        }
    }
}

/// Answers fact queries for a workspace and working directory.
pub struct Info<'a> {
    workspace: &'a Workspace,
    cwd: PathBuf,
}

impl<'a> Info<'a> {
    pub fn new(workspace: &'a Workspace, cwd: impl AsRef<Path>) -> Self {
        Self {
            workspace,
            cwd: cwd.as_ref().to_path_buf(),
        }
    }

    /// Every fact, in [`FACTS`] order.
    pub fn collect(&self) -> Result<Vec<(&'static str, FactValue)>> {
        FACTS
            .iter()
            .map(|&name| self.fact(name).map(|value| (name, value)))
            .collect()
    }

    /// # Errors
    ///
    /// Returns [`Error::UnknownFact`] for names outside [`FACTS`].
    pub fn fact(&self, name: &str) -> Result<FactValue> {
        match name {
            "workspace_path" => Ok(path_value(self.workspace.root())),
            "active_package" => Ok(self
                .active_package()
                .map_or(FactValue::Missing, |p| FactValue::Text(p.label_path().to_string()))),
            "active_package_path" => Ok(self
                .active_package()
                .map_or(FactValue::Missing, |p| path_value(p.path()))),
            "packages" => Ok(FactValue::List(
                self.workspace
                    .packages()?
                    .iter()
                    .map(|p| p.label_path().to_string())
                    .collect(),
            )),
            "py_project_poetry_name" => self.poetry_name(),
            other => Err(Error::UnknownFact(other.to_string())),
        }
    }

    fn active_package(&self) -> Option<Package> {
        self.workspace.active_package(&self.cwd)
    }

    fn poetry_name(&self) -> Result<FactValue> {
        let Some(package) = self.active_package() else {
            return Ok(FactValue::Missing);
        };
        if !package.path_exists(PYPROJECT_TOML) {
            return Ok(FactValue::Missing);
        }

        let pyproject = package.read_toml(PYPROJECT_TOML)?;
        let name = pyproject
            .get("tool")
            .and_then(|tool| tool.get("poetry"))
            .and_then(|poetry| poetry.get("name"))
            .and_then(|name| name.as_str());
        Ok(name.map_or(FactValue::Missing, |name| FactValue::Text(name.to_string())))
    }
}

fn path_value(path: &Path) -> FactValue {
    FactValue::Text(path.display().to_string())
}
