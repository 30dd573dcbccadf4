//! TOML configuration parsing for `WORKSPACE.toml` and `BUILD.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Marks the root directory of a workspace.
pub const WORKSPACE_TOML: &str = "WORKSPACE.toml";

/// Marks the root directory of a package.
pub const BUILD_TOML: &str = "BUILD.toml";

/// Build tool invoked per package when `WORKSPACE.toml` does not name one.
pub const DEFAULT_BUILD_TOOL: &str = "make";

/// A value that may be written either as a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value.clone()],
            OneOrMany::Many(values) => values.clone(),
        }
    }
}

/// The `[package]` section of a `BUILD.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSection {
    #[serde(default)]
    pub runtimes: Option<OneOrMany>,
    #[serde(default)]
    pub depends_on: Vec<String>,
}

/// Package manifest as defined in `BUILD.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildManifest {
    pub package: Option<PackageSection>,
    #[serde(skip)]
    pub path: PathBuf,
}

impl BuildManifest {
    /// Reads and parses the `BUILD.toml` inside `package_dir`.
    pub fn load(package_dir: &Path) -> Result<Self> {
        let path = package_dir.join(BUILD_TOML);
        let content = std::fs::read_to_string(&path)?;
        let mut manifest: BuildManifest =
            toml::from_str(&content).map_err(|e| Error::toml(e, path.display().to_string()))?;
        manifest.path = path;
        Ok(manifest)
    }

    /// The required `[package]` section.
    pub fn package(&self) -> Result<&PackageSection> {
        self.package.as_ref().ok_or_else(|| Error::InvalidManifest {
            path: self.path.clone(),
            message: "no [package] section".to_string(),
        })
    }

    pub fn runtime_labels(&self) -> Result<Vec<String>> {
        Ok(self
            .package()?
            .runtimes
            .as_ref()
            .map(OneOrMany::to_vec)
            .unwrap_or_default())
    }
}

/// The optional `[workspace]` section of `WORKSPACE.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Program invoked with a target name inside each package directory.
    #[serde(default)]
    pub build_tool: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WorkspaceFile {
    #[serde(default)]
    workspace: WorkspaceConfig,
}

impl WorkspaceConfig {
    /// Reads `WORKSPACE.toml` under `root`. An empty file yields the defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(WORKSPACE_TOML);
        let content = std::fs::read_to_string(&path)?;
        let file: WorkspaceFile =
            toml::from_str(&content).map_err(|e| Error::toml(e, path.display().to_string()))?;
        Ok(file.workspace)
    }

    pub fn build_tool(&self) -> &str {
        self.build_tool.as_deref().unwrap_or(DEFAULT_BUILD_TOOL)
    }
}
