//! Workspace discovery, package lookup and label resolution.

use std::fmt;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::config::{WorkspaceConfig, BUILD_TOML, WORKSPACE_TOML};
use crate::error::{Error, Result};
use crate::graph::PackageGraph;
use crate::label::{Label, ResolvedLabel};
use crate::package::{Package, LABEL_ROOT};
use crate::path_utils::{canonical_or_normalized, locate_upwards, normalize};
use crate::runtime::RuntimeRegistry;
use crate::scanner::Scanner;

/// A directory marked by `WORKSPACE.toml` and every package beneath it.
///
/// The package list is scanned on first use and cached for the lifetime of
/// the instance (see [`Workspace::invalidate`]).
pub struct Workspace {
    root: PathBuf,
    config: WorkspaceConfig,
    runtimes: RuntimeRegistry,
    packages: OnceCell<Vec<Package>>,
}

impl Workspace {
    /// Opens the workspace rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().canonicalize()?;
        let config = if root.join(WORKSPACE_TOML).is_file() {
            WorkspaceConfig::load(&root)?
        } else {
            WorkspaceConfig::default()
        };
        Ok(Self {
            root,
            config,
            runtimes: RuntimeRegistry::new(),
            packages: OnceCell::new(),
        })
    }

    /// Walks up from `cwd` to the nearest directory holding `WORKSPACE.toml`.
    pub fn find(cwd: impl AsRef<Path>) -> Result<Option<Self>> {
        Self::find_bounded(cwd, None)
    }

    /// Like [`Workspace::find`], but gives up after testing `stop`.
    pub fn find_bounded(cwd: impl AsRef<Path>, stop: Option<&Path>) -> Result<Option<Self>> {
        let start = canonical_or_normalized(cwd.as_ref());
        match locate_upwards(WORKSPACE_TOML, &start, stop) {
            Some(root) => {
                debug!(root = %root.display(), "found workspace");
                Self::new(root).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Installs the runtimes used to compute implicit dependencies.
    pub fn with_runtimes(mut self, runtimes: RuntimeRegistry) -> Self {
        self.runtimes = runtimes;
        self
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    #[inline]
    pub fn runtimes(&self) -> &RuntimeRegistry {
        &self.runtimes
    }

    /// All packages inside the workspace, sorted by path.
    pub fn packages(&self) -> Result<&[Package]> {
        self.packages
            .get_or_try_init(|| Scanner::new(&self.root).scan())
            .map(Vec::as_slice)
    }

    /// Drops the cached package list so the next call rescans the filesystem.
    pub fn invalidate(&mut self) {
        self.packages.take();
    }

    /// Builds the dependency graph over every package.
    pub fn graph(&self) -> Result<PackageGraph> {
        PackageGraph::build(self)
    }

    /// The package containing `cwd`, if any.
    pub fn active_package(&self, cwd: impl AsRef<Path>) -> Option<Package> {
        let start = canonical_or_normalized(cwd.as_ref());
        if !start.starts_with(&self.root) {
            return None;
        }
        locate_upwards(BUILD_TOML, &start, Some(&self.root))
            .map(|dir| Package::new(dir, &self.root))
    }

    /// The scanned package located exactly at `path`.
    pub fn get_package(&self, path: &Path) -> Result<&Package> {
        self.packages()?
            .iter()
            .find(|package| package.path() == path)
            .ok_or_else(|| Error::PackageNotFound(path.display().to_string()))
    }

    /// Resolves a `depends_on` entry such as `//libs/core` to its package.
    ///
    /// Entries without the `//` prefix are taken relative to the workspace root.
    pub fn resolve_label_path(&self, package_path: &str) -> Result<&Package> {
        let path = self.abspath(package_path, &self.root);
        self.get_package(&path)
            .map_err(|_| Error::PackageNotFound(package_path.to_string()))
    }

    /// Resolves `label` to one or more packages.
    ///
    /// Without a package path the active package at `cwd` is selected. A path
    /// selects the package at that directory and every package beneath it;
    /// relative paths are taken from `cwd`.
    pub fn resolve_label(&self, label: &Label, cwd: impl AsRef<Path>) -> Result<ResolvedLabel> {
        let cwd = cwd.as_ref();
        let packages = match label.package_path.as_deref() {
            None => {
                let active = self.active_package(cwd).ok_or_else(|| {
                    Error::PackageNotFound(
                        "not currently in a package and no package label specified".to_string(),
                    )
                })?;
                vec![active]
            }
            Some(package_path) => {
                let requested = self.abspath(package_path, cwd);
                let matched: Vec<Package> = self
                    .packages()?
                    .iter()
                    .filter(|package| package.path().starts_with(&requested))
                    .cloned()
                    .collect();
                if matched.is_empty() {
                    return Err(Error::PackageNotFound(label.to_string()));
                }
                matched
            }
        };

        debug!(label = %label, matched = packages.len(), "resolved label");
        Ok(ResolvedLabel {
            packages,
            target: label.target(),
        })
    }

    fn abspath(&self, package_path: &str, cwd: &Path) -> PathBuf {
        if Label::is_absolute(package_path) {
            let relative = package_path.trim_start_matches(LABEL_ROOT).trim_start_matches('/');
            normalize(&self.root.join(relative))
        } else {
            normalize(&canonical_or_normalized(cwd).join(package_path))
        }
    }
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("runtimes", &self.runtimes)
            .finish()
    }
}
