//! Package data model.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::BuildManifest;
use crate::error::{Error, Result};
use crate::runtime::{check_duplicates, Runtime, RuntimeRegistry};
use crate::workspace::Workspace;

/// Prefix marking a label path as relative to the workspace root.
pub const LABEL_ROOT: &str = "//";

/// A directory containing a `BUILD.toml`.
///
/// Packages are immutable values recreated by every scan. Equality, ordering
/// and hashing consider the absolute path only.
#[derive(Debug, Clone)]
pub struct Package {
    path: PathBuf,
    name: String,
    label_path: String,
    root: PathBuf,
}

impl Package {
    /// Creates a package at `path` belonging to the workspace rooted at `root`.
    pub fn new(path: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let root = root.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let label_path = label_path_for(&path, &root);
        Self {
            path,
            name,
            label_path,
            root,
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The package directory name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root-relative path with the `//` prefix, e.g. `//team/service`.
    #[inline]
    pub fn label_path(&self) -> &str {
        &self.label_path
    }

    /// Root of the workspace this package was discovered in.
    #[inline]
    pub fn workspace_root(&self) -> &Path {
        &self.root
    }

    pub fn path_exists(&self, relative: impl AsRef<Path>) -> bool {
        self.path.join(relative).exists()
    }

    /// Reads a file inside the package.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPackage`] if the file is missing or unreadable.
    pub fn read_path(&self, relative: impl AsRef<Path>) -> Result<String> {
        let relative = relative.as_ref();
        std::fs::read_to_string(self.path.join(relative)).map_err(|e| Error::InvalidPackage {
            package: self.label_path.clone(),
            message: format!("cannot read {}: {}", relative.display(), e),
        })
    }

    /// Reads and parses a TOML file inside the package.
    pub fn read_toml(&self, relative: impl AsRef<Path>) -> Result<toml::Value> {
        let relative = relative.as_ref();
        let content = self.read_path(relative)?;
        toml::from_str(&content)
            .map_err(|e| Error::toml(e, self.path.join(relative).display().to_string()))
    }

    pub fn build_manifest(&self) -> Result<BuildManifest> {
        BuildManifest::load(&self.path)
    }

    /// Runtimes declared by `package.runtimes` in `BUILD.toml`.
    pub fn runtimes(&self, registry: &RuntimeRegistry) -> Result<Vec<Box<dyn Runtime>>> {
        self.build_manifest()?
            .runtime_labels()?
            .iter()
            .map(|label| registry.resolve(label))
            .collect()
    }

    /// Resolves a filesystem path relative to this package to another package
    /// of the same workspace.
    pub fn relative_package(
        &self,
        workspace: &Workspace,
        relative: impl AsRef<Path>,
    ) -> Result<Package> {
        let joined = self.path.join(relative.as_ref());
        let resolved = joined
            .canonicalize()
            .map_err(|_| Error::PackageNotFound(joined.display().to_string()))?;
        workspace.get_package(&resolved).cloned()
    }

    /// Explicit (`BUILD.toml` `depends_on`) and implicit (runtime-derived)
    /// intra-workspace dependencies.
    ///
    /// Each source must list a package at most once; overlap between sources is
    /// merged.
    pub fn depends_on(&self, workspace: &Workspace) -> Result<Vec<Package>> {
        let manifest = self.build_manifest()?;
        let section = manifest.package()?;

        let explicit = section
            .depends_on
            .iter()
            .map(|label_path| workspace.resolve_label_path(label_path).cloned())
            .collect::<Result<Vec<_>>>()?;
        check_duplicates(self, "depends_on", &explicit)?;

        let mut deps = Vec::with_capacity(explicit.len());
        self.merge_dependencies(&mut deps, explicit, "depends_on");

        for runtime in self.runtimes(workspace.runtimes())? {
            let found = runtime.workspace_dependencies(self, workspace)?;
            let source_name = format!("{} runtime", runtime.label());
            check_duplicates(self, &source_name, &found)?;
            self.merge_dependencies(&mut deps, found, &source_name);
        }

        Ok(deps)
    }

    fn merge_dependencies(&self, deps: &mut Vec<Package>, found: Vec<Package>, source_name: &str) {
        for dep in found {
            if deps.contains(&dep) {
                debug!(
                    package = %self.label_path,
                    dependency = %dep.label_path,
                    source = source_name,
                    "dependency already declared by another source"
                );
            } else {
                deps.push(dep);
            }
        }
    }
}

fn label_path_for(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    format!("{}{}", LABEL_ROOT, parts.join("/"))
}

impl PartialEq for Package {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Package {}

impl Hash for Package {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl PartialOrd for Package {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Package {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path.cmp(&other.path)
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label_path)
    }
}
