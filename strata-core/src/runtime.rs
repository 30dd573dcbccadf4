//! Runtime trait for discovering implicit intra-workspace dependencies, and the
//! registry that maps runtime labels to implementations.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::{Error, Result};
use crate::package::Package;
use crate::workspace::Workspace;

/// An ecosystem-specific strategy for finding the packages a package depends
/// on through its own manifests (`pyproject.toml`, `package.json`, ...).
///
/// Runtimes only read declared dependency fields. They never install anything.
pub trait Runtime: Send + Sync {
    /// The unique label used in `BUILD.toml` to select this runtime.
    fn label(&self) -> &'static str;

    /// Packages in `workspace` that `package` implicitly depends upon.
    fn workspace_dependencies(&self, package: &Package, workspace: &Workspace)
        -> Result<Vec<Package>>;
}

type RuntimeFactory = Box<dyn Fn() -> Box<dyn Runtime> + Send + Sync>;

/// Explicit table of runtime factories keyed by label.
///
/// Populated once at startup and read-only afterwards.
#[derive(Default)]
pub struct RuntimeRegistry {
    factories: BTreeMap<String, RuntimeFactory>,
}

impl RuntimeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a runtime factory under `label`, replacing any previous entry.
    pub fn register<F>(&mut self, label: &str, factory: F)
    where
        F: Fn() -> Box<dyn Runtime> + Send + Sync + 'static,
    {
        self.factories.insert(label.to_string(), Box::new(factory));
    }

    /// Builder-style variant of [`RuntimeRegistry::register`].
    pub fn with<F>(mut self, label: &str, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Runtime> + Send + Sync + 'static,
    {
        self.register(label, factory);
        self
    }

    /// Instantiates the runtime registered as `label`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RuntimeNotFound`] for an unregistered label.
    pub fn resolve(&self, label: &str) -> Result<Box<dyn Runtime>> {
        self.factories
            .get(label)
            .map(|factory| factory())
            .ok_or_else(|| Error::RuntimeNotFound(label.to_string()))
    }

    pub fn labels(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

impl fmt::Debug for RuntimeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeRegistry")
            .field("labels", &self.labels())
            .finish()
    }
}

/// Fails when one dependency source names the same package more than once.
pub fn check_duplicates(package: &Package, source_name: &str, deps: &[Package]) -> Result<()> {
    let mut seen = HashSet::new();
    let mut duplicates: Vec<&str> = Vec::new();
    for dep in deps {
        if !seen.insert(dep) && !duplicates.contains(&dep.label_path()) {
            duplicates.push(dep.label_path());
        }
    }

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(Error::DuplicateDependency {
            package: package.label_path().to_string(),
            source_name: source_name.to_string(),
            duplicates: duplicates.join(", "),
        })
    }
}
