//! Workspace scanner for discovering packages.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

use crate::config::BUILD_TOML;
use crate::error::Result;
use crate::package::Package;

/// Scans a workspace root for packages.
///
/// A directory holding a `BUILD.toml` is a package boundary: it is recorded and
/// never descended into, so packages do not nest. Hidden directories are
/// skipped and symlinked directories are not followed.
pub struct Scanner {
    root: PathBuf,
}

impl Scanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Returns every package under the root, sorted by path.
    pub fn scan(&self) -> Result<Vec<Package>> {
        let mut packages = Vec::new();
        let mut walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

        while let Some(entry) = walker.next() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_dir() {
                continue;
            }

            if entry.path().join(BUILD_TOML).is_file() {
                let package = Package::new(entry.path(), &self.root);
                trace!(package = %package, "found package");
                packages.push(package);
                walker.skip_current_dir();
            }
        }

        packages.sort();
        debug!(root = %self.root.display(), count = packages.len(), "scanned workspace");
        Ok(packages)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
