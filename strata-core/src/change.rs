//! Change detection for restricting a run to modified packages.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

use tracing::debug;

use crate::error::{Error, Result};
use crate::package::Package;
use crate::workspace::Workspace;

/// Revision the end of a [`CommitRange`] defaults to.
pub const HEAD: &str = "HEAD";

/// A `from..to` pair of revisions; `to` defaults to `HEAD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRange {
    pub from: String,
    pub to: String,
}

impl CommitRange {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Parses `rev` or `rev1..rev2`.
    pub fn parse(value: &str) -> Self {
        match value.split_once("..") {
            Some((from, to)) if !to.is_empty() => Self::new(from, to),
            Some((from, _)) => Self::new(from, HEAD),
            None => Self::new(value, HEAD),
        }
    }
}

impl FromStr for CommitRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(Error::Vcs("empty commit range".to_string()));
        }
        Ok(Self::parse(s))
    }
}

impl fmt::Display for CommitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.from, self.to)
    }
}

/// Answers which files differ between two revisions.
pub trait Vcs {
    /// Paths relative to `repo_dir` that changed within `range`.
    fn modified_files(&self, repo_dir: &Path, range: &CommitRange) -> Result<Vec<PathBuf>>;
}

/// [`Vcs`] backed by the `git` command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitCli;

impl Vcs for GitCli {
    fn modified_files(&self, repo_dir: &Path, range: &CommitRange) -> Result<Vec<PathBuf>> {
        let output = Command::new("git")
            .arg("diff")
            .arg("--name-only")
            .arg("--relative")
            .arg(&range.from)
            .arg(&range.to)
            .current_dir(repo_dir)
            .output()
            .map_err(|e| Error::Vcs(format!("failed to run git diff: {}", e)))?;

        if !output.status.success() {
            return Err(Error::Vcs(format!(
                "git diff {} failed: {}",
                range,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .map(|line| PathBuf::from(line.trim()))
            .filter(|p| !p.as_os_str().is_empty())
            .collect())
    }
}

/// Maps changed files to the packages that own them.
pub struct ChangeDetector;

impl ChangeDetector {
    /// Packages with at least one file modified within `range`.
    pub fn modified_packages(
        workspace: &Workspace,
        vcs: &dyn Vcs,
        range: &CommitRange,
    ) -> Result<Vec<Package>> {
        let files: Vec<PathBuf> = vcs
            .modified_files(workspace.root(), range)?
            .into_iter()
            .map(|path| workspace.root().join(path))
            .collect();
        let modified = Self::owning_packages(workspace.packages()?, &files);
        debug!(
            range = %range,
            files = files.len(),
            packages = modified.len(),
            "detected modified packages"
        );
        Ok(modified)
    }

    /// Assigns each file to the package with the longest path prefix.
    ///
    /// Files outside every package are ignored. The result keeps the order of
    /// `packages` and has no duplicates.
    pub fn owning_packages(packages: &[Package], files: &[impl AsRef<Path>]) -> Vec<Package> {
        let mut owners: Vec<&Package> = Vec::new();
        for file in files {
            let owner = packages
                .iter()
                .filter(|package| file.as_ref().starts_with(package.path()))
                .max_by_key(|package| package.path().components().count());
            if let Some(owner) = owner {
                if !owners.contains(&owner) {
                    owners.push(owner);
                }
            }
        }

        packages
            .iter()
            .filter(|package| owners.contains(package))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_revision_defaults_to_head() {
        assert_eq!(CommitRange::parse("39fc076"), CommitRange::new("39fc076", "HEAD"));
    }

    #[test]
    fn parse_range() {
        assert_eq!(
            CommitRange::parse("39fc076..6ff72ca"),
            CommitRange::new("39fc076", "6ff72ca")
        );
        assert_eq!(CommitRange::parse("main.."), CommitRange::new("main", "HEAD"));
    }

    #[test]
    fn owning_package_is_longest_prefix() {
        let packages = vec![
            Package::new("/repo/apps", "/repo"),
            Package::new("/repo/apps-web", "/repo"),
            Package::new("/repo/libs/core", "/repo"),
        ];
        let files = [
            PathBuf::from("/repo/libs/core/src/lib.rs"),
            PathBuf::from("/repo/apps-web/index.js"),
            PathBuf::from("/repo/README.md"),
            PathBuf::from("/repo/libs/core/BUILD.toml"),
        ];

        let owners = ChangeDetector::owning_packages(&packages, &files);
        assert_eq!(owners, vec![packages[1].clone(), packages[2].clone()]);
    }
}
