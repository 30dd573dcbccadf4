#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use strata_core::Workspace;

pub fn write_workspace(root: &Path) {
    fs::write(root.join("WORKSPACE.toml"), "").unwrap();
}

/// Writes `<root>/<rel>/BUILD.toml` with the given `depends_on` entries.
pub fn write_package(root: &Path, rel: &str, depends_on: &[&str]) -> PathBuf {
    write_package_with(root, rel, depends_on, None)
}

pub fn write_package_with(
    root: &Path,
    rel: &str,
    depends_on: &[&str],
    runtimes: Option<&str>,
) -> PathBuf {
    let dir = root.join(rel);
    fs::create_dir_all(&dir).unwrap();

    let deps = depends_on
        .iter()
        .map(|d| format!("\"{}\"", d))
        .collect::<Vec<_>>()
        .join(", ");
    let runtimes = runtimes
        .map(|r| format!("runtimes = {}\n", r))
        .unwrap_or_default();

    fs::write(
        dir.join("BUILD.toml"),
        format!("[package]\n{}depends_on = [{}]\n", runtimes, deps),
    )
    .unwrap();
    dir
}

/// `package_a -> {package_b, package_c}`, `package_b -> package_c`.
pub fn abc_workspace() -> (TempDir, Workspace) {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_workspace(root);
    write_package(root, "package_a", &["//package_b", "//package_c"]);
    write_package(root, "package_b", &["//package_c"]);
    write_package(root, "package_c", &[]);

    let workspace = Workspace::new(root).unwrap();
    (temp, workspace)
}

pub fn labels<'a>(packages: impl IntoIterator<Item = &'a strata_core::Package>) -> Vec<String> {
    packages
        .into_iter()
        .map(|p| p.label_path().to_string())
        .collect()
}
