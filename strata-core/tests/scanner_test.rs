mod common;

use std::fs;

use tempfile::TempDir;

use strata_core::scanner::Scanner;

use common::{labels, write_package, write_workspace};

#[test]
fn test_scan_packages_sorted() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().canonicalize().unwrap();
    write_workspace(&root);
    write_package(&root, "services/web", &[]);
    write_package(&root, "libs/core", &[]);
    write_package(&root, "apps", &[]);

    let packages = Scanner::new(&root).scan().unwrap();
    assert_eq!(labels(&packages), vec!["//apps", "//libs/core", "//services/web"]);
}

#[test]
fn test_scan_skips_hidden_directories() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().canonicalize().unwrap();
    write_workspace(&root);
    write_package(&root, "visible", &[]);
    write_package(&root, ".cache/ghost", &[]);
    write_package(&root, "visible_too/.hidden", &[]);

    let packages = Scanner::new(&root).scan().unwrap();
    assert_eq!(labels(&packages), vec!["//visible"]);
}

#[test]
fn test_scan_does_not_descend_into_packages() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().canonicalize().unwrap();
    write_workspace(&root);
    write_package(&root, "outer", &[]);
    write_package(&root, "outer/inner", &[]);

    let packages = Scanner::new(&root).scan().unwrap();
    assert_eq!(labels(&packages), vec!["//outer"]);
}

#[test]
fn test_scan_without_packages_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().canonicalize().unwrap();
    write_workspace(&root);
    fs::create_dir_all(root.join("docs")).unwrap();
    fs::write(root.join("docs/README.md"), "no package here").unwrap();

    let packages = Scanner::new(&root).scan().unwrap();
    assert!(packages.is_empty());
}
