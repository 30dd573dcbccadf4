mod common;

use std::fs;

use strata_core::info::{FactValue, Info, FACTS};
use strata_core::Error;

use common::abc_workspace;

#[test]
fn test_facts_from_inside_a_package() {
    let (_temp, workspace) = abc_workspace();
    let package_dir = workspace.root().join("package_a");
    fs::write(
        package_dir.join("pyproject.toml"),
        "[tool.poetry]\nname = \"package-a\"\nversion = \"0.1.0\"\n",
    )
    .unwrap();

    let info = Info::new(&workspace, &package_dir);
    assert_eq!(
        info.fact("workspace_path").unwrap(),
        FactValue::Text(workspace.root().display().to_string())
    );
    assert_eq!(
        info.fact("active_package").unwrap(),
        FactValue::Text("//package_a".to_string())
    );
    assert_eq!(
        info.fact("active_package_path").unwrap(),
        FactValue::Text(package_dir.display().to_string())
    );
    assert_eq!(
        info.fact("py_project_poetry_name").unwrap(),
        FactValue::Text("package-a".to_string())
    );
}

#[test]
fn test_facts_from_workspace_root() {
    let (_temp, workspace) = abc_workspace();
    let info = Info::new(&workspace, workspace.root());

    assert_eq!(info.fact("active_package").unwrap(), FactValue::Missing);
    assert_eq!(info.fact("py_project_poetry_name").unwrap(), FactValue::Missing);
    assert_eq!(
        info.fact("packages").unwrap(),
        FactValue::List(vec![
            "//package_a".to_string(),
            "//package_b".to_string(),
            "//package_c".to_string(),
        ])
    );
}

#[test]
fn test_collect_lists_every_fact() {
    let (_temp, workspace) = abc_workspace();
    let facts = Info::new(&workspace, workspace.root()).collect().unwrap();

    let names: Vec<&str> = facts.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, FACTS);
}

#[test]
fn test_unknown_fact() {
    let (_temp, workspace) = abc_workspace();
    let info = Info::new(&workspace, workspace.root());

    match info.fact("favourite_colour") {
        Err(Error::UnknownFact(name)) => assert_eq!(name, "favourite_colour"),
        other => panic!("expected unknown fact, got {:?}", other),
    }
}
