use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn write_package(root: &Path, rel: &str, depends_on: &[&str]) -> PathBuf {
    let dir = root.join(rel);
    fs::create_dir_all(&dir).unwrap();
    let deps = depends_on
        .iter()
        .map(|d| format!("\"{}\"", d))
        .collect::<Vec<_>>()
        .join(", ");
    fs::write(
        dir.join("BUILD.toml"),
        format!("[package]\ndepends_on = [{}]\n", deps),
    )
    .unwrap();
    dir
}

/// `package_a -> {package_b, package_c}`, `package_b -> package_c`.
fn create_workspace(workspace_toml: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(root.join("WORKSPACE.toml"), workspace_toml).unwrap();
    write_package(root, "package_a", &["//package_b", "//package_c"]);
    write_package(root, "package_b", &["//package_c"]);
    write_package(root, "package_c", &[]);
    temp
}

fn strata(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_strata"))
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("Failed to execute strata")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("{:?} not found in {:?}", needle, haystack))
}

#[test]
fn test_echo_orders_dependencies_first() {
    let temp = create_workspace("");
    let output = strata(temp.path(), &["echo", "//"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(position(&out, "//package_c:echo") < position(&out, "//package_b:echo"));
    assert!(position(&out, "//package_b:echo") < position(&out, "//package_a:echo"));
}

#[test]
fn test_echo_active_package_with_ancestors() {
    let temp = create_workspace("");
    let output = strata(
        &temp.path().join("package_b"),
        &["echo", ":build", "--with-ancestors"],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(position(&out, "//package_c:build") < position(&out, "//package_b:build"));
    assert!(!out.contains("//package_a"));
}

#[test]
fn test_outside_workspace_fails() {
    let temp = TempDir::new().unwrap();
    let output = strata(temp.path(), &["echo", "//"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Not in a workspace"));
}

#[test]
fn test_invalid_label_fails() {
    let temp = create_workspace("");
    let output = strata(temp.path(), &["echo", "//a:b:c"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid label"));
}

#[test]
fn test_run_requires_a_target() {
    let temp = create_workspace("");
    let output = strata(temp.path(), &["run", "//package_c"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("No target given"));
}

#[test]
fn test_info_single_fact() {
    let temp = create_workspace("");
    let output = strata(&temp.path().join("package_a"), &["info", "active_package"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "//package_a");
}

#[test]
fn test_info_unknown_fact() {
    let temp = create_workspace("");
    let output = strata(temp.path(), &["info", "nonsense"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("nonsense is not a valid fact"));
}

#[cfg(unix)]
mod with_build_tool {
    use std::os::unix::fs::PermissionsExt;

    use super::*;

    /// Records `<package dir name>:<target>` for every real run into `calls.log`
    /// next to the workspace root; a target exists when `targets/<name>` does.
    const FAKE_TOOL: &str = r#"#!/bin/sh
mode="$1"
target="$2"
if [ ! -f "targets/$target" ]; then
  echo "fake-make: *** No rule to make target '$target'.  Stop." >&2
  exit 2
fi
if [ "$mode" = "-n" ]; then
  exit 0
fi
echo "$(basename "$PWD"):$target" >> ../calls.log
exec sh "targets/$target"
"#;

    fn create_workspace_with_tool() -> TempDir {
        let temp = create_workspace("");
        let tool = temp.path().join("fake-make");
        fs::write(&tool, FAKE_TOOL).unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();
        fs::write(
            temp.path().join("WORKSPACE.toml"),
            format!("[workspace]\nbuild_tool = \"{}\"\n", tool.display()),
        )
        .unwrap();
        temp
    }

    fn define(root: &Path, package: &str, target: &str, script: &str) {
        let dir = root.join(package).join("targets");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(target), script).unwrap();
    }

    fn calls(root: &Path) -> Vec<String> {
        fs::read_to_string(root.join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_runs_in_dependency_order_and_skips_missing_targets() {
        let temp = create_workspace_with_tool();
        let root = temp.path();
        define(root, "package_a", "test", "exit 0\n");
        define(root, "package_c", "test", "exit 0\n");

        let output = strata(root, &["test", "//"]);

        assert!(output.status.success(), "stderr: {}", stderr(&output));
        assert_eq!(calls(root), vec!["package_c:test", "package_a:test"]);
        assert!(!stdout(&output).contains("//package_b"));
    }

    #[test]
    fn test_clean_attempts_every_package_and_reports_first_failure() {
        let temp = create_workspace_with_tool();
        let root = temp.path();
        for package in ["package_a", "package_b", "package_c"] {
            define(root, package, "clean", "exit 0\n");
        }
        define(root, "package_a", "clean", "exit 1\n");
        define(root, "package_b", "clean", "exit 1\n");

        let output = strata(root, &["clean", "//"]);

        assert_eq!(output.status.code(), Some(1));
        assert_eq!(
            calls(root),
            vec!["package_a:clean", "package_b:clean", "package_c:clean"]
        );
        let err = stderr(&output);
        assert!(err.contains("//package_a"));
        assert!(err.contains("1 more package failed"));
    }

    #[test]
    fn test_errors_output_only_shows_failures() {
        let temp = create_workspace_with_tool();
        let root = temp.path();
        define(root, "package_b", "test", "echo quiet-success\n");
        define(root, "package_c", "test", "echo loud-failure\nexit 4\n");

        let output = strata(root, &["test", "//", "--test_output=errors"]);

        assert_eq!(output.status.code(), Some(1));
        let out = stdout(&output);
        assert!(out.contains("loud-failure"));
        assert!(!out.contains("quiet-success"));
    }
}
