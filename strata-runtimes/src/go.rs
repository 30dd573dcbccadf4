//! Go runtime reading local `replace` directives from `go.mod`.

use regex::Regex;
use strata_core::error::{Error, Result};
use strata_core::runtime::Runtime;
use strata_core::{Package, Workspace};
use tracing::trace;

use crate::sibling_package;

const GO_MOD: &str = "go.mod";

/// Treats `replace module => ../path` (single-line or block form) as a
/// dependency on the workspace package at that path.
pub struct GoRuntime;

impl GoRuntime {
    /// Replacement paths of every `replace` directive that points at a local
    /// directory.
    pub fn local_replacements(go_mod: &str) -> Result<Vec<String>> {
        let directive = Regex::new(r"^(\S+)(?:\s+\S+)?\s*=>\s*(\S+)(?:\s+\S+)?$").map_err(|e| {
            Error::InvalidPackage {
                package: GO_MOD.to_string(),
                message: format!("Failed to create regex: {}", e),
            }
        })?;

        let mut in_block = false;
        let mut replacements = Vec::new();
        for raw in go_mod.lines() {
            let line = strip_comment(raw).trim();

            let body = if in_block {
                if line == ")" {
                    in_block = false;
                    continue;
                }
                line
            } else {
                match replace_body(line) {
                    Some("(") => {
                        in_block = true;
                        continue;
                    }
                    Some(body) => body,
                    None => continue,
                }
            };

            if let Some(caps) = directive.captures(body) {
                let target = &caps[2];
                if target.starts_with("./") || target.starts_with("../") {
                    replacements.push(target.to_string());
                }
            }
        }
        Ok(replacements)
    }
}

/// The text after a `replace` keyword, if `line` is a replace directive.
fn replace_body(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("replace")?;
    if rest.starts_with(char::is_whitespace) || rest.starts_with('(') {
        Some(rest.trim())
    } else {
        None
    }
}

fn strip_comment(line: &str) -> &str {
    line.split_once("//").map_or(line, |(code, _)| code)
}

impl Runtime for GoRuntime {
    fn label(&self) -> &'static str {
        "go"
    }

    fn workspace_dependencies(
        &self,
        package: &Package,
        workspace: &Workspace,
    ) -> Result<Vec<Package>> {
        let go_mod = package.read_path(GO_MOD)?;

        let mut deps = Vec::new();
        for path in Self::local_replacements(&go_mod)? {
            trace!(package = %package, path = %path, "go replace directive");
            if let Some(dep) = sibling_package(package, workspace, &path)? {
                deps.push(dep);
            }
        }
        Ok(deps)
    }
}
