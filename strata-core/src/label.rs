//! Labels select packages and/or a target, loosely following bazel labels.
//!
//! ```text
//! //                  every package in the workspace
//! //apps/pkg:target   one package, explicit target
//! //apps/pkg          one package, default target
//! //apps              every package under apps/
//! pkg:target          path relative to the current directory
//! :target             the active package
//! target              the active package
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::package::{Package, LABEL_ROOT};

const SEPARATOR: char = ':';

/// A parsed selector: an optional package path and an optional target name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Label {
    pub package_path: Option<String>,
    pub target_name: Option<String>,
}

impl Label {
    pub fn new(package_path: Option<&str>, target_name: Option<&str>) -> Self {
        Self {
            package_path: package_path.map(str::to_string),
            target_name: target_name.map(str::to_string),
        }
    }

    /// Parses `[[//]path][:target]`.
    ///
    /// A single token without a separator is a package path only when it is
    /// absolute; otherwise it names a target.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLabel`] when the text contains more than one
    /// separator.
    pub fn parse(value: &str) -> Result<Self> {
        let components: Vec<&str> = value.split(SEPARATOR).collect();
        let (package_path, target_name) = match components.as_slice() {
            [item] if Self::is_absolute(item) => (Some(*item), None),
            [item] => (None, Some(*item)),
            [path, target] => (Some(*path), Some(*target)),
            _ => return Err(Error::InvalidLabel(value.to_string())),
        };

        Ok(Self::new(
            package_path.filter(|p| !p.is_empty()),
            target_name.filter(|t| !t.is_empty()),
        ))
    }

    pub fn is_absolute(package_path: &str) -> bool {
        package_path.starts_with(LABEL_ROOT)
    }

    pub fn target(&self) -> Option<Target> {
        self.target_name.as_deref().map(Target::new)
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Label::parse(s)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.package_path.as_deref().unwrap_or(""),
            SEPARATOR,
            self.target_name.as_deref().unwrap_or("")
        )
    }
}

/// The named action invoked on a package, e.g. `test` or `clean`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target(String);

impl Target {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A label resolved against a workspace: the matched packages and the target
/// the label named, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLabel {
    pub packages: Vec<Package>,
    pub target: Option<Target>,
}

impl fmt::Display for ResolvedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let packages: Vec<&str> = self.packages.iter().map(Package::label_path).collect();
        write!(f, "[{}]", packages.join(", "))?;
        if let Some(target) = &self.target {
            write!(f, "{}{}", SEPARATOR, target)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_root() {
        assert_eq!(Label::parse("//").unwrap(), Label::new(Some("//"), None));
    }

    #[test]
    fn parse_full() {
        assert_eq!(
            Label::parse("//tools/app:action").unwrap(),
            Label::new(Some("//tools/app"), Some("action"))
        );
    }

    #[test]
    fn parse_relative_package() {
        assert_eq!(
            Label::parse("app:action").unwrap(),
            Label::new(Some("app"), Some("action"))
        );
    }

    #[test]
    fn parse_only_package() {
        assert_eq!(
            Label::parse("//tools/app").unwrap(),
            Label::new(Some("//tools/app"), None)
        );
        assert_eq!(
            Label::parse("//tools/app:").unwrap(),
            Label::new(Some("//tools/app"), None)
        );
    }

    #[test]
    fn parse_only_target() {
        assert_eq!(Label::parse(":action").unwrap(), Label::new(None, Some("action")));
        assert_eq!(Label::parse("action").unwrap(), Label::new(None, Some("action")));
    }

    #[test]
    fn parse_empty() {
        assert_eq!(Label::parse("").unwrap(), Label::default());
    }

    #[test]
    fn parse_rejects_extra_separators() {
        assert!(matches!(
            Label::parse("//a:b:c"),
            Err(Error::InvalidLabel(_))
        ));
    }

    #[test]
    fn display_round_trips() {
        for text in ["//", "//a/b:t", "a/b:t", ":t", "t", "//a/b", "//a/b:"] {
            let label = Label::parse(text).unwrap();
            let reparsed = Label::parse(&label.to_string()).unwrap();
            assert_eq!(reparsed, label, "round trip of {text}");
        }
    }

    #[test]
    fn display() {
        assert_eq!(
            Label::new(Some("//tools/app"), Some("action")).to_string(),
            "//tools/app:action"
        );
        assert_eq!(Label::new(Some("//tools/app"), None).to_string(), "//tools/app:");
        assert_eq!(Label::new(None, Some("action")).to_string(), ":action");
    }

    #[test]
    fn is_absolute() {
        assert!(Label::is_absolute("//tools/app"));
        assert!(Label::is_absolute("//"));
        assert!(!Label::is_absolute("tools/app"));
    }

    #[test]
    fn target_equality_is_by_name() {
        assert_eq!(Target::new("a"), Target::new("a"));
        assert_ne!(Target::new("a"), Target::new("b"));
        assert_eq!(Target::new("action").to_string(), "action");
    }

    #[test]
    fn resolved_label_display() {
        let resolved = ResolvedLabel {
            packages: vec![Package::new("/repo/package_a", "/repo")],
            target: Some(Target::new("action")),
        };
        assert_eq!(resolved.to_string(), "[//package_a]:action");
    }
}
