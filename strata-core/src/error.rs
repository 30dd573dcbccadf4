//! Error types and result aliases.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error in {context}: {error}")]
    Toml {
        error: toml::de::Error,
        context: String,
    },

    #[error("JSON parse error in {context}: {message}")]
    Json { message: String, context: String },

    #[error("Not in a workspace (no WORKSPACE.toml found above {0})")]
    WorkspaceNotFound(PathBuf),

    #[error("Package not found: {0}")]
    PackageNotFound(String),

    #[error("No runtime defined for label={0}")]
    RuntimeNotFound(String),

    #[error("Dependencies listed multiple times in {source_name} of {package}: {duplicates}")]
    DuplicateDependency {
        package: String,
        source_name: String,
        duplicates: String,
    },

    #[error("Invalid manifest {path}: {message}")]
    InvalidManifest { path: PathBuf, message: String },

    #[error("Invalid package {package}: {message}")]
    InvalidPackage { package: String, message: String },

    #[error("Circular dependency detected involving: {0}")]
    CycleDetected(String),

    #[error("Invalid label '{0}': expected [[//]path][:target]")]
    InvalidLabel(String),

    #[error("No target given for label '{0}' and the command has no default target")]
    MissingTarget(String),

    #[error("Command '{command}' failed in {package}{}", others_suffix(*.others))]
    ProcessFailure {
        package: String,
        command: String,
        status: Option<i32>,
        others: usize,
    },

    #[error("{0} is not a valid fact")]
    UnknownFact(String),

    #[error("Version control error: {0}")]
    Vcs(String),
}

fn others_suffix(others: usize) -> String {
    match others {
        0 => String::new(),
        1 => " (1 more package failed)".to_string(),
        n => format!(" ({} more packages failed)", n),
    }
}

impl Error {
    pub fn toml(error: toml::de::Error, context: impl Into<String>) -> Self {
        Error::Toml {
            error,
            context: context.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
