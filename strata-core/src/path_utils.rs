//! Shared path utilities for workspace discovery and label resolution.

use std::path::{Component, Path, PathBuf};

/// Walks up from `start` looking for a directory that contains `locate`.
///
/// The search stops after testing `stop` (when given) or the filesystem root.
pub fn locate_upwards(locate: &str, start: &Path, stop: Option<&Path>) -> Option<PathBuf> {
    for dir in start.ancestors() {
        if dir.join(locate).exists() {
            return Some(dir.to_path_buf());
        }
        if stop == Some(dir) {
            break;
        }
    }
    None
}

/// Resolves `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Canonicalizes `path` when it exists, falling back to lexical normalization.
pub fn canonical_or_normalized(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| normalize(path))
}
