//! Ecosystem runtimes that discover implicit intra-workspace dependencies from
//! each package's own manifests.

pub mod docker;
pub mod go;
pub mod javascript;
pub mod meteor;
pub mod python;
pub mod rust;

pub use docker::DockerRuntime;
pub use go::GoRuntime;
pub use javascript::JavascriptRuntime;
pub use meteor::MeteorRuntime;
pub use python::PythonRuntime;
pub use rust::RustRuntime;

use std::path::Path;

use strata_core::error::Result;
use strata_core::path_utils::normalize;
use strata_core::runtime::RuntimeRegistry;
use strata_core::{Package, Workspace};

/// Registry with every built-in runtime.
pub fn registry() -> RuntimeRegistry {
    RuntimeRegistry::new()
        .with("docker", || Box::new(DockerRuntime))
        .with("go", || Box::new(GoRuntime))
        .with("javascript", || Box::new(JavascriptRuntime))
        .with("meteor", || Box::new(MeteorRuntime))
        .with("python", || Box::new(PythonRuntime))
        .with("rust", || Box::new(RustRuntime))
}

/// Resolves a manifest path relative to `package` to another workspace package.
///
/// Paths that stay inside `package` itself (e.g. a sub-crate or a nested Go
/// module) are not dependencies and yield `None`.
pub(crate) fn sibling_package(
    package: &Package,
    workspace: &Workspace,
    relative: &str,
) -> Result<Option<Package>> {
    let joined = normalize(&package.path().join(Path::new(relative)));
    if joined.starts_with(package.path()) {
        return Ok(None);
    }
    package.relative_package(workspace, relative).map(Some)
}
