use strata_core::error::Result;
use strata_core::runtime::Runtime;
use strata_core::{Package, Workspace};

/// Docker images declare their workspace dependencies explicitly through
/// `depends_on`; nothing is inferred from the `Dockerfile`.
pub struct DockerRuntime;

impl Runtime for DockerRuntime {
    fn label(&self) -> &'static str {
        "docker"
    }

    fn workspace_dependencies(
        &self,
        _package: &Package,
        _workspace: &Workspace,
    ) -> Result<Vec<Package>> {
        Ok(Vec::new())
    }
}
