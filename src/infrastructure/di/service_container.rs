//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{ImportService, LintService, PublishService};
use crate::config::Settings;
use crate::infrastructure::traits::{
    CommandRunner, EnvReader, FileSystem, ProcessEnv, RealCommandRunner, RealFileSystem,
};

/// Container holding settings and the I/O boundaries services are built from.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Command runner abstraction
    pub cmd: Arc<dyn CommandRunner>,

    /// Environment variable lookup
    pub env: Arc<dyn EnvReader>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(RealCommandRunner),
            Arc::new(ProcessEnv),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
        env: Arc<dyn EnvReader>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            cmd,
            env,
        }
    }

    pub fn lint_service(&self) -> LintService {
        LintService::new(self.fs.clone(), self.cmd.clone(), self.settings.clone())
    }

    pub fn publish_service(&self) -> PublishService {
        PublishService::new(self.cmd.clone(), self.env.clone(), self.settings.clone())
    }

    pub fn import_service(&self) -> ImportService {
        ImportService::new(self.fs.clone(), self.settings.clone())
    }
}
