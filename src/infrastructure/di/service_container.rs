//! Service container for dependency injection
//!
//! Wires up the collaborators the shell and its listeners depend on.

use std::sync::Arc;

use crate::application::installer::LockfileInstallerFactory;
use crate::config::Settings;
use crate::infrastructure::env_manager::VirtualEnvManager;
use crate::infrastructure::traits::{
    CommandRunner, EnvManager, FileSystem, InstallerFactory, RealCommandRunner, RealFileSystem,
};

/// Container holding all application services.
#[derive(Clone)]
pub struct ServiceContainer {
    /// Settings without project-local overrides (plugin discovery runs before
    /// a project is loaded)
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Command runner abstraction
    pub cmd: Arc<dyn CommandRunner>,

    /// Resolves the virtualenv for env-aware commands
    pub env_manager: Arc<dyn EnvManager>,

    /// Builds installers for install-aware commands
    pub installer_factory: Arc<dyn InstallerFactory>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let cmd: Arc<dyn CommandRunner> = Arc::new(RealCommandRunner);
        let env_manager = Arc::new(VirtualEnvManager::new(Arc::clone(&fs), Arc::clone(&cmd)));
        let installer_factory = Arc::new(LockfileInstallerFactory::new(Arc::clone(&cmd)));

        Self::with_deps(settings, fs, cmd, env_manager, installer_factory)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
        env_manager: Arc<dyn EnvManager>,
        installer_factory: Arc<dyn InstallerFactory>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            fs,
            cmd,
            env_manager,
            installer_factory,
        }
    }
}
