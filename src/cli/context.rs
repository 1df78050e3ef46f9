//! Shell-wide context: services, settings and the lazily loaded project

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::application::{ApplicationResult, Project, ProjectFactory};
use crate::config::Settings;
use crate::infrastructure::di::ServiceContainer;

type ProjectLoader = Box<dyn Fn() -> ApplicationResult<Project> + Send + Sync>;

/// Lazily loaded project, cached until [`ProjectContext::reset`].
pub struct ProjectContext {
    loader: ProjectLoader,
    cached: Mutex<Option<Arc<Project>>>,
}

impl std::fmt::Debug for ProjectContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectContext")
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}

impl ProjectContext {
    pub fn new(loader: impl Fn() -> ApplicationResult<Project> + Send + Sync + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            cached: Mutex::new(None),
        }
    }

    /// Project found by walking up from `cwd`.
    pub fn for_directory(cwd: impl Into<PathBuf>, services: &ServiceContainer) -> Self {
        let cwd = cwd.into();
        let factory = ProjectFactory::new(Arc::clone(&services.fs));
        Self::new(move || factory.create_project(&cwd))
    }

    /// The project, loading it on first access.
    ///
    /// Failed loads are not cached.
    pub fn project(&self) -> ApplicationResult<Arc<Project>> {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(project) = cached.as_ref() {
            return Ok(Arc::clone(project));
        }
        let project = Arc::new((self.loader)()?);
        debug!("project loaded from {}", project.file().display());
        *cached = Some(Arc::clone(&project));
        Ok(project)
    }

    pub fn is_loaded(&self) -> bool {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Drop the cached project; the next access reloads it.
    pub fn reset(&self) {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

/// What commands and listeners can reach besides their own input.
pub struct ShellContext {
    name: String,
    version: String,
    services: ServiceContainer,
    project: ProjectContext,
}

impl ShellContext {
    pub fn new(services: ServiceContainer, project: ProjectContext) -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            services,
            project,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn services(&self) -> &ServiceContainer {
        &self.services
    }

    /// Global settings (no project-local layer).
    pub fn settings(&self) -> &Settings {
        &self.services.settings
    }

    pub fn project(&self) -> ApplicationResult<Arc<Project>> {
        self.project.project()
    }

    pub fn project_context(&self) -> &ProjectContext {
        &self.project
    }

    /// Settings of the current project when there is one, global otherwise.
    pub fn effective_settings(&self) -> Settings {
        match self.project() {
            Ok(project) => project.config().clone(),
            Err(_) => self.settings().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::application::project::{Locker, RepositoryPool};
    use crate::application::ApplicationError;
    use crate::domain::ProjectPackage;
    use crate::infrastructure::traits::RealFileSystem;

    fn counting_context(loads: Arc<AtomicUsize>) -> ProjectContext {
        ProjectContext::new(move || {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(Project::new(
                Path::new("/srv/demo/quill.toml").to_path_buf(),
                ProjectPackage {
                    name: "demo".into(),
                    version: "0.1.0".into(),
                    description: None,
                },
                Locker::new("/srv/demo/quill.lock".into(), Arc::new(RealFileSystem)),
                RepositoryPool::default(),
                Settings::default(),
            ))
        })
    }

    #[test]
    fn given_repeated_access_when_project_then_same_instance() {
        let loads = Arc::new(AtomicUsize::new(0));
        let context = counting_context(Arc::clone(&loads));

        let first = context.project().unwrap();
        let second = context.project().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn given_reset_when_project_then_reloaded() {
        let loads = Arc::new(AtomicUsize::new(0));
        let context = counting_context(Arc::clone(&loads));
        let first = context.project().unwrap();

        context.reset();
        let second = context.project().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn given_failing_loader_when_project_then_error_not_cached() {
        let context =
            ProjectContext::new(|| Err(ApplicationError::ProjectNotFound("/nowhere".into())));

        assert!(context.project().is_err());
        assert!(!context.is_loaded());
    }
}
