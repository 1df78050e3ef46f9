//! Project context: package, lock file, package sources and settings
//!
//! A [`Project`] is what commands and listeners see of the current working
//! directory. It is built once by [`ProjectFactory`] and cached by the shell.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::application::error_ext::{IoResultExt, TomlResultExt};
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{DomainError, LockedPackage, ProjectPackage, Source};
use crate::infrastructure::traits::FileSystem;

pub const PROJECT_FILE: &str = "quill.toml";
pub const LOCK_FILE: &str = "quill.lock";

#[derive(Debug, Deserialize)]
struct ProjectFile {
    package: ProjectPackage,
    #[serde(default)]
    source: Vec<Source>,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct LockFile {
    #[serde(default)]
    package: Vec<LockedPackage>,
}

/// Read access to the project's lock file.
#[derive(Clone)]
pub struct Locker {
    lock_path: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl std::fmt::Debug for Locker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Locker")
            .field("lock_path", &self.lock_path)
            .finish()
    }
}

impl Locker {
    pub fn new(lock_path: PathBuf, fs: Arc<dyn FileSystem>) -> Self {
        Self { lock_path, fs }
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    pub fn is_locked(&self) -> bool {
        self.fs.is_file(&self.lock_path)
    }

    /// Packages pinned by the lock file, in file order.
    pub fn locked_packages(&self) -> ApplicationResult<Vec<LockedPackage>> {
        if !self.is_locked() {
            return Err(ApplicationError::LockFileMissing(self.lock_path.clone()));
        }
        let content = self
            .fs
            .read_to_string(&self.lock_path)
            .with_path_context("read lock file", &self.lock_path)?;
        let lock: LockFile = toml::from_str(&content).with_file(&self.lock_path)?;
        debug!(
            target: "quill::packages::locker",
            "{} locked packages in {}",
            lock.package.len(),
            self.lock_path.display()
        );
        Ok(lock.package)
    }
}

/// Ordered package sources; `default = true` sources come first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryPool {
    sources: Vec<Source>,
}

impl RepositoryPool {
    pub fn new(sources: Vec<Source>) -> Self {
        let (mut defaults, rest): (Vec<_>, Vec<_>) =
            sources.into_iter().partition(|s| s.default);
        defaults.extend(rest);
        Self { sources: defaults }
    }

    pub fn repositories(&self) -> &[Source] {
        &self.sources
    }

    pub fn has_repository(&self, name: &str) -> bool {
        self.sources.iter().any(|s| s.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// The loaded project.
#[derive(Debug, Clone)]
pub struct Project {
    file: PathBuf,
    package: ProjectPackage,
    dependencies: BTreeMap<String, String>,
    locker: Locker,
    pool: RepositoryPool,
    config: Settings,
}

impl Project {
    pub fn new(
        file: PathBuf,
        package: ProjectPackage,
        locker: Locker,
        pool: RepositoryPool,
        config: Settings,
    ) -> Self {
        Self {
            file,
            package,
            dependencies: BTreeMap::new(),
            locker,
            pool,
            config,
        }
    }

    /// Path of `quill.toml`.
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Directory holding `quill.toml`.
    pub fn root(&self) -> &Path {
        self.file.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn package(&self) -> &ProjectPackage {
        &self.package
    }

    pub fn dependencies(&self) -> &BTreeMap<String, String> {
        &self.dependencies
    }

    pub fn locker(&self) -> &Locker {
        &self.locker
    }

    pub fn pool(&self) -> &RepositoryPool {
        &self.pool
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }

    /// Declared package sources, in pool order.
    pub fn sources(&self) -> &[Source] {
        self.pool.repositories()
    }

    /// Check the project definition, returning every problem found.
    pub fn validate(&self) -> Vec<DomainError> {
        let mut errors = Vec::new();
        if let Err(e) = self.package.validate() {
            errors.push(e);
        }
        let mut seen = HashSet::new();
        for source in self.pool.repositories() {
            if !seen.insert(source.name.as_str()) {
                errors.push(DomainError::DuplicateSource(source.name.clone()));
            }
        }
        errors
    }
}

/// Locates and loads `quill.toml`.
pub struct ProjectFactory {
    fs: Arc<dyn FileSystem>,
}

impl ProjectFactory {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Find `quill.toml` in `cwd` or the nearest parent.
    pub fn locate(&self, cwd: &Path) -> ApplicationResult<PathBuf> {
        cwd.ancestors()
            .map(|dir| dir.join(PROJECT_FILE))
            .find(|candidate| self.fs.is_file(candidate))
            .ok_or_else(|| ApplicationError::ProjectNotFound(cwd.to_path_buf()))
    }

    /// Load the project for `cwd`, layering its local settings.
    pub fn create_project(&self, cwd: &Path) -> ApplicationResult<Project> {
        let file = self.locate(cwd)?;
        let root = file.parent().unwrap_or(cwd).to_path_buf();
        let config = Settings::load(Some(&root))?;
        self.create_project_with(file, config)
    }

    /// Load the project file with explicit settings.
    pub fn create_project_with(&self, file: PathBuf, config: Settings) -> ApplicationResult<Project> {
        let content = self
            .fs
            .read_to_string(&file)
            .with_path_context("read project file", &file)?;
        let raw: ProjectFile = toml::from_str(&content).with_file(&file)?;
        debug!(target: "quill::packages::package", "loaded {}", raw.package);

        let root = file.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
        let locker = Locker::new(root.join(LOCK_FILE), Arc::clone(&self.fs));
        if !locker.is_locked() {
            warn!(
                target: "quill::packages::locker",
                "no lock file at {}",
                locker.lock_path().display()
            );
        }

        let mut project = Project::new(
            file,
            raw.package,
            locker,
            RepositoryPool::new(raw.source),
            config,
        );
        project.dependencies = raw.dependencies;
        Ok(project)
    }
}
