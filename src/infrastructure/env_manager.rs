//! Virtualenv resolution for projects
//!
//! Resolution order:
//! 1. An activated virtualenv (`VIRTUAL_ENV`)
//! 2. An in-project `.venv`
//! 3. The cached env `<virtualenvs.path>/<package>-py`
//! 4. Create one (in-project or cached), unless `virtualenvs.create` is off,
//!    in which case the system environment is used.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::application::Project;
use crate::domain::Env;
use crate::infrastructure::io::Io;
use crate::infrastructure::traits::{CommandRunner, EnvManager, FileSystem};
use crate::infrastructure::{InfraError, InfraResult};

const PYTHON: &str = "python3";

pub struct VirtualEnvManager {
    fs: Arc<dyn FileSystem>,
    cmd: Arc<dyn CommandRunner>,
    active_venv: Option<PathBuf>,
}

impl VirtualEnvManager {
    /// Manager honouring the caller's `VIRTUAL_ENV`.
    pub fn new(fs: Arc<dyn FileSystem>, cmd: Arc<dyn CommandRunner>) -> Self {
        let active_venv = std::env::var_os("VIRTUAL_ENV").map(PathBuf::from);
        Self::with_active(fs, cmd, active_venv)
    }

    pub fn with_active(
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
        active_venv: Option<PathBuf>,
    ) -> Self {
        Self {
            fs,
            cmd,
            active_venv,
        }
    }

    fn cached_path(project: &Project) -> PathBuf {
        project
            .config()
            .virtualenvs
            .path
            .join(format!("{}-py", project.package().name))
    }

    fn system_env(&self) -> Env {
        let prefix = self
            .cmd
            .run(PYTHON, &["-c", "import sys; print(sys.prefix)"])
            .ok()
            .filter(|out| out.status.success())
            .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "/usr".to_string());
        Env::system(prefix)
    }
}

impl EnvManager for VirtualEnvManager {
    fn create_venv(&self, project: &Project, io: &Io) -> InfraResult<Env> {
        if let Some(active) = &self.active_venv {
            if self.fs.is_dir(active) {
                debug!("using activated virtualenv {}", active.display());
                return Ok(Env::virtual_env(active.clone()));
            }
        }

        let in_project = project.root().join(".venv");
        if self.fs.is_dir(&in_project) {
            return Ok(Env::virtual_env(in_project));
        }

        let cached = Self::cached_path(project);
        if self.fs.is_dir(&cached) {
            return Ok(Env::virtual_env(cached));
        }

        let settings = &project.config().virtualenvs;
        if !settings.create {
            debug!("virtualenv creation disabled, using system env");
            return Ok(self.system_env());
        }

        let target = if settings.in_project { in_project } else { cached };
        if let Some(parent) = target.parent() {
            self.fs
                .create_dir_all(parent)
                .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
        }

        io.write_error_line(&format!(
            "Creating virtualenv {} in {}",
            project.package().name,
            target.display()
        ));
        let target_str = target.to_string_lossy().into_owned();
        let output = self
            .cmd
            .run(PYTHON, &["-m", "venv", &target_str])
            .map_err(|e| InfraError::EnvCreation {
                message: format!("{PYTHON}: {e}"),
            })?;
        if !output.status.success() {
            return Err(InfraError::EnvCreation {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(Env::virtual_env(target))
    }
}
