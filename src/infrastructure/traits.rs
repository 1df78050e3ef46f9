//! I/O boundary traits for testability
//!
//! These traits abstract external collaborators (filesystem, processes,
//! environment manager, installer) so the shell can be tested with mocks.

use std::io;
use std::path::Path;
use std::process::Output;

use crate::application::project::{Locker, Project, RepositoryPool};
use crate::config::Settings;
use crate::domain::{Env, ProjectPackage};
use crate::infrastructure::io::Io;
use crate::infrastructure::InfraResult;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// External command runner abstraction.
pub trait CommandRunner: Send + Sync {
    /// Run a command with arguments, capturing its output.
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output>;

    /// Run a command attached to the caller's stdio and return its exit code.
    ///
    /// `vars` are added to (or override) the inherited environment.
    fn run_inherited(
        &self,
        cmd: &str,
        args: &[String],
        vars: &[(String, String)],
    ) -> io::Result<i32>;
}

/// Resolves the execution environment for a project.
pub trait EnvManager: Send + Sync {
    /// Return the project's virtualenv, creating it if needed.
    ///
    /// May fall back to the system environment when creation is disabled.
    fn create_venv(&self, project: &Project, io: &Io) -> InfraResult<Env>;
}

/// A configured installer, attached to install-aware commands.
pub trait Installer: Send {
    /// Select the execution strategy: batched executor or one package at a time.
    fn use_executor(&mut self, enabled: bool);

    fn uses_executor(&self) -> bool;

    /// Report operations without executing them.
    fn set_dry_run(&mut self, dry_run: bool);

    /// Install the locked dependencies, returning the exit code.
    fn run(&mut self, io: &Io) -> InfraResult<i32>;
}

/// Builds installers from the current project context.
pub trait InstallerFactory: Send + Sync {
    fn build(
        &self,
        io: &Io,
        env: &Env,
        package: &ProjectPackage,
        locker: &Locker,
        pool: &RepositoryPool,
        config: &Settings,
    ) -> Box<dyn Installer>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

/// Real command runner implementation.
#[derive(Debug, Default)]
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output> {
        std::process::Command::new(cmd).args(args).output()
    }

    fn run_inherited(
        &self,
        cmd: &str,
        args: &[String],
        vars: &[(String, String)],
    ) -> io::Result<i32> {
        let status = std::process::Command::new(cmd)
            .args(args)
            .envs(vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .status()?;

        Ok(exit_code_of(status))
    }
}

/// Exit code of a finished child; signals map to `128 + signal` on Unix.
fn exit_code_of(status: std::process::ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    crate::exitcode::FAILURE
}
