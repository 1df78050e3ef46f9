//! Lock-file installer: installs pinned packages into an environment with pip
//!
//! Two strategies, selected by `experimental.new-installer`:
//! - executor: one batched pip invocation for all operations
//! - legacy: one pip invocation per package, stopping at the first failure

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::project::{Locker, RepositoryPool};
use crate::application::ApplicationError;
use crate::config::Settings;
use crate::domain::{Env, LockedPackage, ProjectPackage, Source};
use crate::infrastructure::io::{Io, Verbosity};
use crate::infrastructure::traits::{CommandRunner, Installer, InstallerFactory};
use crate::infrastructure::{InfraError, InfraResult};

pub struct LockfileInstaller {
    env: Env,
    package: ProjectPackage,
    locker: Locker,
    sources: Vec<Source>,
    cmd: Arc<dyn CommandRunner>,
    use_executor: bool,
    dry_run: bool,
}

impl LockfileInstaller {
    pub fn new(
        env: Env,
        package: ProjectPackage,
        locker: Locker,
        pool: &RepositoryPool,
        cmd: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            env,
            package,
            locker,
            sources: pool.repositories().to_vec(),
            cmd,
            use_executor: false,
            dry_run: false,
        }
    }

    /// Index arguments for pip: the first default source replaces the index,
    /// every other source is an extra index.
    fn index_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for (i, source) in self.sources.iter().enumerate() {
            if i == 0 && source.default {
                args.push("--index-url".to_string());
            } else {
                args.push("--extra-index-url".to_string());
            }
            args.push(source.url.clone());
        }
        args
    }

    fn pip(&self, requirements: &[&LockedPackage]) -> InfraResult<()> {
        let python = self.env.bin_dir().join("python");
        let python = python.to_string_lossy();
        let mut args: Vec<String> = vec![
            "-m".into(),
            "pip".into(),
            "install".into(),
            "--no-deps".into(),
        ];
        args.extend(self.index_args());
        args.extend(
            requirements
                .iter()
                .map(|p| format!("{}=={}", p.name, p.version)),
        );

        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        debug!("pip: {} {}", python, arg_refs.join(" "));
        let output = self
            .cmd
            .run(&python, &arg_refs)
            .map_err(|e| InfraError::io(format!("run {python}"), e))?;

        if output.status.success() {
            Ok(())
        } else {
            let code = output.status.code().unwrap_or(crate::exitcode::FAILURE);
            Err(ApplicationError::InstallFailed {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                exit_code: code,
            }
            .into())
        }
    }
}

impl Installer for LockfileInstaller {
    fn use_executor(&mut self, enabled: bool) {
        self.use_executor = enabled;
    }

    fn uses_executor(&self) -> bool {
        self.use_executor
    }

    fn set_dry_run(&mut self, dry_run: bool) {
        self.dry_run = dry_run;
    }

    fn run(&mut self, io: &Io) -> InfraResult<i32> {
        let packages = self.locker.locked_packages()?;
        io.write_line("Installing dependencies from lock file");

        if packages.is_empty() {
            io.write_line("No dependencies to install or update");
            return Ok(crate::exitcode::OK);
        }

        io.write_line(&format!("Package operations: {} installs", packages.len()));
        for package in &packages {
            io.write_line(&format!("  • Installing {package}"));
        }

        if self.dry_run {
            info!("dry run, {} operations skipped", packages.len());
            return Ok(crate::exitcode::OK);
        }

        if self.use_executor {
            debug!("executor: batching {} operations", packages.len());
            let all: Vec<&LockedPackage> = packages.iter().collect();
            self.pip(&all)?;
        } else {
            for package in &packages {
                self.pip(&[package])?;
            }
        }

        io.write_line_at(
            &format!("Installed dependencies of {}", self.package),
            Verbosity::Verbose,
        );
        Ok(crate::exitcode::OK)
    }
}

/// Factory wired into the service container.
pub struct LockfileInstallerFactory {
    cmd: Arc<dyn CommandRunner>,
}

impl LockfileInstallerFactory {
    pub fn new(cmd: Arc<dyn CommandRunner>) -> Self {
        Self { cmd }
    }
}

impl InstallerFactory for LockfileInstallerFactory {
    fn build(
        &self,
        _io: &Io,
        env: &Env,
        package: &ProjectPackage,
        locker: &Locker,
        pool: &RepositoryPool,
        _config: &Settings,
    ) -> Box<dyn Installer> {
        Box::new(LockfileInstaller::new(
            env.clone(),
            package.clone(),
            locker.clone(),
            pool,
            Arc::clone(&self.cmd),
        ))
    }
}
