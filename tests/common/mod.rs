//! Recording test doubles shared by the integration tests
#![allow(dead_code)]

use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use quill::application::project::{Locker, Project, ProjectFactory, RepositoryPool, PROJECT_FILE};
use quill::cli::application::Application;
use quill::cli::commands::{Command, CommandContext};
use quill::cli::context::ProjectContext;
use quill::cli::plugins::{ApplicationPlugin, PluginDiscovery};
use quill::cli::CliResult;
use quill::config::Settings;
use quill::domain::{Env, ProjectPackage};
use quill::infrastructure::di::ServiceContainer;
use quill::infrastructure::io::Io;
use quill::infrastructure::traits::{
    CommandRunner, EnvManager, Installer, InstallerFactory, RealFileSystem,
};
use quill::infrastructure::{InfraError, InfraResult};

// ============================================================
// Project fixtures
// ============================================================

/// Project directory with `quill.toml` and, when `locked` is given, `quill.lock`.
pub fn project_dir(locked: Option<&[(&str, &str)]>) -> TempDir {
    let temp = TempDir::new().expect("create temp dir");
    std::fs::write(
        temp.path().join(PROJECT_FILE),
        "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n",
    )
    .expect("write project file");
    if let Some(packages) = locked {
        let lock: String = packages
            .iter()
            .map(|(name, version)| {
                format!("[[package]]\nname = \"{name}\"\nversion = \"{version}\"\n\n")
            })
            .collect();
        std::fs::write(temp.path().join("quill.lock"), lock).expect("write lock file");
    }
    temp
}

/// Project context loading `dir` with `settings` instead of the user's config.
pub fn project_context(dir: &Path, settings: Settings) -> ProjectContext {
    let dir = dir.to_path_buf();
    ProjectContext::new(move || {
        let factory = ProjectFactory::new(Arc::new(RealFileSystem));
        let file = factory.locate(&dir)?;
        factory.create_project_with(file, settings.clone())
    })
}

// ============================================================
// Command runner
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRun {
    pub cmd: String,
    pub args: Vec<String>,
    pub inherited: bool,
}

/// Records every invocation and answers with a fixed exit code.
pub struct RecordingRunner {
    pub runs: Mutex<Vec<RecordedRun>>,
    exit_code: i32,
}

impl RecordingRunner {
    pub fn new(exit_code: i32) -> Self {
        Self {
            runs: Mutex::new(Vec::new()),
            exit_code,
        }
    }

    pub fn runs(&self) -> Vec<RecordedRun> {
        self.runs.lock().unwrap().clone()
    }
}

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

impl CommandRunner for RecordingRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output> {
        self.runs.lock().unwrap().push(RecordedRun {
            cmd: cmd.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            inherited: false,
        });
        Ok(Output {
            status: exit_status(self.exit_code),
            stdout: Vec::new(),
            stderr: if self.exit_code == 0 {
                Vec::new()
            } else {
                b"resolution impossible".to_vec()
            },
        })
    }

    fn run_inherited(
        &self,
        cmd: &str,
        args: &[String],
        _vars: &[(String, String)],
    ) -> io::Result<i32> {
        self.runs.lock().unwrap().push(RecordedRun {
            cmd: cmd.to_string(),
            args: args.to_vec(),
            inherited: true,
        });
        Ok(self.exit_code)
    }
}

// ============================================================
// Environment manager
// ============================================================

/// Hands out a virtualenv below the project root, or fails when told to.
#[derive(Default)]
pub struct RecordingEnvManager {
    pub calls: Mutex<Vec<PathBuf>>,
    pub fail: bool,
}

impl RecordingEnvManager {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl EnvManager for RecordingEnvManager {
    fn create_venv(&self, project: &Project, _io: &Io) -> InfraResult<Env> {
        self.calls.lock().unwrap().push(project.root().to_path_buf());
        if self.fail {
            return Err(InfraError::EnvCreation {
                message: "python3 not found".to_string(),
            });
        }
        Ok(Env::virtual_env(project.root().join(".venv")))
    }
}

// ============================================================
// Installer
// ============================================================

/// What the shell did with the installers it was handed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InstallLog {
    pub builds: usize,
    pub use_executor: Option<bool>,
    pub dry_run: Option<bool>,
    pub runs: usize,
}

pub struct RecordingInstaller {
    log: Arc<Mutex<InstallLog>>,
    use_executor: bool,
}

impl Installer for RecordingInstaller {
    fn use_executor(&mut self, enabled: bool) {
        self.use_executor = enabled;
        self.log.lock().unwrap().use_executor = Some(enabled);
    }

    fn uses_executor(&self) -> bool {
        self.use_executor
    }

    fn set_dry_run(&mut self, dry_run: bool) {
        self.log.lock().unwrap().dry_run = Some(dry_run);
    }

    fn run(&mut self, io: &Io) -> InfraResult<i32> {
        self.log.lock().unwrap().runs += 1;
        io.write_line("Installing dependencies from lock file");
        Ok(0)
    }
}

#[derive(Default)]
pub struct RecordingInstallerFactory {
    pub log: Arc<Mutex<InstallLog>>,
}

impl RecordingInstallerFactory {
    pub fn log(&self) -> InstallLog {
        self.log.lock().unwrap().clone()
    }
}

impl InstallerFactory for RecordingInstallerFactory {
    fn build(
        &self,
        _io: &Io,
        _env: &Env,
        _package: &ProjectPackage,
        _locker: &Locker,
        _pool: &RepositoryPool,
        _config: &Settings,
    ) -> Box<dyn Installer> {
        self.log.lock().unwrap().builds += 1;
        Box::new(RecordingInstaller {
            log: Arc::clone(&self.log),
            use_executor: false,
        })
    }
}

// ============================================================
// Plugins
// ============================================================

/// Command contributed by [`GreetPlugin`].
pub struct GreetCommand;

impl Command for GreetCommand {
    fn name(&self) -> &str {
        "greet"
    }

    fn description(&self) -> &str {
        "Says hello."
    }

    fn execute(&mut self, ctx: &CommandContext<'_>) -> CliResult<i32> {
        ctx.io.write_line("hello from a plugin");
        Ok(0)
    }
}

pub struct GreetPlugin;

impl ApplicationPlugin for GreetPlugin {
    fn name(&self) -> &str {
        "greet"
    }

    fn activate(&self, application: &mut Application) -> CliResult<()> {
        application.command_loader_mut().register("greet", || {
            let command: Box<dyn Command> = Box::new(GreetCommand);
            Ok(command)
        });
        Ok(())
    }
}

/// Discovery returning [`GreetPlugin`], counting how often it is asked.
#[derive(Default)]
pub struct CountingDiscovery {
    pub calls: Arc<AtomicUsize>,
}

impl CountingDiscovery {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PluginDiscovery for CountingDiscovery {
    fn discover(&self, _namespace: &str) -> CliResult<Vec<Box<dyn ApplicationPlugin>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![Box::new(GreetPlugin)])
    }
}

// ============================================================
// Shell
// ============================================================

/// Mocks wired into one application.
pub struct Harness {
    pub app: Application,
    pub runner: Arc<RecordingRunner>,
    pub env_manager: Arc<RecordingEnvManager>,
    pub installers: Arc<RecordingInstallerFactory>,
    pub discovery: Arc<CountingDiscovery>,
    pub stdout: quill::infrastructure::io::BufferedOutput,
    pub stderr: quill::infrastructure::io::BufferedOutput,
    pub dir: TempDir,
}

impl Harness {
    pub fn new(dir: TempDir) -> Self {
        Self::with(dir, Settings::default(), RecordingEnvManager::default(), 0)
    }

    pub fn with(
        dir: TempDir,
        settings: Settings,
        env_manager: RecordingEnvManager,
        runner_exit_code: i32,
    ) -> Self {
        let runner = Arc::new(RecordingRunner::new(runner_exit_code));
        let env_manager = Arc::new(env_manager);
        let installers = Arc::new(RecordingInstallerFactory::default());
        let discovery = Arc::new(CountingDiscovery::default());
        let services = ServiceContainer::with_deps(
            settings.clone(),
            Arc::new(RealFileSystem),
            runner.clone(),
            env_manager.clone(),
            installers.clone(),
        );
        let (io, stdout, stderr) = Io::buffered();
        let app = Application::new(services, project_context(dir.path(), settings))
            .with_io(io)
            .with_plugin_discovery(discovery.clone());

        Self {
            app,
            runner,
            env_manager,
            installers,
            discovery,
            stdout,
            stderr,
            dir,
        }
    }

    pub fn run(&mut self, args: &[&str]) -> i32 {
        let argv = std::iter::once("quill").chain(args.iter().copied());
        self.app.run(argv)
    }
}
