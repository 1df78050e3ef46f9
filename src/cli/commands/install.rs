use crate::cli::commands::{Command, CommandContext, EnvAware, InstallAware, Loggable};
use crate::cli::input::{InputDefinition, InputOption};
use crate::cli::{CliError, CliResult};
use crate::domain::Env;
use crate::infrastructure::traits::Installer;

/// Installs the locked dependencies into the project environment.
#[derive(Default)]
pub struct InstallCommand {
    env: Option<Env>,
    installer: Option<Box<dyn Installer>>,
}

impl Loggable for InstallCommand {
    fn loggers(&self) -> Vec<String> {
        vec!["quill::application::installer".to_string()]
    }
}

impl EnvAware for InstallCommand {
    fn env(&self) -> Option<&Env> {
        self.env.as_ref()
    }

    fn set_env(&mut self, env: Env) {
        self.env = Some(env);
    }
}

impl InstallAware for InstallCommand {
    fn installer(&self) -> Option<&dyn Installer> {
        self.installer.as_deref()
    }

    fn set_installer(&mut self, installer: Box<dyn Installer>) {
        self.installer = Some(installer);
    }
}

impl Command for InstallCommand {
    fn name(&self) -> &str {
        "install"
    }

    fn description(&self) -> &str {
        "Installs the project dependencies."
    }

    fn definition(&self) -> InputDefinition {
        InputDefinition::new().with_option(InputOption::flag(
            "dry-run",
            None,
            "Output the operations but do not execute anything.",
        ))
    }

    fn execute(&mut self, ctx: &CommandContext<'_>) -> CliResult<i32> {
        let installer = self
            .installer
            .as_mut()
            .ok_or_else(|| CliError::CommandFailed {
                message: "install: no installer attached".to_string(),
                exit_code: crate::exitcode::SOFTWARE,
            })?;
        installer.set_dry_run(ctx.input.flag("dry-run"));
        Ok(installer.run(ctx.io)?)
    }

    fn as_loggable(&self) -> Option<&dyn Loggable> {
        Some(self)
    }

    fn as_env_aware(&mut self) -> Option<&mut dyn EnvAware> {
        Some(self)
    }

    fn as_install_aware(&mut self) -> Option<&mut dyn InstallAware> {
        Some(self)
    }
}
