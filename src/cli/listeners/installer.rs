use std::sync::Arc;

use tracing::debug;

use crate::cli::commands::require_env;
use crate::cli::events::{CommandEvent, CommandListener};
use crate::cli::CliResult;
use crate::infrastructure::traits::InstallerFactory;

/// Setting selecting the batched executor.
pub const EXECUTOR_SETTING: &str = "experimental.new-installer";

/// Attaches an installer built from the project to install-aware commands.
///
/// Runs after [`super::EnvironmentListener`]; the command's environment must
/// already be attached.
pub struct InstallerListener {
    factory: Arc<dyn InstallerFactory>,
}

impl InstallerListener {
    pub fn new(factory: Arc<dyn InstallerFactory>) -> Self {
        Self { factory }
    }
}

impl CommandListener for InstallerListener {
    fn name(&self) -> &str {
        "installer wiring"
    }

    fn on_command(&self, event: &mut CommandEvent<'_>) -> CliResult<()> {
        let Some(command) = event.command.as_install_aware() else {
            return Ok(());
        };
        if command.installer().is_some() {
            debug!("installer already attached");
            return Ok(());
        }

        let env = require_env(command.env(), "install-aware command")?.clone();
        let project = event.shell.project()?;
        let config = project.config();
        let mut installer = self.factory.build(
            event.io,
            &env,
            project.package(),
            project.locker(),
            project.pool(),
            config,
        );
        installer.use_executor(config.get_bool(EXECUTOR_SETTING, true));
        command.set_installer(installer);
        Ok(())
    }
}
