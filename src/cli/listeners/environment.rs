use std::sync::Arc;

use tracing::debug;

use crate::cli::events::{CommandEvent, CommandListener};
use crate::cli::output;
use crate::cli::CliResult;
use crate::infrastructure::traits::EnvManager;

/// Attaches the project environment to env-aware commands.
pub struct EnvironmentListener {
    env_manager: Arc<dyn EnvManager>,
}

impl EnvironmentListener {
    pub fn new(env_manager: Arc<dyn EnvManager>) -> Self {
        Self { env_manager }
    }
}

impl CommandListener for EnvironmentListener {
    fn name(&self) -> &str {
        "environment resolution"
    }

    fn on_command(&self, event: &mut CommandEvent<'_>) -> CliResult<()> {
        let Some(command) = event.command.as_env_aware() else {
            return Ok(());
        };
        if command.env().is_some() {
            debug!("environment already attached");
            return Ok(());
        }

        let project = event.shell.project()?;
        let env = self.env_manager.create_venv(&project, event.io)?;
        if event.io.is_verbose() && env.is_venv() {
            let out = event.io.output();
            out.write_line(&format!(
                "Using virtualenv: {}",
                output::comment_text(out, &env.display_path().display().to_string())
            ));
        }
        command.set_env(env);
        Ok(())
    }
}
