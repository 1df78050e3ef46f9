use std::path::PathBuf;

use crate::cli::commands::{Command, CommandContext};
use crate::cli::input::{InputArgument, InputDefinition};
use crate::cli::{CliError, CliResult};
use crate::infrastructure::InfraError;

/// Command contributed by an executable plugin.
///
/// Registered as a pass-through command: every token after its name reaches
/// the executable verbatim.
pub struct ExternalCommand {
    name: String,
    description: String,
    executable: PathBuf,
}

impl ExternalCommand {
    pub fn new(name: impl Into<String>, executable: impl Into<PathBuf>) -> Self {
        let executable = executable.into();
        let description = format!("Runs the {} plugin.", executable.display());
        Self {
            name: name.into(),
            description,
            executable,
        }
    }
}

impl Command for ExternalCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn definition(&self) -> InputDefinition {
        InputDefinition::new().with_argument(InputArgument::new(
            "args",
            false,
            true,
            "Arguments and options for the plugin.",
        ))
    }

    fn execute(&mut self, ctx: &CommandContext<'_>) -> CliResult<i32> {
        let program = self.executable.to_string_lossy().into_owned();
        let args = ctx.input.argument_list("args");
        ctx.shell
            .services()
            .cmd
            .run_inherited(&program, &args, &[])
            .map_err(|e| InfraError::Process {
                message: format!("{program}: {e}"),
                exit_code: None,
            })
            .map_err(CliError::from)
    }
}
