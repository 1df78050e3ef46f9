use tracing::debug;

use crate::cli::commands::{require_env, Command, CommandContext, EnvAware};
use crate::cli::input::{InputArgument, InputDefinition};
use crate::cli::{CliError, CliResult};
use crate::domain::Env;
use crate::infrastructure::InfraError;

/// Runs a command line inside the project environment.
///
/// Everything after `run` reaches the child untouched; the child's exit code
/// becomes quill's.
#[derive(Default)]
pub struct RunCommand {
    env: Option<Env>,
}

impl EnvAware for RunCommand {
    fn env(&self) -> Option<&Env> {
        self.env.as_ref()
    }

    fn set_env(&mut self, env: Env) {
        self.env = Some(env);
    }
}

impl Command for RunCommand {
    fn name(&self) -> &str {
        "run"
    }

    fn description(&self) -> &str {
        "Runs a command in the appropriate environment."
    }

    fn definition(&self) -> InputDefinition {
        InputDefinition::new().with_argument(InputArgument::new(
            "args",
            true,
            true,
            "The command and arguments/options to run.",
        ))
    }

    fn execute(&mut self, ctx: &CommandContext<'_>) -> CliResult<i32> {
        let env = require_env(self.env.as_ref(), self.name())?;
        let args = ctx.input.argument_list("args");
        let Some((program, rest)) = args.split_first() else {
            return Err(CliError::CommandFailed {
                message: "run: no command given".to_string(),
                exit_code: crate::exitcode::USAGE,
            });
        };

        let local = env.bin_dir().join(program);
        let program = if local.is_file() {
            local.to_string_lossy().into_owned()
        } else {
            program.clone()
        };
        let current_path = std::env::var("PATH").ok();
        let vars = env.process_vars(current_path.as_deref());
        debug!("run: {program} {rest:?} in {}", env.display_path().display());

        ctx.shell
            .services()
            .cmd
            .run_inherited(&program, rest, &vars)
            .map_err(|e| InfraError::Process {
                message: format!("{program}: {e}"),
                exit_code: Some(crate::exitcode::NOINPUT),
            })
            .map_err(CliError::from)
    }

    fn as_env_aware(&mut self) -> Option<&mut dyn EnvAware> {
        Some(self)
    }
}
