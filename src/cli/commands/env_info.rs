use crate::cli::commands::{require_env, Command, CommandContext, EnvAware};
use crate::cli::input::{InputDefinition, InputOption};
use crate::cli::output;
use crate::cli::CliResult;
use crate::domain::{Env, EnvKind};

/// Prints the environment the project's commands run in.
#[derive(Default)]
pub struct EnvInfoCommand {
    env: Option<Env>,
}

impl EnvAware for EnvInfoCommand {
    fn env(&self) -> Option<&Env> {
        self.env.as_ref()
    }

    fn set_env(&mut self, env: Env) {
        self.env = Some(env);
    }
}

impl Command for EnvInfoCommand {
    fn name(&self) -> &str {
        "env info"
    }

    fn description(&self) -> &str {
        "Displays information about the current environment."
    }

    fn definition(&self) -> InputDefinition {
        InputDefinition::new().with_option(InputOption::flag(
            "path",
            Some("p"),
            "Only display the environment's path.",
        ))
    }

    fn execute(&mut self, ctx: &CommandContext<'_>) -> CliResult<i32> {
        let env = require_env(self.env.as_ref(), self.name())?;
        let out = ctx.io.output();

        if ctx.input.flag("path") {
            out.write_line(&env.display_path().display().to_string());
            return Ok(crate::exitcode::OK);
        }

        output::header(out, "Virtualenv");
        let kind = match env.kind {
            EnvKind::Virtual => "virtual",
            EnvKind::System => "system",
        };
        out.write_line(&format!(
            "{}: {}",
            output::info_text(out, "Path"),
            env.display_path().display()
        ));
        out.write_line(&format!("{}: {kind}", output::info_text(out, "Kind")));
        out.write_line(&format!(
            "{}: {}",
            output::info_text(out, "Valid"),
            env.path.is_dir()
        ));
        Ok(crate::exitcode::OK)
    }

    fn as_env_aware(&mut self) -> Option<&mut dyn EnvAware> {
        Some(self)
    }
}
