use tracing::debug;

use crate::cli::commands::{Command, CommandContext};
use crate::cli::output;
use crate::cli::CliResult;

/// Validates `quill.toml` and reports a missing lock file.
pub struct CheckCommand;

impl Command for CheckCommand {
    fn name(&self) -> &str {
        "check"
    }

    fn description(&self) -> &str {
        "Validates the content of the quill.toml file and its consistency with the quill.lock file."
    }

    fn execute(&mut self, ctx: &CommandContext<'_>) -> CliResult<i32> {
        let project = ctx.shell.project()?;
        debug!("checking {}", project.file().display());

        let errors = project.validate();
        let out = ctx.io.output();
        if !project.locker().is_locked() {
            output::warning(
                out,
                &format!("{} does not exist", project.locker().lock_path().display()),
            );
        }
        if errors.is_empty() {
            output::success(out, "All set!");
            return Ok(crate::exitcode::OK);
        }

        output::error(ctx.io.error_output(), "quill.toml is not valid");
        for e in &errors {
            output::failure(ctx.io.error_output(), e);
        }
        Ok(crate::exitcode::FAILURE)
    }
}
