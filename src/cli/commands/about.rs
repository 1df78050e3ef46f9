use crate::cli::commands::{Command, CommandContext};
use crate::cli::output;
use crate::cli::CliResult;

pub struct AboutCommand;

impl Command for AboutCommand {
    fn name(&self) -> &str {
        "about"
    }

    fn description(&self) -> &str {
        "Shows information about quill."
    }

    fn execute(&mut self, ctx: &CommandContext<'_>) -> CliResult<i32> {
        let out = ctx.io.output();
        out.write_line(&format!(
            "{} - Package and project manager shell",
            output::info_text(out, "Quill")
        ));
        out.write_line("");
        out.write_line(&format!("Version: {}", ctx.shell.version()));
        out.write_line(&output::comment_text(
            out,
            "Plugins add commands from the plugins directory.",
        ));
        Ok(crate::exitcode::OK)
    }
}
