use crate::cli::commands::{Command, CommandContext};
use crate::cli::input::{InputArgument, InputDefinition, InputOption};
use crate::cli::{CliError, CliResult};

/// Shows resolved settings: one key, or all of them.
pub struct ConfigCommand;

impl Command for ConfigCommand {
    fn name(&self) -> &str {
        "config"
    }

    fn description(&self) -> &str {
        "Shows the quill configuration."
    }

    fn definition(&self) -> InputDefinition {
        InputDefinition::new()
            .with_argument(InputArgument::new("key", false, false, "Setting key."))
            .with_option(InputOption::flag("list", None, "List configuration settings."))
    }

    fn execute(&mut self, ctx: &CommandContext<'_>) -> CliResult<i32> {
        let settings = ctx.shell.effective_settings();
        let out = ctx.io.output();

        match ctx.input.argument("key") {
            Some(key) if !ctx.input.flag("list") => {
                let value = settings.get(key).ok_or_else(|| CliError::CommandFailed {
                    message: format!("there is no {key} setting"),
                    exit_code: crate::exitcode::CONFIG,
                })?;
                match value {
                    toml::Value::String(s) => out.write_line(&s),
                    toml::Value::Table(_) => {
                        for (k, v) in settings.entries() {
                            if k.starts_with(&format!("{}.", key.replace('-', "_"))) {
                                out.write_line(&format!("{k} = {v}"));
                            }
                        }
                    }
                    other => out.write_line(&other.to_string()),
                }
            }
            _ => {
                for (key, value) in settings.entries() {
                    out.write_line(&format!("{key} = {value}"));
                }
            }
        }
        Ok(crate::exitcode::OK)
    }
}
