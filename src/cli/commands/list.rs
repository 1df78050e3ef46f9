use itertools::Itertools;
use tracing::warn;

use crate::cli::commands::{Command, CommandContext};
use crate::cli::output;
use crate::cli::CliResult;

/// Lists commands with their descriptions, grouped by namespace.
pub struct ListCommand;

impl Command for ListCommand {
    fn name(&self) -> &str {
        "list"
    }

    fn description(&self) -> &str {
        "Lists commands."
    }

    fn execute(&mut self, ctx: &CommandContext<'_>) -> CliResult<i32> {
        let out = ctx.io.output();
        out.write_line(&format!(
            "{} (version {})",
            output::info_text(out, "Quill"),
            ctx.shell.version()
        ));
        out.write_line("");
        output::header(out, "Usage:");
        out.write_line("  command [options] [arguments]");
        out.write_line("");

        output::header(out, "Options:");
        for option in ctx.global_definition.options() {
            let shortcut = option
                .shortcuts()
                .iter()
                .map(|s| format!("-{s}"))
                .join("|");
            let synopsis = if shortcut.is_empty() {
                format!("    --{}", option.name())
            } else {
                format!("{shortcut}, --{}", option.name())
            };
            let padded = format!("{synopsis:<26}");
            out.write_line(&format!(
                "  {} {}",
                output::info_text(out, &padded),
                option.description()
            ));
        }
        out.write_line("");

        let mut commands = Vec::new();
        for name in ctx.commands.names() {
            match ctx.commands.resolve(&name) {
                Ok(command) => commands.push((name, command.description().to_string())),
                Err(e) => warn!("cannot describe {name}: {e}"),
            }
        }

        output::header(out, "Available commands:");
        let width = commands.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
        let groups = commands
            .iter()
            .chunk_by(|(name, _)| name.split_once(' ').map(|(ns, _)| ns.to_string()));
        for (namespace, group) in &groups {
            if let Some(namespace) = namespace {
                out.write_line(&format!(" {}", output::comment_text(out, &namespace)));
            }
            for (name, description) in group {
                let padded = format!("{name:<width$}");
                out.write_line(&format!("  {}  {description}", output::info_text(out, &padded)));
            }
        }
        Ok(crate::exitcode::OK)
    }
}
