//! Shell completion scripts
//!
//! The clap command tree is built at runtime from the registered command
//! names and the global definition, so plugin commands complete as well.

use std::collections::BTreeMap;

use clap::{Arg, ArgAction};
use clap_complete::Shell;

use crate::cli::commands::{Command, CommandContext};
use crate::cli::input::{InputArgument, InputDefinition};
use crate::cli::{CliError, CliResult};

pub struct CompletionsCommand;

/// Clap command tree for `names`; namespaced names become nested subcommands.
pub fn completion_command(bin: &str, names: &[String], global: &InputDefinition) -> clap::Command {
    let mut root = clap::Command::new(bin.to_string());
    // clap provides its own --help
    for option in global.options().iter().filter(|o| o.name() != "help") {
        let mut arg = Arg::new(option.name().to_string())
            .long(option.name().to_string())
            .help(option.description().to_string())
            .action(ArgAction::SetTrue)
            .global(true);
        let short = option
            .shortcuts()
            .into_iter()
            .find_map(|s| single_char(&s));
        if let Some(c) = short {
            arg = arg.short(c);
        }
        root = root.arg(arg);
    }

    let mut namespaces: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for name in names {
        match name.split_once(' ') {
            Some((ns, rest)) => namespaces.entry(ns.to_string()).or_default().push(rest.to_string()),
            None => {
                namespaces.entry(name.clone()).or_default();
            }
        }
    }
    for (ns, children) in namespaces {
        let mut sub = clap::Command::new(ns);
        for child in children {
            sub = sub.subcommand(clap::Command::new(child));
        }
        root = root.subcommand(sub);
    }
    root
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

impl Command for CompletionsCommand {
    fn name(&self) -> &str {
        "completions"
    }

    fn description(&self) -> &str {
        "Generate completion scripts for your shell."
    }

    fn definition(&self) -> InputDefinition {
        InputDefinition::new().with_argument(InputArgument::new(
            "shell",
            true,
            false,
            "The shell type (bash, elvish, fish, powershell, zsh).",
        ))
    }

    fn execute(&mut self, ctx: &CommandContext<'_>) -> CliResult<i32> {
        let requested = ctx.input.argument("shell").unwrap_or_default();
        let shell: Shell = requested.parse().map_err(|e| CliError::CommandFailed {
            message: format!("unsupported shell \"{requested}\": {e}"),
            exit_code: crate::exitcode::USAGE,
        })?;

        let bin = ctx.shell.name().to_string();
        let mut cmd = completion_command(&bin, &ctx.commands.names(), ctx.global_definition);
        let mut script = Vec::new();
        clap_complete::generate(shell, &mut cmd, bin, &mut script);
        ctx.io.output().write(&String::from_utf8_lossy(&script));
        Ok(crate::exitcode::OK)
    }
}
