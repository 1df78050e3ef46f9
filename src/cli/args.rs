//! Global argument definition shared by every command

use crate::cli::input::{InputArgument, InputDefinition, InputOption};

/// Command whose trailing arguments are forwarded to an external process.
pub const PASS_THROUGH_COMMAND: &str = "run";

/// Command used when none is given.
pub const DEFAULT_COMMAND: &str = "list";

/// Options understood by the shell itself, plus the `command` argument.
pub fn global_definition() -> InputDefinition {
    InputDefinition::new()
        .with_argument(InputArgument::new(
            "command",
            true,
            false,
            "The command to execute",
        ))
        .with_option(InputOption::flag("help", Some("h"), "Display help for the given command"))
        .with_option(InputOption::flag("quiet", Some("q"), "Do not output any message"))
        .with_option(InputOption::flag(
            "verbose",
            Some("v|vv|vvv"),
            "Increase the verbosity of messages: 1 for normal output, 2 for more verbose output and 3 for debug",
        ))
        .with_option(InputOption::flag("version", Some("V"), "Display this application version"))
        .with_option(InputOption::flag("ansi", None, "Force ANSI output"))
        .with_option(InputOption::flag("no-ansi", None, "Disable ANSI output"))
        .with_option(InputOption::flag(
            "no-interaction",
            Some("n"),
            "Do not ask any interactive question",
        ))
        .with_option(InputOption::flag(
            "no-plugins",
            None,
            "Disables plugins",
        ))
}
