use tracing::Level;

use crate::cli::events::{CommandEvent, CommandListener};
use crate::cli::logging::{channel_matches, LogRouter};
use crate::cli::CliResult;
use crate::infrastructure::io::Verbosity;

/// Channels routed for every loggable command.
pub const BASE_CHANNELS: &[&str] = &[
    "quill::packages::locker",
    "quill::packages::package",
    "quill::infrastructure::env_manager",
];

/// Channels below this family report progress at info level by default.
pub const PROGRESS_CHANNEL_FAMILY: &str = "quill::application::installer";

/// Threshold for `channel` at `verbosity`.
pub fn channel_level(channel: &str, verbosity: Verbosity) -> Level {
    let level = match verbosity {
        Verbosity::Quiet | Verbosity::Normal => Level::WARN,
        Verbosity::Verbose | Verbosity::VeryVerbose => Level::INFO,
        Verbosity::Debug => Level::DEBUG,
    };
    if channel_matches(PROGRESS_CHANNEL_FAMILY, channel) && level < Level::INFO {
        Level::INFO
    } else {
        level
    }
}

/// Routes the base channels plus the command's own to the command output.
pub struct LoggerListener {
    router: LogRouter,
}

impl LoggerListener {
    pub fn new(router: LogRouter) -> Self {
        Self { router }
    }
}

impl CommandListener for LoggerListener {
    fn name(&self) -> &str {
        "logger configuration"
    }

    fn on_command(&self, event: &mut CommandEvent<'_>) -> CliResult<()> {
        let Some(loggable) = event.command.as_loggable() else {
            return Ok(());
        };
        let mut channels: Vec<String> = BASE_CHANNELS.iter().map(|c| c.to_string()).collect();
        for channel in loggable.loggers() {
            if !channels.contains(&channel) {
                channels.push(channel);
            }
        }

        let verbosity = event.io.verbosity();
        for channel in &channels {
            self.router
                .attach(channel, channel_level(channel, verbosity), event.io.output().clone());
        }
        Ok(())
    }
}
