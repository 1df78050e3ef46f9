//! Pre-run event pipeline
//!
//! Listeners run in registration order after a command is resolved and bound,
//! before it executes. The first failure stops the pipeline.

use tracing::{debug, instrument};

use crate::cli::commands::Command;
use crate::cli::context::ShellContext;
use crate::cli::input::ArgvInput;
use crate::cli::{CliError, CliResult};
use crate::infrastructure::io::Io;

/// Fired once per dispatch, before the command runs.
pub struct CommandEvent<'a> {
    pub command: &'a mut dyn Command,
    pub input: &'a ArgvInput,
    pub io: &'a Io,
    pub shell: &'a ShellContext,
}

pub trait CommandListener: Send + Sync {
    /// Label used in failure reports.
    fn name(&self) -> &str;

    fn on_command(&self, event: &mut CommandEvent<'_>) -> CliResult<()>;
}

#[derive(Default)]
pub struct EventDispatcher {
    listeners: Vec<Box<dyn CommandListener>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Box<dyn CommandListener>) {
        self.listeners.push(listener);
    }

    pub fn listener_names(&self) -> Vec<&str> {
        self.listeners.iter().map(|l| l.name()).collect()
    }

    #[instrument(skip_all, fields(command = event.command.name()))]
    pub fn dispatch(&self, event: &mut CommandEvent<'_>) -> CliResult<()> {
        for listener in &self.listeners {
            debug!("listener {}", listener.name());
            listener
                .on_command(event)
                .map_err(|source| CliError::ListenerFailure {
                    listener: listener.name().to_string(),
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }
}
