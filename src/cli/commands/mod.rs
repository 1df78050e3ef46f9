//! Command trait, capability facets and the built-in commands
//!
//! A command opts into pre-run configuration by exposing facets:
//! - [`Loggable`]: extra log channels routed to the command's output
//! - [`EnvAware`]: receives the resolved execution environment
//! - [`InstallAware`]: receives a configured installer (implies `EnvAware`)
//!
//! Listeners query facets through the accessors on [`Command`]; they never
//! look at concrete command types.

use std::collections::BTreeSet;

use crate::cli::context::ShellContext;
use crate::cli::input::{ArgvInput, InputDefinition};
use crate::cli::loader::CommandLoader;
use crate::cli::CliResult;
use crate::domain::Env;
use crate::infrastructure::io::Io;
use crate::infrastructure::traits::Installer;

mod about;
mod check;
mod completions;
mod config;
mod env_info;
mod external;
mod install;
mod list;
mod run;

pub use about::AboutCommand;
pub use check::CheckCommand;
pub use completions::CompletionsCommand;
pub use config::ConfigCommand;
pub use env_info::EnvInfoCommand;
pub use external::ExternalCommand;
pub use install::InstallCommand;
pub use list::ListCommand;
pub use run::RunCommand;

/// Declares log channels the command wants on its output.
pub trait Loggable {
    fn loggers(&self) -> Vec<String>;
}

/// Holds an optional execution environment.
pub trait EnvAware {
    fn env(&self) -> Option<&Env>;
    fn set_env(&mut self, env: Env);
}

/// Holds an optional installer.
pub trait InstallAware: EnvAware {
    fn installer(&self) -> Option<&dyn Installer>;
    fn set_installer(&mut self, installer: Box<dyn Installer>);
}

/// Facet tags, for inspection and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Capability {
    Loggable,
    EnvAware,
    InstallAware,
}

/// Everything a command sees while executing.
pub struct CommandContext<'a> {
    pub io: &'a Io,
    pub input: &'a ArgvInput,
    pub shell: &'a ShellContext,
    pub commands: &'a CommandLoader,
    /// The shell's own options and arguments
    pub global_definition: &'a InputDefinition,
}

pub trait Command: Send {
    /// Registry name; namespaced commands use spaces (`env info`).
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Options and arguments after the command name.
    fn definition(&self) -> InputDefinition {
        InputDefinition::new()
    }

    fn execute(&mut self, ctx: &CommandContext<'_>) -> CliResult<i32>;

    fn as_loggable(&self) -> Option<&dyn Loggable> {
        None
    }

    fn as_env_aware(&mut self) -> Option<&mut dyn EnvAware> {
        None
    }

    fn as_install_aware(&mut self) -> Option<&mut dyn InstallAware> {
        None
    }
}

impl<'c> dyn Command + 'c {
    /// Facets this command exposes.
    pub fn capabilities(&mut self) -> BTreeSet<Capability> {
        let mut capabilities = BTreeSet::new();
        if self.as_loggable().is_some() {
            capabilities.insert(Capability::Loggable);
        }
        if self.as_env_aware().is_some() {
            capabilities.insert(Capability::EnvAware);
        }
        if self.as_install_aware().is_some() {
            capabilities.insert(Capability::InstallAware);
        }
        capabilities
    }

    pub fn attached_env(&mut self) -> Option<Env> {
        self.as_env_aware().and_then(|c| c.env().cloned())
    }

    pub fn has_installer(&mut self) -> bool {
        self.as_install_aware()
            .is_some_and(|c| c.installer().is_some())
    }
}

/// Env attached to an env-aware command, or an error naming the command.
pub(crate) fn require_env<'e>(env: Option<&'e Env>, command: &str) -> CliResult<&'e Env> {
    env.ok_or_else(|| crate::cli::CliError::CommandFailed {
        message: format!("{command}: no environment attached"),
        exit_code: crate::exitcode::SOFTWARE,
    })
}
