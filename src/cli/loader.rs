//! Lazy command registry
//!
//! Names map to factories; a factory runs only when its name is resolved.
//! Instances are not cached: every `resolve` builds a fresh command, so state
//! attached by listeners never leaks into a later dispatch.
//!
//! A pass-through command receives every token after its name verbatim;
//! `run` and executable plugin commands are registered that way.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::cli::commands::{
    AboutCommand, CheckCommand, Command, CompletionsCommand, ConfigCommand, EnvInfoCommand,
    InstallCommand, ListCommand, RunCommand,
};
use crate::cli::args::PASS_THROUGH_COMMAND;
use crate::cli::error::LoadError;
use crate::cli::{CliError, CliResult};

pub type CommandFactory = Box<dyn Fn() -> Result<Box<dyn Command>, LoadError> + Send + Sync>;

/// Names of the commands shipped with quill.
pub const BUILTIN_COMMANDS: &[&str] = &[
    "about",
    "check",
    "completions",
    "config",
    "env info",
    "install",
    "list",
    "run",
];

/// Construct a built-in command by name.
pub fn load_builtin(name: &str) -> Result<Box<dyn Command>, LoadError> {
    let command: Box<dyn Command> = match name {
        "about" => Box::new(AboutCommand),
        "check" => Box::new(CheckCommand),
        "completions" => Box::new(CompletionsCommand),
        "config" => Box::new(ConfigCommand),
        "env info" => Box::new(EnvInfoCommand::default()),
        "install" => Box::new(InstallCommand::default()),
        "list" => Box::new(ListCommand),
        "run" => Box::new(RunCommand::default()),
        other => return Err(format!("no built-in command named \"{other}\"").into()),
    };
    Ok(command)
}

#[derive(Default)]
pub struct CommandLoader {
    factories: BTreeMap<String, CommandFactory>,
    pass_through: BTreeSet<String>,
}

impl std::fmt::Debug for CommandLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandLoader")
            .field("names", &self.names())
            .finish()
    }
}

impl CommandLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader with every built-in command registered.
    pub fn with_builtins() -> Self {
        let mut loader = Self::new();
        for name in BUILTIN_COMMANDS {
            if *name == PASS_THROUGH_COMMAND {
                loader.register_pass_through(*name, move || load_builtin(name));
            } else {
                loader.register(*name, move || load_builtin(name));
            }
        }
        loader
    }

    /// Register `factory` under `name`, replacing any previous registration.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Box<dyn Command>, LoadError> + Send + Sync + 'static,
    {
        let name = name.into();
        debug!("registering command {name}");
        self.pass_through.remove(&name);
        self.factories.insert(name, Box::new(factory));
    }

    /// Register a command whose trailing tokens are forwarded untouched.
    pub fn register_pass_through<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Box<dyn Command>, LoadError> + Send + Sync + 'static,
    {
        let name = name.into();
        self.register(name.clone(), factory);
        self.pass_through.insert(name);
    }

    pub fn has(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn is_pass_through(&self, name: &str) -> bool {
        self.pass_through.contains(name)
    }

    /// Build the command registered under `name`.
    pub fn resolve(&self, name: &str) -> CliResult<Box<dyn Command>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| CliError::UnknownCommand {
                name: name.to_string(),
            })?;
        factory().map_err(|source| CliError::CommandLoad {
            name: name.to_string(),
            source,
        })
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Longest registered name formed by a prefix of `words`.
    ///
    /// `["env", "info", "--path"]` resolves to `env info`; returns the number
    /// of words used along with the name.
    pub fn find_name(&self, words: &[String]) -> Option<(String, usize)> {
        (1..=words.len()).rev().find_map(|n| {
            let candidate = words[..n].join(" ");
            self.has(&candidate).then_some((candidate, n))
        })
    }
}
