//! Application plugins
//!
//! Plugins are discovered once per process and activated against the
//! [`Application`], usually registering extra commands. The built-in
//! discovery treats every executable `quill-<name>` in the plugins directory
//! as a plugin providing the command `<name>`.

use std::path::PathBuf;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::cli::application::Application;
use crate::cli::commands::{Command, ExternalCommand};
use crate::cli::{CliError, CliResult};

/// Namespace application plugins are discovered under.
pub const PLUGIN_NAMESPACE: &str = "application.plugin";

/// File name prefix of executable plugins.
pub const EXECUTABLE_PREFIX: &str = "quill-";

pub trait ApplicationPlugin: Send + Sync {
    fn name(&self) -> &str;

    fn activate(&self, application: &mut Application) -> CliResult<()>;
}

pub trait PluginDiscovery: Send + Sync {
    fn discover(&self, namespace: &str) -> CliResult<Vec<Box<dyn ApplicationPlugin>>>;
}

/// Whether plugins were loaded, and whether the loading run disabled them.
///
/// `loaded` is set by the first run and never cleared.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PluginActivationState {
    loaded: bool,
    disabled: bool,
}

impl PluginActivationState {
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Record the first run's decision; later calls are ignored.
    ///
    /// Returns whether plugins should be discovered now.
    pub fn begin(&mut self, disabled: bool) -> bool {
        if self.loaded {
            return false;
        }
        self.loaded = true;
        self.disabled = disabled;
        !disabled
    }
}

/// Executable plugin: registers one pass-through command forwarding to the
/// executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutablePlugin {
    command: String,
    path: PathBuf,
}

impl ExecutablePlugin {
    pub fn new(command: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            path: path.into(),
        }
    }
}

impl ApplicationPlugin for ExecutablePlugin {
    fn name(&self) -> &str {
        &self.command
    }

    fn activate(&self, application: &mut Application) -> CliResult<()> {
        if self.command.trim().is_empty() {
            return Err(CliError::PluginActivation {
                plugin: self.path.display().to_string(),
                message: "empty command name".to_string(),
            });
        }
        let loader = application.command_loader_mut();
        if loader.has(&self.command) {
            warn!("plugin {} replaces command {}", self.path.display(), self.command);
        }
        let command = self.command.clone();
        let path = self.path.clone();
        loader.register_pass_through(self.command.clone(), move || {
            let external: Box<dyn Command> =
                Box::new(ExternalCommand::new(command.clone(), path.clone()));
            Ok(external)
        });
        Ok(())
    }
}

/// Scans one directory (not recursively) for `quill-<name>` executables.
#[derive(Debug, Clone)]
pub struct ExecutablePluginDiscovery {
    dir: PathBuf,
}

impl ExecutablePluginDiscovery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.is_file() && metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    metadata.is_file()
}

impl PluginDiscovery for ExecutablePluginDiscovery {
    fn discover(&self, namespace: &str) -> CliResult<Vec<Box<dyn ApplicationPlugin>>> {
        if namespace != PLUGIN_NAMESPACE || !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        debug!("discovering plugins in {}", self.dir.display());

        let mut plugins: Vec<Box<dyn ApplicationPlugin>> = Vec::new();
        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| CliError::PluginActivation {
                plugin: self.dir.display().to_string(),
                message: e.to_string(),
            })?;
            let file_name = entry.file_name().to_string_lossy();
            let Some(command) = file_name.strip_prefix(EXECUTABLE_PREFIX) else {
                continue;
            };
            let executable = entry.metadata().map(|m| is_executable(&m)).unwrap_or(false);
            if !executable {
                debug!("skipping non-executable {}", entry.path().display());
                continue;
            }
            plugins.push(Box::new(ExecutablePlugin::new(command, entry.path())));
        }
        Ok(plugins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn given_state_when_begin_twice_then_only_first_loads() {
        let mut state = PluginActivationState::default();

        assert!(state.begin(false));
        assert!(!state.begin(false));
        assert!(state.is_loaded());
    }

    #[test]
    fn given_disabled_first_run_when_begin_then_loaded_without_discovery() {
        let mut state = PluginActivationState::default();

        assert!(!state.begin(true));
        assert!(state.is_loaded());
        assert!(state.is_disabled());
        assert!(!state.begin(false));
    }

    #[cfg(unix)]
    #[test]
    fn given_plugin_dir_when_discover_then_only_prefixed_executables() {
        use std::os::unix::fs::PermissionsExt;

        // Arrange
        let temp = TempDir::new().unwrap();
        for (name, mode) in [("quill-export", 0o755), ("quill-notes", 0o644), ("other", 0o755)] {
            let path = temp.path().join(name);
            std::fs::write(&path, "#!/bin/sh\n").unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
        }
        let discovery = ExecutablePluginDiscovery::new(temp.path());

        // Act
        let plugins = discovery.discover(PLUGIN_NAMESPACE).unwrap();

        // Assert
        let names: Vec<&str> = plugins.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["export"]);
    }

    #[test]
    fn given_other_namespace_when_discover_then_empty() {
        let temp = TempDir::new().unwrap();
        let discovery = ExecutablePluginDiscovery::new(temp.path());

        assert!(discovery.discover("console.command").unwrap().is_empty());
    }
}
