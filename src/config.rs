//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/quill/config.toml`
//! 3. Local config: `<project_dir>/.quill.toml`
//! 4. Environment variables: `QUILL_*` prefix, `__` between sections
//!    (e.g. `QUILL_EXPERIMENTAL__NEW_INSTALLER=false`)
//!
//! Config files may spell keys with hyphens (`new-installer`); they are
//! normalized to the snake_case field names before layering.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::error_ext::IoResultExt;
use crate::application::ApplicationError;
use crate::domain::expand_env_vars;

/// Virtual environment settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VirtualenvsConfig {
    /// Create a virtualenv when none exists (otherwise use the system env)
    pub create: bool,
    /// Create the virtualenv as `.venv` inside the project
    pub in_project: bool,
    /// Directory holding cached virtualenvs
    pub path: PathBuf,
}

impl Default for VirtualenvsConfig {
    fn default() -> Self {
        Self {
            create: true,
            in_project: false,
            path: default_cache_dir().join("virtualenvs"),
        }
    }
}

/// Feature switches that are not yet the default behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExperimentalConfig {
    /// Install all packages in one batched pip call instead of one call each
    pub new_installer: bool,
}

impl Default for ExperimentalConfig {
    fn default() -> Self {
        Self {
            new_installer: true,
        }
    }
}

/// Application plugin settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PluginsConfig {
    pub enabled: bool,
    /// Directory scanned for `quill-<name>` executables
    pub path: PathBuf,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_data_dir().join("plugins"),
        }
    }
}

/// Unified configuration for quill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Cache directory (default: XDG cache dir)
    pub cache_dir: PathBuf,
    pub virtualenvs: VirtualenvsConfig,
    pub experimental: ExperimentalConfig,
    pub plugins: PluginsConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            virtualenvs: VirtualenvsConfig::default(),
            experimental: ExperimentalConfig::default(),
            plugins: PluginsConfig::default(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "quill")
}

fn default_cache_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.cache/quill"))
}

fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.local/share/quill"))
}

/// Get the XDG config directory for quill.
pub fn global_config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".quill.toml")
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory for local config
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), project_dir)
    }

    /// Load settings from an explicit global config path.
    ///
    /// Split out from [`Settings::load`] so tests don't read the user's real config.
    pub fn load_from(
        global_path: Option<&Path>,
        project_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("cache_dir", path_str(&defaults.cache_dir))
            .map_err(config_err)?
            .set_default("virtualenvs.create", defaults.virtualenvs.create)
            .map_err(config_err)?
            .set_default("virtualenvs.in_project", defaults.virtualenvs.in_project)
            .map_err(config_err)?
            .set_default("virtualenvs.path", path_str(&defaults.virtualenvs.path))
            .map_err(config_err)?
            .set_default(
                "experimental.new_installer",
                defaults.experimental.new_installer,
            )
            .map_err(config_err)?
            .set_default("plugins.enabled", defaults.plugins.enabled)
            .map_err(config_err)?
            .set_default("plugins.path", path_str(&defaults.plugins.path))
            .map_err(config_err)?;

        let local = project_dir.map(local_config_path);
        for path in [global_path, local.as_deref()].into_iter().flatten() {
            if path.exists() {
                let normalized = normalized_file(path)?;
                builder = builder.add_source(File::from_str(&normalized, FileFormat::Toml));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("QUILL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        let mut settings: Self = config.try_deserialize().map_err(config_err)?;

        // Expand ~ and $VAR in path-like fields
        settings.expand_paths();

        Ok(settings)
    }

    fn expand_paths(&mut self) {
        self.cache_dir = PathBuf::from(expand_env_vars(&path_str(&self.cache_dir)));
        self.virtualenvs.path = PathBuf::from(expand_env_vars(&path_str(&self.virtualenvs.path)));
        self.plugins.path = PathBuf::from(expand_env_vars(&path_str(&self.plugins.path)));
    }

    /// Look up a setting by dotted key.
    ///
    /// Hyphens and underscores are interchangeable, so both
    /// `experimental.new-installer` and `experimental.new_installer` resolve.
    pub fn get(&self, key: &str) -> Option<toml::Value> {
        let root = toml::Value::try_from(self).ok()?;
        let normalized = key.replace('-', "_");
        normalized
            .split('.')
            .try_fold(root, |value, segment| value.get(segment).cloned())
    }

    /// Boolean setting by dotted key, `default` when absent or not a bool.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(default)
    }

    /// All leaf settings as `(dotted.key, rendered value)` pairs, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &toml::Value, out: &mut Vec<(String, String)>) {
            match value {
                toml::Value::Table(table) => {
                    for (k, v) in table {
                        let key = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&key, v, out);
                    }
                }
                toml::Value::String(s) => out.push((prefix.to_string(), format!("\"{s}\""))),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(root) = toml::Value::try_from(self) {
            walk("", &root, &mut out);
        }
        out.sort();
        out
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }
}

/// Contents of the TOML file at `path` with every key in snake_case.
fn normalized_file(path: &Path) -> Result<String, ApplicationError> {
    let content = std::fs::read_to_string(path).with_path_context("read config file", path)?;
    let table: toml::Table = content.parse().map_err(|e: toml::de::Error| ApplicationError::Config {
        message: format!("{}: {}", path.display(), e.message()),
    })?;
    toml::to_string(&snake_case_keys(table)).map_err(|e| ApplicationError::Config {
        message: format!("{}: {e}", path.display()),
    })
}

fn snake_case_keys(table: toml::Table) -> toml::Table {
    table
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                toml::Value::Table(nested) => toml::Value::Table(snake_case_keys(nested)),
                other => other,
            };
            (key.replace('-', "_"), value)
        })
        .collect()
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
