//! Domain entities: core data structures

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// The root package a project declares in `quill.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPackage {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl ProjectPackage {
    /// Validate name and version.
    ///
    /// Names are lowercase ASCII alphanumerics with `-`, `_` or `.` separators.
    /// Versions must start with a numeric release segment (`1`, `1.2`, `1.2.3rc1`).
    pub fn validate(&self) -> Result<(), DomainError> {
        let name_ok = !self.name.is_empty()
            && self
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && self
                .name
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphanumeric());
        if !name_ok {
            return Err(DomainError::InvalidPackageName(self.name.clone()));
        }

        let release = self
            .version
            .split(|c: char| !(c.is_ascii_digit() || c == '.'))
            .next()
            .unwrap_or_default();
        let release_ok = !release.is_empty()
            && release
                .split('.')
                .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
        if !release_ok {
            return Err(DomainError::InvalidVersion {
                package: self.name.clone(),
                version: self.version.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for ProjectPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.version)
    }
}

/// A package source (index) declared by the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
    /// Use this source before the default index
    #[serde(default)]
    pub default: bool,
}

/// One entry of the lock file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedPackage {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub source: Option<String>,
}

impl fmt::Display for LockedPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.version)
    }
}

/// Kind of execution environment a command runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvKind {
    /// An isolated virtual environment owned by the project
    Virtual,
    /// The interpreter found on the system `PATH`
    System,
}

/// Handle to a resolved execution environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Env {
    pub path: PathBuf,
    pub kind: EnvKind,
}

impl Env {
    pub fn virtual_env(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: EnvKind::Virtual,
        }
    }

    pub fn system(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: EnvKind::System,
        }
    }

    /// True for a real (non-system) virtual environment.
    pub fn is_venv(&self) -> bool {
        self.kind == EnvKind::Virtual
    }

    /// Directory holding the environment's executables.
    pub fn bin_dir(&self) -> PathBuf {
        if cfg!(windows) {
            self.path.join("Scripts")
        } else {
            self.path.join("bin")
        }
    }

    /// Environment variables to set for a process running inside this env.
    ///
    /// System environments leave the caller's environment untouched.
    pub fn process_vars(&self, current_path: Option<&str>) -> Vec<(String, String)> {
        if !self.is_venv() {
            return Vec::new();
        }
        let bin = self.bin_dir();
        let path = match current_path {
            Some(p) if !p.is_empty() => {
                let mut dirs = vec![bin];
                dirs.extend(std::env::split_paths(p));
                std::env::join_paths(dirs)
                    .map(|joined| joined.to_string_lossy().into_owned())
                    .unwrap_or_else(|_| self.bin_dir().to_string_lossy().into_owned())
            }
            _ => bin.to_string_lossy().into_owned(),
        };
        vec![
            ("VIRTUAL_ENV".to_string(), self.path.to_string_lossy().into_owned()),
            ("PATH".to_string(), path),
        ]
    }

    pub fn display_path(&self) -> &Path {
        &self.path
    }
}

/// Expand shell variables and tilde in a path string.
///
/// Handles `~`, `$VAR`, and `${VAR}` syntax.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
