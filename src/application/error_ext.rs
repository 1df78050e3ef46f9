//! Error conversion helpers for project file I/O
//!
//! Extension traits that attach the path being read to I/O and parse failures.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// let content = fs.read_to_string(&lock_path)
    ///     .with_path_context("read lock file", &lock_path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}

/// Extension trait turning TOML parse failures into `InvalidProject`.
pub trait TomlResultExt<T> {
    fn with_file(self, path: &Path) -> ApplicationResult<T>;
}

impl<T> TomlResultExt<T> for Result<T, toml::de::Error> {
    fn with_file(self, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::InvalidProject {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }
}
