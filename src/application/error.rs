//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("quill.toml not found in {0} or its parents")]
    ProjectNotFound(PathBuf),

    #[error("invalid project file {path}: {message}")]
    InvalidProject { path: PathBuf, message: String },

    #[error("lock file not found: {0}")]
    LockFileMissing(PathBuf),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("installation failed: {message}")]
    InstallFailed { message: String, exit_code: i32 },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
