//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::cli::input::InputBindError;
use crate::infrastructure::InfraError;

/// Cause of a failed command construction.
pub type LoadError = Box<dyn std::error::Error + Send + Sync>;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("the command \"{name}\" does not exist")]
    UnknownCommand { name: String },

    #[error("the command \"{name}\" could not be loaded")]
    CommandLoad {
        name: String,
        #[source]
        source: LoadError,
    },

    #[error("{0}")]
    InputBind(#[from] InputBindError),

    #[error("{listener}: {source}")]
    ListenerFailure {
        listener: String,
        #[source]
        source: Box<CliError>,
    },

    #[error("plugin {plugin} failed to activate: {message}")]
    PluginActivation { plugin: String, message: String },

    #[error("{message}")]
    CommandFailed { message: String, exit_code: i32 },
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(e.into())
    }
}

impl CliError {
    /// Innermost cause, looking through listener wrappers.
    pub fn root(&self) -> &CliError {
        match self {
            CliError::ListenerFailure { source, .. } => source.root(),
            other => other,
        }
    }

    /// Application-level cause, if any.
    pub fn application_error(&self) -> Option<&ApplicationError> {
        match self.root() {
            CliError::Infra(InfraError::Application(e)) => Some(e),
            _ => None,
        }
    }

    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::UnknownCommand { .. } | CliError::InputBind(_) => crate::exitcode::USAGE,
            CliError::CommandLoad { .. } | CliError::PluginActivation { .. } => {
                crate::exitcode::SOFTWARE
            }
            CliError::ListenerFailure { source, .. } => source.exit_code(),
            CliError::CommandFailed { exit_code, .. } => *exit_code,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Process { exit_code, .. } => {
                    exit_code.unwrap_or(crate::exitcode::FAILURE)
                }
                InfraError::EnvCreation { .. } => crate::exitcode::SOFTWARE,
                InfraError::Application(e) => match e {
                    ApplicationError::InstallFailed { exit_code, .. } => *exit_code,
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::ProjectNotFound(_) | ApplicationError::LockFileMissing(_) => {
                        crate::exitcode::NOINPUT
                    }
                    ApplicationError::Domain(_) | ApplicationError::InvalidProject { .. } => {
                        crate::exitcode::DATAERR
                    }
                    ApplicationError::OperationFailed { .. } => crate::exitcode::FAILURE,
                },
            },
        }
    }
}
