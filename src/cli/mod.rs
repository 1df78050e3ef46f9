//! CLI layer: input binding, command dispatch and the application shell

pub mod application;
pub mod args;
pub mod commands;
pub mod context;
pub mod error;
pub mod events;
pub mod input;
pub mod listeners;
pub mod loader;
pub mod logging;
pub mod output;
pub mod plugins;
pub mod solutions;

pub use application::{Application, RunState};
pub use error::{CliError, CliResult};
