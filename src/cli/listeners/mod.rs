//! Built-in pre-run listeners, in dispatch order

mod environment;
mod installer;
mod loggers;

pub use environment::EnvironmentListener;
pub use installer::InstallerListener;
pub use loggers::{channel_level, LoggerListener, BASE_CHANNELS, PROGRESS_CHANNEL_FAMILY};
