//! quill: project and package manager shell
//!
//! Layers, innermost first:
//! - `domain`: packages, sources and environments
//! - `application`: project loading and the lock-file installer
//! - `infrastructure`: I/O boundaries, console streams, service wiring
//! - `cli`: input binding, command registry, pre-run listeners, the shell

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
