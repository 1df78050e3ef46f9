//! Application layer: project context and installer
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod installer;
pub mod project;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use project::{Locker, Project, ProjectFactory, RepositoryPool};
