//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent project definition violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("invalid package name: {0}")]
    InvalidPackageName(String),

    #[error("invalid version for {package}: {version}")]
    InvalidVersion { package: String, version: String },

    #[error("duplicate package source: {0}")]
    DuplicateSource(String),
}
