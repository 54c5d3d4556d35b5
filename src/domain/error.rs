//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the target model.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("duplicate target name: {0}")]
    DuplicateTarget(String),

    #[error("target name must not be empty")]
    EmptyTargetName,
}
