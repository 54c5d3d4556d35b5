//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod python;
pub mod registry;
pub mod stdlib;

pub use entities::*;
pub use error::DomainError;
pub use python::{collect_imports, parse_imports, ImportStmt, ImportedName};
pub use registry::TargetRegistry;
pub use stdlib::is_stdlib_module;
