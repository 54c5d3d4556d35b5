//! Package index credentials
//!
//! Loaded once at the start of a publish, validated before any tool runs.

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::Secret;
use crate::infrastructure::traits::EnvReader;

pub const USERNAME_VAR: &str = "PYPI_USERNAME";
pub const PASSWORD_VAR: &str = "PYPI_PASSWORD";

/// Username and password for the package index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Secret,
}

impl Credentials {
    /// Read both variables; unset or empty values are rejected.
    pub fn load(env: &dyn EnvReader) -> ApplicationResult<Self> {
        let username = required(env, USERNAME_VAR)?;
        let password = required(env, PASSWORD_VAR)?;
        Ok(Self {
            username,
            password: Secret::new(password),
        })
    }
}

fn required(env: &dyn EnvReader, key: &'static str) -> ApplicationResult<String> {
    match env.var(key) {
        Some(val) if !val.is_empty() => Ok(val),
        _ => Err(ApplicationError::MissingCredential(key)),
    }
}
