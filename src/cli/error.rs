//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::TargetRegistry;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("unknown target '{name}'\n\nUsage: pydev [OPTIONS] <TARGET> [ARGS]...\n\nValid targets: {valid}")]
    UnknownTarget { name: String, valid: String },

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl CliError {
    pub fn unknown_target(name: &str, registry: &TargetRegistry) -> Self {
        CliError::UnknownTarget {
            name: name.to_string(),
            valid: registry.names().join(", "),
        }
    }

    /// Get the appropriate exit code for this error.
    ///
    /// Tool failures propagate the tool's own code.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::UnknownTarget { .. } | CliError::InvalidArgs(_) | CliError::Usage(_) => {
                exitcode::USAGE
            }
            CliError::Infra(e) => match e {
                InfraError::ToolNotFound { .. } => exitcode::NOT_FOUND,
                InfraError::ToolFailed { code, .. } => *code,
                InfraError::ToolKilled { signal, .. } => exitcode::SIGNAL_BASE + signal,
                InfraError::Io { .. } => exitcode::IOERR,
                InfraError::Application(app) => match app {
                    ApplicationError::MissingCredential(_) => exitcode::FAILURE,
                    ApplicationError::PackageNotFound(_) | ApplicationError::NoSources(_) => {
                        exitcode::NOINPUT
                    }
                    ApplicationError::Config { .. } => exitcode::CONFIG,
                    ApplicationError::OperationFailed { .. } => exitcode::IOERR,
                    ApplicationError::Domain(_) => exitcode::SOFTWARE,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::PathBuf;

    fn tool_failed(code: i32) -> CliError {
        InfraError::ToolFailed {
            program: "pylint".into(),
            code,
        }
        .into()
    }

    #[rstest]
    #[case(CliError::unknown_target("foo", &TargetRegistry::standard()), 2)]
    #[case(CliError::Usage("lint takes no arguments".into()), 2)]
    #[case(CliError::InvalidArgs("unexpected argument '--bogus'".into()), 2)]
    #[case(InfraError::ToolNotFound { program: "isort".into() }.into(), 127)]
    #[case(tool_failed(4), 4)]
    #[case(tool_failed(30), 30)]
    #[case(InfraError::ToolKilled { program: "mypy".into(), signal: 2 }.into(), 130)]
    #[case(ApplicationError::MissingCredential("PYPI_USERNAME").into(), 1)]
    #[case(ApplicationError::NoSources(PathBuf::from("pkg")).into(), 66)]
    #[case(ApplicationError::Config { message: "bad".into() }.into(), 78)]
    fn given_error_when_exit_code_then_maps(#[case] err: CliError, #[case] expected: i32) {
        assert_eq!(err.exit_code(), expected);
    }

    #[test]
    fn given_unknown_target_when_displayed_then_lists_valid_targets() {
        let msg = CliError::unknown_target("foo", &TargetRegistry::standard()).to_string();
        assert!(msg.contains("unknown target 'foo'"));
        assert!(msg.contains("config, help, imports, lint, publish"));
    }
}
