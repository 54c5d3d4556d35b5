//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use tracing::debug;

use crate::domain::ToolStep;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Resolve to an absolute path with symlinks and `..` resolved.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
}

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolExit {
    /// Exited normally with this code
    Code(i32),
    /// Terminated by this signal number
    Signal(i32),
}

impl ToolExit {
    pub fn success(&self) -> bool {
        matches!(self, ToolExit::Code(0))
    }
}

impl From<ExitStatus> for ToolExit {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ToolExit::Code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ToolExit::Signal(signal);
            }
        }
        ToolExit::Code(1)
    }
}

/// External command runner abstraction.
pub trait CommandRunner: Send + Sync {
    /// Run a tool in `cwd` with inherited stdio and wait for it to finish.
    ///
    /// A program missing from PATH surfaces as `io::ErrorKind::NotFound`.
    fn run(&self, step: &ToolStep, cwd: &Path) -> io::Result<ToolExit>;
}

/// Environment variable lookup abstraction.
pub trait EnvReader: Send + Sync {
    /// Value of `key`, or None if unset or not valid unicode.
    fn var(&self, key: &str) -> Option<String>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        path.canonicalize()
    }
}

/// Real command runner implementation.
#[derive(Debug, Default)]
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run(&self, step: &ToolStep, cwd: &Path) -> io::Result<ToolExit> {
        debug!("run: {} (cwd={})", step, cwd.display());
        let status = Command::new(&step.program)
            .args(step.exposed_args())
            .current_dir(cwd)
            .status()?;
        Ok(status.into())
    }
}

/// Real environment reader (process environment).
#[derive(Debug, Default)]
pub struct ProcessEnv;

impl EnvReader for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed in-memory environment, for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct MapEnv(HashMap<String, String>);

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }
}

impl<const N: usize> From<[(&str, &str); N]> for MapEnv {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs
            .into_iter()
            .fold(Self::new(), |env, (k, v)| env.with(k, v))
    }
}

impl EnvReader for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_missing_program_when_run_then_not_found() {
        let step = ToolStep::new("pydev-definitely-not-a-real-tool");
        let err = RealCommandRunner
            .run(&step, Path::new("."))
            .expect_err("program should not exist");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn given_failing_program_when_run_then_reports_code() {
        let step = ToolStep::new("sh").args(["-c", "exit 3"]);
        let exit = RealCommandRunner.run(&step, Path::new(".")).unwrap();
        assert_eq!(exit, ToolExit::Code(3));
        assert!(!exit.success());
    }

    #[cfg(unix)]
    #[test]
    fn given_killed_program_when_run_then_reports_signal() {
        let step = ToolStep::new("sh").args(["-c", "kill -TERM $$"]);
        let exit = RealCommandRunner.run(&step, Path::new(".")).unwrap();
        assert_eq!(exit, ToolExit::Signal(15));
    }
}
