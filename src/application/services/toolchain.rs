//! Sequential execution of external tools
//!
//! Mirrors shell `a && b && c`: each step runs to completion and the first
//! non-zero exit stops the chain.

use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::ToolStep;
use crate::infrastructure::traits::{CommandRunner, ToolExit};
use crate::infrastructure::{InfraError, InfraResult};

/// Runs tool steps through a `CommandRunner` and interprets their exit.
pub struct ToolChain {
    cmd: Arc<dyn CommandRunner>,
}

impl ToolChain {
    pub fn new(cmd: Arc<dyn CommandRunner>) -> Self {
        Self { cmd }
    }

    /// Run one step; any outcome other than exit code 0 is an error.
    pub fn run_step(&self, step: &ToolStep, cwd: &Path) -> InfraResult<()> {
        info!("run: {}", step);
        let exit = self.cmd.run(step, cwd).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => InfraError::ToolNotFound {
                program: step.program.clone(),
            },
            _ => InfraError::io(format!("run {}", step.program), e),
        })?;
        debug!("run: {} -> {:?}", step.program, exit);

        match exit {
            ToolExit::Code(0) => Ok(()),
            ToolExit::Code(code) => Err(InfraError::ToolFailed {
                program: step.program.clone(),
                code,
            }),
            ToolExit::Signal(signal) => Err(InfraError::ToolKilled {
                program: step.program.clone(),
                signal,
            }),
        }
    }

    /// Run steps in order, stopping at the first failure.
    pub fn run_all(&self, steps: &[ToolStep], cwd: &Path) -> InfraResult<()> {
        for step in steps {
            self.run_step(step, cwd)?;
        }
        Ok(())
    }
}
