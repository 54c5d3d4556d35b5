//! Lint service: isort, black, pylint and mypy over the package sources
//!
//! The source scope is every `*.py` directly in the package directory,
//! followed by every `*.py` exactly one directory below it
//! (`pkg/*.py pkg/**/*.py` under a POSIX shell).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::application::services::ToolChain;
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::ToolStep;
use crate::infrastructure::traits::{CommandRunner, FileSystem};
use crate::infrastructure::InfraResult;

/// Runs the configured lint tool chain.
pub struct LintService {
    fs: Arc<dyn FileSystem>,
    chain: ToolChain,
    settings: Arc<Settings>,
}

impl LintService {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            fs,
            chain: ToolChain::new(cmd),
            settings,
        }
    }

    /// Python sources in scope, relative to the project directory.
    pub fn source_files(&self) -> ApplicationResult<Vec<PathBuf>> {
        let package_dir = self.settings.package_dir();
        if !self.fs.is_dir(&package_dir) {
            return Err(ApplicationError::PackageNotFound(package_dir));
        }

        let mut top = Vec::new();
        let mut nested = Vec::new();
        for entry in WalkDir::new(&package_dir)
            .min_depth(1)
            .max_depth(2)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e.path()))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("py") {
                continue;
            }
            let rel = path
                .strip_prefix(&self.settings.project_dir)
                .unwrap_or(path)
                .to_path_buf();
            if entry.depth() == 1 {
                top.push(rel);
            } else {
                nested.push(rel);
            }
        }
        top.sort();
        nested.sort();
        top.extend(nested);

        debug!("source_files: {} files under {}", top.len(), package_dir.display());
        if top.is_empty() {
            return Err(ApplicationError::NoSources(package_dir));
        }
        Ok(top)
    }

    /// One step per configured tool, each followed by the source files.
    pub fn steps(&self, files: &[PathBuf]) -> Vec<ToolStep> {
        self.settings
            .lint
            .tools
            .iter()
            .map(|tool| {
                tool.to_step()
                    .args(files.iter().map(|f| f.to_string_lossy().into_owned()))
            })
            .collect()
    }

    /// Resolve the sources and run every tool, stopping at the first failure.
    #[instrument(skip(self))]
    pub fn run(&self) -> InfraResult<()> {
        let files = self.source_files()?;
        let steps = self.steps(&files);
        self.chain.run_all(&steps, &self.settings.project_dir)
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}
