//! Import scanning service
//!
//! Statically lists the imports of Python files and, up to a depth limit,
//! of the local files they import. Nothing is ever executed.
//!
//! Local resolution (stdlib modules are never resolved):
//! - library dependency `a.b`: `<file dir>/a/b.py`, else `<project dir>/a/b.py`
//! - specific submodule `a.b.c`: `<project dir>/a/b/c.py` if it is a regular file
//! - relative `..a`: `<file dir>/../a.py`

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, instrument, trace};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{
    collect_imports, expand_env_vars, is_stdlib_module, parse_imports, FileImports,
};
use crate::infrastructure::traits::FileSystem;

/// Default recursion depth for `imports`.
pub const DEFAULT_DEPTH: usize = 100;

/// Imports per scanned file, keyed by path.
pub type ImportReport = BTreeMap<String, FileImports>;

/// What to scan and how far to follow local imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub paths: Vec<String>,
    pub depth_limit: usize,
    pub include_stdlib: bool,
}

pub struct ImportService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl ImportService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Imports of a single file, without recursion.
    pub fn scan_file(&self, path: &Path, include_stdlib: bool) -> ApplicationResult<FileImports> {
        let source = self.fs.read_to_string(path).with_path_context("read", path)?;
        Ok(collect_imports(&parse_imports(&source), include_stdlib))
    }

    /// Scan the start files and, breadth-first, the local files they import.
    ///
    /// Each file is scanned once, at the smallest depth it is reached; files
    /// are identified by canonical path and reported under a `..`-free path.
    #[instrument(skip(self))]
    pub fn scan(&self, options: &ScanOptions) -> ApplicationResult<ImportReport> {
        let mut report = ImportReport::new();
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut queue: VecDeque<(PathBuf, usize)> = VecDeque::new();

        for p in &options.paths {
            let path = normalize(Path::new(&expand_env_vars(p)));
            if self.first_visit(&path, &mut seen)? {
                queue.push_back((path, 0));
            }
        }

        while let Some((path, depth)) = queue.pop_front() {
            let imports = self.scan_file(&path, options.include_stdlib)?;
            trace!("scan: {} at depth {}", path.display(), depth);

            if depth < options.depth_limit {
                for dep in self.local_dependencies(&path, &imports) {
                    let dep = normalize(&dep);
                    if self.first_visit(&dep, &mut seen)? {
                        queue.push_back((dep, depth + 1));
                    }
                }
            }
            report.insert(path.to_string_lossy().into_owned(), imports);
        }

        debug!("scan: {} files", report.len());
        Ok(report)
    }

    fn first_visit(&self, path: &Path, seen: &mut HashSet<PathBuf>) -> ApplicationResult<bool> {
        let canonical = self
            .fs
            .canonicalize(path)
            .with_path_context("resolve", path)?;
        Ok(seen.insert(canonical))
    }

    /// Local files that `file`'s imports resolve to, in a stable order.
    pub fn local_dependencies(&self, file: &Path, imports: &FileImports) -> Vec<PathBuf> {
        let file_dir = file.parent().unwrap_or(Path::new(""));
        let root = self.settings.project_dir.as_path();
        let mut found = Vec::new();

        for module in &imports.library_dependencies {
            if is_stdlib_module(module) {
                continue;
            }
            let Some((dots, rel)) = module_path(module) else {
                continue;
            };
            let candidate = if dots > 0 {
                Some(relative_to(file_dir, dots, &rel))
            } else {
                [join(file_dir, &rel), join(root, &rel)]
                    .into_iter()
                    .find(|p| self.fs.exists(p))
            };
            if let Some(p) = candidate.filter(|p| self.fs.exists(p)) {
                found.push(p);
            }
        }

        for submodule in &imports.specific_submodules_imported {
            if is_stdlib_module(submodule) {
                continue;
            }
            let Some((dots, rel)) = module_path(submodule) else {
                continue;
            };
            let candidate = if dots > 0 {
                relative_to(file_dir, dots, &rel)
            } else {
                join(root, &rel)
            };
            if self.fs.is_file(&candidate) {
                found.push(candidate);
            }
        }
        found
    }
}

/// Render a report as JSON with 4-space indentation.
pub fn report_to_json(report: &ImportReport) -> ApplicationResult<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    report
        .serialize(&mut ser)
        .map_err(|e| ApplicationError::OperationFailed {
            context: "serialize import report".into(),
            source: Box::new(e),
        })?;
    String::from_utf8(buf).map_err(|e| ApplicationError::OperationFailed {
        context: "serialize import report".into(),
        source: Box::new(e),
    })
}

/// Split `..a.b` into (2, `a/b.py`). None for bare dots or star imports.
fn module_path(module: &str) -> Option<(usize, PathBuf)> {
    let rest = module.trim_start_matches('.');
    let dots = module.len() - rest.len();
    if rest.is_empty() || rest.split('.').any(|part| part.is_empty() || part == "*") {
        return None;
    }
    let mut path: PathBuf = rest.split('.').collect();
    path.set_extension("py");
    Some((dots, path))
}

/// `base` joined with `rel`, without a leading `./` when base is the cwd.
fn join(base: &Path, rel: &Path) -> PathBuf {
    if base == Path::new(".") {
        rel.to_path_buf()
    } else {
        base.join(rel)
    }
}

/// Drop `.` and fold `..` into the preceding component, without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// One dot is the file's own package; each further dot goes up a level.
fn relative_to(file_dir: &Path, dots: usize, rel: &Path) -> PathBuf {
    let mut base = file_dir.to_path_buf();
    for _ in 1..dots {
        base.push("..");
    }
    join(&base, rel)
}
