//! Application services

pub mod imports;
pub mod lint;
pub mod publish;
pub mod toolchain;

pub use imports::{report_to_json, ImportReport, ImportService, ScanOptions, DEFAULT_DEPTH};
pub use lint::LintService;
pub use publish::PublishService;
pub use toolchain::ToolChain;
