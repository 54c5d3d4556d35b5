//! Process exit codes
//!
//! Tool failures are passed through verbatim; the remaining codes follow
//! shell conventions (2, 127, 128+N) and BSD sysexits.h.

/// Generic failure (e.g., missing publish credentials)
pub const FAILURE: i32 = 1;

/// Command line usage error (unknown target, unexpected arguments)
pub const USAGE: i32 = 2;

/// Cannot open input (package directory or sources missing)
pub const NOINPUT: i32 = 66;

/// Internal software error
pub const SOFTWARE: i32 = 70;

/// Input/output error
pub const IOERR: i32 = 74;

/// Configuration error
pub const CONFIG: i32 = 78;

/// External tool not found on PATH
pub const NOT_FOUND: i32 = 127;

/// Base for "terminated by signal N" (128 + N)
pub const SIGNAL_BASE: i32 = 128;
