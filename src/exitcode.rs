//! Process exit codes, following BSD sysexits.h where one fits

/// `check` found a value that does not round-trip
pub const CHECK_FAILED: i32 = 1;

/// Command line usage error, including node paths that resolve to nothing
pub const USAGE: i32 = 64;

/// Malformed navigation value or rejected tree operation
pub const DATAERR: i32 = 65;

/// Navigation file or drag script does not exist
pub const NOINPUT: i32 = 66;

/// Input/output error
pub const IOERR: i32 = 74;

/// Configuration error
pub const CONFIG: i32 = 78;
