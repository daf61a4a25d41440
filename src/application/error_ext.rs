//! Context for I/O failures around nav files, drag scripts and temp files.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Turns `io::Result` into `ApplicationResult`, recording what was attempted.
///
/// The I/O error stays reachable as the `source`, so callers can still tell
/// a missing file from other failures.
pub trait IoResultExt<T> {
    /// `action` plus the path it touched, e.g. `read nav file: nav.json`.
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;

    fn with_context(self, action: &str) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.with_context(&format!("{}: {}", action, path.display()))
    }

    fn with_context(self, action: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: action.to_string(),
            source: Box::new(e),
        })
    }
}
