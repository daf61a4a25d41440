//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("{0}")]
    Usage(String),

    #[error("round-trip mismatch: {0}")]
    CheckFailed(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::CheckFailed(_) => crate::exitcode::CHECK_FAILED,
            CliError::Application(e) => match e {
                ApplicationError::Domain(_)
                | ApplicationError::Parse(_)
                | ApplicationError::Script { .. } => crate::exitcode::DATAERR,
                ApplicationError::InvalidPath(_) => crate::exitcode::USAGE,
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                ApplicationError::OperationFailed { source, .. } => {
                    match source.downcast_ref::<std::io::Error>() {
                        Some(io) if io.kind() == std::io::ErrorKind::NotFound => {
                            crate::exitcode::NOINPUT
                        }
                        _ => crate::exitcode::IOERR,
                    }
                }
            },
        }
    }
}
