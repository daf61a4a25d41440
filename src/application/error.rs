//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("invalid navigation value: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("script line {line}: {message}")]
    Script { line: usize, message: String },

    #[error("no node at path: {0}")]
    InvalidPath(String),

    #[error("{context}: {source}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
