//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::id::NodeId;
use crate::domain::tree::Parent;

/// Domain errors are contract violations by the caller: an id or index that
/// does not fit the current tree. They are surfaced immediately, never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown node id: {0}")]
    UnknownId(NodeId),

    #[error("node id already bound: {0}")]
    DuplicateId(NodeId),

    #[error("index {index} out of bounds for {len} children")]
    InvalidIndex { index: usize, len: usize },

    #[error("node identity space exhausted")]
    IdsExhausted,

    #[error("unknown parent: {0}")]
    UnknownParent(NodeId),

    #[error("cannot move node {node} under {parent}: target is inside its own subtree")]
    CyclicMove { node: NodeId, parent: Parent },

    #[error("invalid value for field '{field}': {message}")]
    Form { field: String, message: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
