//! Domain layer: tree structure, identities, drag state machine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod drag;
pub mod error;
pub mod form;
pub mod id;
pub mod tree;
pub mod value;

pub use drag::{
    layout, DragController, DragEvent, DragOutcome, DragPhase, DragSession, HoverTarget,
    LayoutRow, Placeholder, PressTarget, SessionId,
};
pub use error::{DomainError, DomainResult};
pub use form::{FieldKind, FieldSpec, FormSpec, NodeFields, NodeForm};
pub use id::{NodeId, NodeRegistry};
pub use tree::{Parent, TreeModel, TreeNode};
pub use value::{count_nodes, parse_value, NodeValue};
