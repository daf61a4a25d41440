//! Node identities and the per-instance registry binding them to forms.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};

/// Opaque node identity, unique for the lifetime of one tree instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues node identities and owns the id -> form binding.
///
/// One registry exists per builder instance, so separate trees never share
/// an identity space. Ids are never handed out twice, even after removal.
#[derive(Debug)]
pub struct NodeRegistry<A> {
    next: u64,
    forms: BTreeMap<NodeId, A>,
}

impl<A> Default for NodeRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> NodeRegistry<A> {
    pub fn new() -> Self {
        Self {
            next: 0,
            forms: BTreeMap::new(),
        }
    }

    /// Returns a fresh identity, strictly greater than every one issued before.
    ///
    /// `u64::MAX` is never issued; reaching it exhausts the identity space.
    #[instrument(level = "trace", skip(self))]
    pub fn next_id(&mut self) -> DomainResult<NodeId> {
        if self.next == u64::MAX {
            return Err(DomainError::IdsExhausted);
        }
        let id = NodeId(self.next);
        self.next += 1;
        Ok(id)
    }

    /// Binds a form to an identity.
    #[instrument(level = "trace", skip(self, form))]
    pub fn register(&mut self, id: NodeId, form: A) -> DomainResult<()> {
        if self.forms.contains_key(&id) {
            return Err(DomainError::DuplicateId(id));
        }
        // An externally chosen id must not be issued again later
        let after = id.0.checked_add(1).ok_or(DomainError::IdsExhausted)?;
        self.next = self.next.max(after);
        self.forms.insert(id, form);
        debug!("registered {}", id);
        Ok(())
    }

    pub fn lookup(&self, id: NodeId) -> DomainResult<&A> {
        self.forms.get(&id).ok_or(DomainError::UnknownId(id))
    }

    pub fn lookup_mut(&mut self, id: NodeId) -> DomainResult<&mut A> {
        self.forms.get_mut(&id).ok_or(DomainError::UnknownId(id))
    }

    /// Drops the binding for a deleted node. The id stays retired.
    #[instrument(level = "trace", skip(self))]
    pub fn remove(&mut self, id: NodeId) -> DomainResult<A> {
        self.forms.remove(&id).ok_or(DomainError::UnknownId(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.forms.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}
