//! Ordered forest of node identities.
//!
//! Nodes live in a generational arena, addressed through an id -> index map.
//! Each node owns its ordered child list. Parent linkage is never stored; it
//! is derived from the structure when needed, so a move cannot leave a stale
//! back-reference behind.

use std::collections::HashMap;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::id::NodeId;

/// Insertion target: the forest root or an existing node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parent {
    Root,
    Node(NodeId),
}

impl fmt::Display for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parent::Root => write!(f, "root"),
            Parent::Node(id) => write!(f, "{}", id),
        }
    }
}

impl From<NodeId> for Parent {
    fn from(id: NodeId) -> Self {
        Parent::Node(id)
    }
}

/// Structural record of one node: identity plus ordered children.
#[derive(Debug)]
pub struct TreeNode {
    pub id: NodeId,
    pub children: Vec<NodeId>,
}

/// The authoritative ordered forest.
#[derive(Debug)]
pub struct TreeModel {
    arena: Arena<TreeNode>,
    index: HashMap<NodeId, Index>,
    roots: Vec<NodeId>,
}

impl Default for TreeModel {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeModel {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            index: HashMap::new(),
            roots: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, id: NodeId) -> Option<&TreeNode> {
        self.index.get(&id).and_then(|&idx| self.arena.get(idx))
    }

    /// Ordered children of `parent`.
    pub fn children(&self, parent: Parent) -> DomainResult<&[NodeId]> {
        match parent {
            Parent::Root => Ok(&self.roots),
            Parent::Node(id) => self
                .get_node(id)
                .map(|node| node.children.as_slice())
                .ok_or(DomainError::UnknownParent(id)),
        }
    }

    fn children_mut(&mut self, parent: Parent) -> DomainResult<&mut Vec<NodeId>> {
        match parent {
            Parent::Root => Ok(&mut self.roots),
            Parent::Node(id) => self
                .index
                .get(&id)
                .and_then(|&idx| self.arena.get_mut(idx))
                .map(|node| &mut node.children)
                .ok_or(DomainError::UnknownParent(id)),
        }
    }

    /// Inserts a new leaf at `index` under `parent`.
    #[instrument(level = "trace", skip(self))]
    pub fn insert(&mut self, parent: Parent, index: usize, id: NodeId) -> DomainResult<()> {
        let len = self.children(parent)?.len();
        if index > len {
            return Err(DomainError::InvalidIndex { index, len });
        }
        if self.contains(id) {
            return Err(DomainError::DuplicateId(id));
        }

        let idx = self.arena.insert(TreeNode {
            id,
            children: Vec::new(),
        });
        self.index.insert(id, idx);
        self.children_mut(parent)?.insert(index, id);
        debug!("inserted {} under {} at {}", id, parent, index);
        Ok(())
    }

    /// Appends a new leaf as the last child of `parent`.
    pub fn push(&mut self, parent: Parent, id: NodeId) -> DomainResult<()> {
        let len = self.children(parent)?.len();
        self.insert(parent, len, id)
    }

    /// Parent and sibling index of `id`, derived from the structure.
    #[instrument(level = "trace", skip(self))]
    pub fn position(&self, id: NodeId) -> DomainResult<(Parent, usize)> {
        if !self.contains(id) {
            return Err(DomainError::UnknownId(id));
        }
        if let Some(pos) = self.roots.iter().position(|&r| r == id) {
            return Ok((Parent::Root, pos));
        }
        self.arena
            .iter()
            .find_map(|(_, node)| {
                node.children
                    .iter()
                    .position(|&c| c == id)
                    .map(|pos| (Parent::Node(node.id), pos))
            })
            .ok_or_else(|| DomainError::UnknownId(id))
    }

    /// True when `candidate` is `ancestor` itself or lies below it.
    pub fn is_in_subtree(&self, ancestor: NodeId, candidate: NodeId) -> bool {
        self.subtree(ancestor).any(|(_, node)| node.id == candidate)
    }

    /// Relocates `id` with its whole subtree.
    ///
    /// `new_index` counts the destination siblings after `id` has left its
    /// old slot. All checks run before anything is mutated.
    #[instrument(level = "debug", skip(self))]
    pub fn move_node(&mut self, id: NodeId, new_parent: Parent, new_index: usize) -> DomainResult<()> {
        let (old_parent, old_index) = self.position(id)?;
        let dest_len = self.children(new_parent)?.len();
        if let Parent::Node(target) = new_parent {
            if self.is_in_subtree(id, target) {
                return Err(DomainError::CyclicMove {
                    node: id,
                    parent: new_parent,
                });
            }
        }
        let len = if old_parent == new_parent {
            dest_len - 1
        } else {
            dest_len
        };
        if new_index > len {
            return Err(DomainError::InvalidIndex {
                index: new_index,
                len,
            });
        }

        self.children_mut(old_parent)?.remove(old_index);
        self.children_mut(new_parent)?.insert(new_index, id);
        debug!(
            "moved {} from {}[{}] to {}[{}]",
            id, old_parent, old_index, new_parent, new_index
        );
        Ok(())
    }

    /// Deletes `id` and its subtree, returning the removed ids in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, id: NodeId) -> DomainResult<Vec<NodeId>> {
        let (parent, pos) = self.position(id)?;
        let removed: Vec<NodeId> = self.subtree(id).map(|(_, node)| node.id).collect();

        self.children_mut(parent)?.remove(pos);
        for node_id in &removed {
            if let Some(idx) = self.index.remove(node_id) {
                self.arena.remove(idx);
            }
        }
        debug!("removed {} nodes starting at {}", removed.len(), id);
        Ok(removed)
    }

    /// Pre-order walk over the whole forest, yielding `(depth, node)`.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, &self.roots)
    }

    /// Pre-order walk over `id` and its descendants. Empty for unknown ids.
    pub fn subtree(&self, id: NodeId) -> TreeIterator<'_> {
        let start = if self.contains(id) { vec![id] } else { vec![] };
        TreeIterator::new(self, &start)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&root| self.calculate_depth(root))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, id: NodeId) -> usize {
        if let Some(node) = self.get_node(id) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Sibling-index path from the root down to `id`.
    pub fn path_of(&self, id: NodeId) -> DomainResult<Vec<usize>> {
        let mut path = Vec::new();
        let mut current = id;
        loop {
            let (parent, pos) = self.position(current)?;
            path.push(pos);
            match parent {
                Parent::Root => break,
                Parent::Node(p) => current = p,
            }
        }
        path.reverse();
        Ok(path)
    }

    /// Follows a sibling-index path from the root. An empty path resolves to nothing.
    pub fn resolve_path(&self, path: &[usize]) -> Option<NodeId> {
        let mut parent = Parent::Root;
        let mut found = None;
        for &pos in path {
            let id = *self.children(parent).ok()?.get(pos)?;
            found = Some(id);
            parent = Parent::Node(id);
        }
        found
    }
}

pub struct TreeIterator<'a> {
    tree: &'a TreeModel,
    stack: Vec<(usize, NodeId)>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a TreeModel, start: &[NodeId]) -> Self {
        // Reverse so the first sibling is popped first
        let stack = start.iter().rev().map(|&id| (0, id)).collect();
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (usize, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((depth, id)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(id) {
                for &child in node.children.iter().rev() {
                    self.stack.push((depth + 1, child));
                }
                return Some((depth, node));
            }
        }
        None
    }
}
