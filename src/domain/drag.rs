//! Drag-reorder state machine.
//!
//! ```text
//! Idle --press(handle)--> Armed --drag-start(same node)--> Dragging
//!   ^                       |                                 |
//!   +------ press/end ------+        drag-end: commit move ---+
//!   +------------------------------- cancel: discard ---------+
//! ```
//!
//! Committing and Cancelled are not resting states: both happen inside the
//! handler of the terminal event, which always leaves the controller Idle.
//!
//! While dragging, the dragged node stays in the tree but is hidden from the
//! visual layout, and a placeholder marks the drop slot. Placeholder indexes
//! count visible siblings only (never the placeholder, never the hidden
//! dragged node), which is exactly the post-removal index `move_node` expects.

use std::fmt;

use tracing::{debug, instrument, warn};

use crate::domain::error::DomainResult;
use crate::domain::id::NodeId;
use crate::domain::tree::{Parent, TreeModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "drag-{}", self.0)
    }
}

/// Where a press landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressTarget {
    /// The drag handle of a node.
    Handle(NodeId),
    Elsewhere,
}

/// What the pointer entered while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTarget {
    /// Any part of an existing node.
    Node(NodeId),
    /// A child container with no node under the pointer, e.g. an empty child list.
    Container(Parent),
    Other,
}

/// Raw interaction notifications fed by the surrounding widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEvent {
    Press(PressTarget),
    DragStart(NodeId),
    DragEnter(HoverTarget),
    DragEnd,
    /// The platform aborted the gesture (pointer left the window, escape, ...).
    Cancel,
}

/// Visual drop marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placeholder {
    pub parent: Parent,
    pub index: usize,
    /// Height of the dragged row, known only after the deferred measurement.
    pub height: Option<f32>,
}

impl Placeholder {
    fn at(&self, parent: Parent, index: usize) -> bool {
        self.parent == parent && self.index == index
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub id: SessionId,
    pub dragged: NodeId,
    pub placeholder: Placeholder,
}

#[derive(Debug, Clone, PartialEq)]
enum DragState {
    Idle,
    Armed(NodeId),
    Dragging(DragSession),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Armed,
    Dragging,
}

/// Result of feeding one event to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// Event has no meaning in the current state.
    Ignored,
    Armed(NodeId),
    Disarmed,
    /// Drag start suppressed: not armed, wrong node, or a session is already live.
    Rejected,
    /// A session began. The widget should measure the dragged row on the next
    /// turn of its event loop and report back via `placeholder_measured`.
    Started {
        session: SessionId,
        dragged: NodeId,
        placeholder: Placeholder,
    },
    PlaceholderMoved(Placeholder),
    Unchanged,
    /// Drop committed to the tree. `moved` is false for a drop back in place.
    Committed {
        node: NodeId,
        parent: Parent,
        index: usize,
        moved: bool,
    },
    /// Gesture ended without a structural change. `restored` names the node
    /// whose visibility must come back, if a session was live.
    Cancelled { restored: Option<NodeId> },
}

/// Drives a single drag session over one tree.
#[derive(Debug)]
pub struct DragController {
    state: DragState,
    next_session: u64,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragController {
    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
            next_session: 0,
        }
    }

    pub fn phase(&self) -> DragPhase {
        match self.state {
            DragState::Idle => DragPhase::Idle,
            DragState::Armed(_) => DragPhase::Armed,
            DragState::Dragging(_) => DragPhase::Dragging,
        }
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            _ => None,
        }
    }

    /// Applies one event. Only a drag-end in `Dragging` mutates `tree`.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn handle(&mut self, tree: &mut TreeModel, event: DragEvent) -> DragOutcome {
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        let (next, outcome) = match state {
            DragState::Idle => self.on_idle(tree, event),
            DragState::Armed(armed) => self.on_armed(tree, armed, event),
            DragState::Dragging(session) => Self::on_dragging(tree, session, event),
        };
        self.state = next;
        debug!(phase = ?self.phase(), ?outcome, "drag transition");
        outcome
    }

    fn on_idle(&mut self, tree: &TreeModel, event: DragEvent) -> (DragState, DragOutcome) {
        match event {
            DragEvent::Press(PressTarget::Handle(id)) if tree.contains(id) => {
                (DragState::Armed(id), DragOutcome::Armed(id))
            }
            DragEvent::Press(_) | DragEvent::DragEnter(_) => (DragState::Idle, DragOutcome::Ignored),
            DragEvent::DragStart(_) => (DragState::Idle, DragOutcome::Rejected),
            DragEvent::DragEnd | DragEvent::Cancel => {
                (DragState::Idle, DragOutcome::Cancelled { restored: None })
            }
        }
    }

    fn on_armed(
        &mut self,
        tree: &TreeModel,
        armed: NodeId,
        event: DragEvent,
    ) -> (DragState, DragOutcome) {
        match event {
            DragEvent::Press(PressTarget::Handle(id)) if tree.contains(id) => {
                (DragState::Armed(id), DragOutcome::Armed(id))
            }
            DragEvent::Press(_) => (DragState::Idle, DragOutcome::Disarmed),
            DragEvent::DragStart(id) if id == armed => match self.start(tree, id) {
                Ok(session) => {
                    let outcome = DragOutcome::Started {
                        session: session.id,
                        dragged: session.dragged,
                        placeholder: session.placeholder,
                    };
                    (DragState::Dragging(session), outcome)
                }
                Err(e) => {
                    warn!("cannot start drag of {}: {}", id, e);
                    (DragState::Idle, DragOutcome::Rejected)
                }
            },
            DragEvent::DragStart(_) => (DragState::Idle, DragOutcome::Rejected),
            DragEvent::DragEnter(_) => (DragState::Armed(armed), DragOutcome::Ignored),
            DragEvent::DragEnd | DragEvent::Cancel => {
                (DragState::Idle, DragOutcome::Cancelled { restored: None })
            }
        }
    }

    fn on_dragging(
        tree: &mut TreeModel,
        mut session: DragSession,
        event: DragEvent,
    ) -> (DragState, DragOutcome) {
        match event {
            DragEvent::Press(_) => (DragState::Dragging(session), DragOutcome::Ignored),
            DragEvent::DragStart(_) => (DragState::Dragging(session), DragOutcome::Rejected),
            DragEvent::DragEnter(target) => {
                let outcome = match resolve_hover(tree, &session, target) {
                    Some((parent, index)) if !session.placeholder.at(parent, index) => {
                        session.placeholder.parent = parent;
                        session.placeholder.index = index;
                        DragOutcome::PlaceholderMoved(session.placeholder)
                    }
                    _ => DragOutcome::Unchanged,
                };
                (DragState::Dragging(session), outcome)
            }
            DragEvent::DragEnd => (DragState::Idle, commit(tree, &session)),
            DragEvent::Cancel => (
                DragState::Idle,
                DragOutcome::Cancelled {
                    restored: Some(session.dragged),
                },
            ),
        }
    }

    fn start(&mut self, tree: &TreeModel, dragged: NodeId) -> DomainResult<DragSession> {
        // Excluding the dragged node, its own slot index is unchanged
        let (parent, index) = tree.position(dragged)?;
        let id = SessionId(self.next_session);
        self.next_session += 1;
        debug!("{} started for {} at {}[{}]", id, dragged, parent, index);
        Ok(DragSession {
            id,
            dragged,
            placeholder: Placeholder {
                parent,
                index,
                height: None,
            },
        })
    }

    /// Deferred placeholder sizing. Returns false when `session` is no longer live.
    pub fn placeholder_measured(&mut self, session: SessionId, height: f32) -> bool {
        match &mut self.state {
            DragState::Dragging(live) if live.id == session => {
                live.placeholder.height = Some(height);
                true
            }
            _ => {
                debug!("dropping stale measurement for {}", session);
                false
            }
        }
    }
}

/// Number of children of `parent` that are visible while `dragged` is hidden.
fn visible_len(tree: &TreeModel, parent: Parent, dragged: NodeId) -> DomainResult<usize> {
    let children = tree.children(parent)?;
    Ok(children.iter().filter(|&&c| c != dragged).count())
}

/// Hidden while dragging: the dragged node and its whole subtree.
fn is_hidden(tree: &TreeModel, dragged: NodeId, id: NodeId) -> bool {
    tree.is_in_subtree(dragged, id)
}

/// New placeholder slot for a hover, or None to keep the current one.
fn resolve_hover(
    tree: &TreeModel,
    session: &DragSession,
    target: HoverTarget,
) -> Option<(Parent, usize)> {
    let dragged = session.dragged;
    match target {
        HoverTarget::Node(hovered) => {
            if !tree.contains(hovered) || is_hidden(tree, dragged, hovered) {
                return None;
            }
            let (container, raw) = tree.position(hovered).ok()?;
            let dragged_before = tree
                .position(dragged)
                .map(|(p, i)| p == container && i < raw)
                .unwrap_or(false);
            let visible = if dragged_before { raw - 1 } else { raw };

            let placeholder = &session.placeholder;
            if placeholder.parent != container || placeholder.index > visible {
                Some((container, visible))
            } else {
                Some((container, visible + 1))
            }
        }
        HoverTarget::Container(parent) => {
            if let Parent::Node(owner) = parent {
                if !tree.contains(owner) || is_hidden(tree, dragged, owner) {
                    return None;
                }
            }
            let len = visible_len(tree, parent, dragged).ok()?;
            Some((parent, len))
        }
        HoverTarget::Other => None,
    }
}

fn commit(tree: &mut TreeModel, session: &DragSession) -> DragOutcome {
    let Placeholder { parent, index, .. } = session.placeholder;
    let before = tree.position(session.dragged).ok();
    match tree.move_node(session.dragged, parent, index) {
        Ok(()) => {
            let moved = before != Some((parent, index));
            debug!(
                "{} committed {} to {}[{}] (moved: {})",
                session.id, session.dragged, parent, index, moved
            );
            DragOutcome::Committed {
                node: session.dragged,
                parent,
                index,
                moved,
            }
        }
        Err(e) => {
            // An interactive drop has nowhere to report failure; leave the tree as is
            warn!("{} drop discarded: {}", session.id, e);
            DragOutcome::Cancelled {
                restored: Some(session.dragged),
            }
        }
    }
}

/// One row of the visual layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutRow {
    Node { id: NodeId, depth: usize },
    Placeholder { depth: usize, height: Option<f32> },
}

/// Visual rows in display order: the dragged subtree is left out and the
/// placeholder shows at its slot.
pub fn layout(tree: &TreeModel, session: Option<&DragSession>) -> Vec<LayoutRow> {
    let mut rows = Vec::with_capacity(tree.len() + 1);
    layout_children(tree, session, Parent::Root, 0, &mut rows);
    rows
}

fn layout_children(
    tree: &TreeModel,
    session: Option<&DragSession>,
    parent: Parent,
    depth: usize,
    rows: &mut Vec<LayoutRow>,
) {
    let Ok(children) = tree.children(parent) else {
        return;
    };
    let placeholder_row = |rows: &mut Vec<LayoutRow>, index: usize| {
        if let Some(s) = session {
            if s.placeholder.at(parent, index) {
                rows.push(LayoutRow::Placeholder {
                    depth,
                    height: s.placeholder.height,
                });
            }
        }
    };

    let visible = children
        .iter()
        .filter(|&&c| session.map_or(true, |s| s.dragged != c));
    let mut count = 0;
    for &child in visible {
        placeholder_row(rows, count);
        rows.push(LayoutRow::Node { id: child, depth });
        layout_children(tree, session, Parent::Node(child), depth + 1, rows);
        count += 1;
    }
    placeholder_row(rows, count);
}
