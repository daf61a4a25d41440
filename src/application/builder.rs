//! Navigation builder: one editable tree instance.
//!
//! Each builder owns its own registry, tree and drag controller, so two
//! builders never share identities or structure.

use itertools::Itertools;
use tracing::{debug, info, instrument};

use crate::application::script::{parse_path, ScriptStep};
use crate::application::{ApplicationError, ApplicationResult, FieldForm, ScriptLine};
use crate::domain::drag::layout;
use crate::domain::value::{self, NodeValue};
use crate::domain::{
    DragController, DragEvent, DragOutcome, DragPhase, DragSession, FormSpec, HoverTarget,
    LayoutRow, NodeFields, NodeForm, NodeId, NodeRegistry, Parent, PressTarget, SessionId,
    TreeModel,
};

#[derive(Debug)]
pub struct NavBuilder<A = FieldForm> {
    spec: FormSpec,
    registry: NodeRegistry<A>,
    tree: TreeModel,
    drag: DragController,
}

impl<A: NodeForm> NavBuilder<A> {
    pub fn new(spec: FormSpec) -> Self {
        Self {
            spec,
            registry: NodeRegistry::new(),
            tree: TreeModel::new(),
            drag: DragController::new(),
        }
    }

    /// Builder pre-populated from a value.
    pub fn with_value(spec: FormSpec, nodes: &[NodeValue]) -> ApplicationResult<Self> {
        let mut builder = Self::new(spec);
        builder.apply_value(nodes)?;
        Ok(builder)
    }

    /// Builder pre-populated from JSON. Blank input, `null` and non-list values give an empty tree.
    pub fn from_json(spec: FormSpec, input: &str) -> ApplicationResult<Self> {
        let nodes = value::parse_value(input)?;
        Self::with_value(spec, &nodes)
    }

    pub fn spec(&self) -> &FormSpec {
        &self.spec
    }

    pub fn tree(&self) -> &TreeModel {
        &self.tree
    }

    pub fn form(&self, id: NodeId) -> ApplicationResult<&A> {
        Ok(self.registry.lookup(id)?)
    }

    pub fn form_mut(&mut self, id: NodeId) -> ApplicationResult<&mut A> {
        Ok(self.registry.lookup_mut(id)?)
    }

    /// Appends a new node with `data` as the last child of `parent`.
    #[instrument(level = "debug", skip(self, data))]
    pub fn add_node(&mut self, parent: Parent, data: NodeFields) -> ApplicationResult<NodeId> {
        let id = value::add_node(&mut self.tree, &mut self.registry, &self.spec, parent, data)?;
        info!("added node {} under {}", id, parent);
        Ok(id)
    }

    /// Appends the nodes of `nodes` at the root, depth-first in input order.
    #[instrument(level = "debug", skip(self, nodes))]
    pub fn apply_value(&mut self, nodes: &[NodeValue]) -> ApplicationResult<Vec<NodeId>> {
        Ok(value::apply_value(
            &mut self.tree,
            &mut self.registry,
            &self.spec,
            Parent::Root,
            nodes,
        )?)
    }

    pub fn serialize(&self) -> ApplicationResult<Vec<NodeValue>> {
        Ok(value::serialize(&self.tree, &self.registry)?)
    }

    /// Serializes to JSON, pretty-printed with `indent` spaces when given.
    pub fn to_json(&self, indent: Option<usize>) -> ApplicationResult<String> {
        let nodes = self.serialize()?;
        match indent {
            None => Ok(serde_json::to_string(&nodes)?),
            Some(width) => {
                let indent = " ".repeat(width);
                let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
                let mut out = Vec::new();
                let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
                serde::Serialize::serialize(&nodes, &mut ser)?;
                String::from_utf8(out).map_err(|e| ApplicationError::OperationFailed {
                    context: "encode json".to_string(),
                    source: Box::new(e),
                })
            }
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn move_node(&mut self, id: NodeId, parent: Parent, index: usize) -> ApplicationResult<()> {
        self.tree.move_node(id, parent, index)?;
        Ok(())
    }

    /// Deletes a node with its subtree and drops their forms. Ids stay retired.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_node(&mut self, id: NodeId) -> ApplicationResult<Vec<NodeId>> {
        let removed = self.tree.remove(id)?;
        for &gone in &removed {
            self.registry.remove(gone)?;
        }
        Ok(removed)
    }

    pub fn handle(&mut self, event: DragEvent) -> DragOutcome {
        self.drag.handle(&mut self.tree, event)
    }

    pub fn placeholder_measured(&mut self, session: SessionId, height: f32) -> bool {
        self.drag.placeholder_measured(session, height)
    }

    pub fn drag_phase(&self) -> DragPhase {
        self.drag.phase()
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.session()
    }

    /// Visual rows, reflecting any live drag.
    pub fn layout(&self) -> Vec<LayoutRow> {
        layout(&self.tree, self.drag.session())
    }

    /// Resolves a dot-separated sibling-index path such as `0.2`.
    pub fn resolve_path(&self, path: &str) -> ApplicationResult<NodeId> {
        parse_path(path)
            .and_then(|p| self.tree.resolve_path(&p))
            .ok_or_else(|| ApplicationError::InvalidPath(path.to_string()))
    }

    /// Like `resolve_path`, with `root` naming the forest root.
    pub fn resolve_parent(&self, path: &str) -> ApplicationResult<Parent> {
        if path.trim() == "root" {
            Ok(Parent::Root)
        } else {
            self.resolve_path(path).map(Parent::Node)
        }
    }

    fn resolve_indexes(&self, path: &[usize]) -> ApplicationResult<NodeId> {
        self.tree
            .resolve_path(path)
            .ok_or_else(|| ApplicationError::InvalidPath(path.iter().join(".")))
    }

    /// Feeds a parsed drag script through the controller.
    ///
    /// Paths resolve against the tree as it is when the step runs; `measure`
    /// targets the most recently started session.
    #[instrument(level = "debug", skip(self, steps), fields(steps = steps.len()))]
    pub fn replay(&mut self, steps: &[ScriptLine]) -> ApplicationResult<Vec<DragOutcome>> {
        let mut outcomes = Vec::with_capacity(steps.len());
        let mut last_session = None;
        for ScriptLine { line, step } in steps {
            let at_line = |e: ApplicationError| ApplicationError::Script {
                line: *line,
                message: e.to_string(),
            };
            let event = match step {
                ScriptStep::Press(None) => DragEvent::Press(PressTarget::Elsewhere),
                ScriptStep::Press(Some(p)) => {
                    DragEvent::Press(PressTarget::Handle(self.resolve_indexes(p).map_err(at_line)?))
                }
                ScriptStep::Start(p) => DragEvent::DragStart(self.resolve_indexes(p).map_err(at_line)?),
                ScriptStep::EnterNode(p) => {
                    DragEvent::DragEnter(HoverTarget::Node(self.resolve_indexes(p).map_err(at_line)?))
                }
                ScriptStep::EnterContainer(None) => {
                    DragEvent::DragEnter(HoverTarget::Container(Parent::Root))
                }
                ScriptStep::EnterContainer(Some(p)) => DragEvent::DragEnter(HoverTarget::Container(
                    Parent::Node(self.resolve_indexes(p).map_err(at_line)?),
                )),
                ScriptStep::EnterNone => DragEvent::DragEnter(HoverTarget::Other),
                ScriptStep::Measure(height) => {
                    if let Some(session) = last_session {
                        let applied = self.placeholder_measured(session, *height);
                        debug!("line {}: measurement applied: {}", line, applied);
                    }
                    continue;
                }
                ScriptStep::End => DragEvent::DragEnd,
                ScriptStep::Cancel => DragEvent::Cancel,
            };
            let outcome = self.handle(event);
            if let DragOutcome::Started { session, .. } = outcome {
                last_session = Some(session);
            }
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}
