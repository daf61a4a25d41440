//! Plain nested-list value format and the recursion between it and the tree.
//!
//! A value is an ordered list of objects. Each object carries the node's field
//! values and, only when the node has descendants, a `children` list of the
//! same shape. A childless node never gets an empty `children` key.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::error::DomainResult;
use crate::domain::form::{FormSpec, NodeFields, NodeForm};
use crate::domain::id::{NodeId, NodeRegistry};
use crate::domain::tree::{Parent, TreeModel};

pub const CHILDREN_KEY: &str = "children";

/// One node of the exchanged value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeValue {
    #[serde(flatten)]
    pub fields: NodeFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeValue>>,
}

impl NodeValue {
    pub fn leaf(fields: NodeFields) -> Self {
        Self {
            fields,
            children: None,
        }
    }

    /// Attaches `children`; an empty list leaves the node childless.
    pub fn with_children(mut self, children: Vec<NodeValue>) -> Self {
        self.children = if children.is_empty() {
            None
        } else {
            Some(children)
        };
        self
    }

    pub fn children(&self) -> &[NodeValue] {
        self.children.as_deref().unwrap_or(&[])
    }
}

/// Parses a value.
///
/// Anything that is not a list at the top level (blank input, `null`, an
/// object, a scalar) means "no nodes". Malformed JSON and malformed list
/// entries are errors.
pub fn parse_value(input: &str) -> serde_json::Result<Vec<NodeValue>> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(input)? {
        list @ Value::Array(_) => serde_json::from_value(list),
        other => {
            debug!("top-level value is not a list, treating as empty: {}", other);
            Ok(Vec::new())
        }
    }
}

/// Total number of nodes in a value, descendants included.
pub fn count_nodes(nodes: &[NodeValue]) -> usize {
    nodes.iter().map(|n| 1 + count_nodes(n.children())).sum()
}

/// Creates one leaf under `parent`: fresh id, new form, structural insert, binding.
#[instrument(level = "trace", skip(tree, registry, spec, data))]
pub fn add_node<A: NodeForm>(
    tree: &mut TreeModel,
    registry: &mut NodeRegistry<A>,
    spec: &FormSpec,
    parent: Parent,
    data: NodeFields,
) -> DomainResult<NodeId> {
    // Fail on a bad parent before burning an id
    tree.children(parent)?;
    let id = registry.next_id()?;
    let form = A::construct(spec, data);
    tree.push(parent, id)?;
    registry.register(id, form)?;
    Ok(id)
}

/// Builds nodes from `nodes` under `parent`, depth-first, keeping input order.
///
/// Returns the ids of the top-level nodes created. An empty slice is a no-op.
#[instrument(level = "debug", skip(tree, registry, spec, nodes), fields(count = nodes.len()))]
pub fn apply_value<A: NodeForm>(
    tree: &mut TreeModel,
    registry: &mut NodeRegistry<A>,
    spec: &FormSpec,
    parent: Parent,
    nodes: &[NodeValue],
) -> DomainResult<Vec<NodeId>> {
    let mut created = Vec::with_capacity(nodes.len());
    for node in nodes {
        let id = add_node(tree, registry, spec, parent, node.fields.clone())?;
        apply_value(tree, registry, spec, Parent::Node(id), node.children())?;
        created.push(id);
    }
    Ok(created)
}

/// Walks the forest pre-order and collects each form's values.
#[instrument(level = "debug", skip(tree, registry))]
pub fn serialize<A: NodeForm>(
    tree: &TreeModel,
    registry: &NodeRegistry<A>,
) -> DomainResult<Vec<NodeValue>> {
    let nodes = serialize_children(tree, registry, tree.roots())?;
    debug!("serialized {} top-level nodes", nodes.len());
    Ok(nodes)
}

fn serialize_children<A: NodeForm>(
    tree: &TreeModel,
    registry: &NodeRegistry<A>,
    ids: &[NodeId],
) -> DomainResult<Vec<NodeValue>> {
    ids.iter()
        .map(|&id| {
            let mut fields = registry.lookup(id)?.serialize();
            fields.shift_remove(CHILDREN_KEY);
            let children = serialize_children(tree, registry, tree.children(Parent::Node(id))?)?;
            Ok(NodeValue::leaf(fields).with_children(children))
        })
        .collect()
}
