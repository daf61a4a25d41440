//! Tree rendering for terminal output.

use termtree::Tree;
use tracing::instrument;

use crate::application::NavBuilder;
use crate::domain::{NodeFields, NodeForm, NodeId, Parent, TreeModel};

pub trait TreeDisplay {
    fn to_tree_string(&self) -> Tree<String>;
}

impl<A: NodeForm> TreeDisplay for NavBuilder<A> {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        let tree = self.tree();
        let label = |id: NodeId| {
            self.form(id)
                .map(|form| node_label(&form.serialize()))
                .unwrap_or_else(|_| id.to_string())
        };

        fn build<F: Fn(NodeId) -> String>(tree: &TreeModel, id: NodeId, label: &F) -> Tree<String> {
            let leaves: Vec<_> = tree
                .children(Parent::Node(id))
                .unwrap_or(&[])
                .iter()
                .map(|&child| build(tree, child, label))
                .collect();
            Tree::new(label(id)).with_leaves(leaves)
        }

        let roots: Vec<_> = tree
            .roots()
            .iter()
            .map(|&root| build(tree, root, &label))
            .collect();
        let title = if roots.is_empty() {
            "(empty)".to_string()
        } else {
            ".".to_string()
        };
        Tree::new(title).with_leaves(roots)
    }
}

/// `label (slug) [type]`, leaving out whatever is missing.
pub fn node_label(fields: &NodeFields) -> String {
    let get = |name: &str| fields.get(name).and_then(|v| v.as_str()).filter(|s| !s.is_empty());
    let mut out = get("label").unwrap_or("<unlabelled>").to_string();
    if let Some(slug) = get("slug") {
        out.push_str(&format!(" ({})", slug));
    }
    if let Some(kind) = get("type") {
        out.push_str(&format!(" [{}]", kind));
    }
    out
}
