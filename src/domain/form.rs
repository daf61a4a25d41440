//! Node form contract.
//!
//! The tree never looks inside a node's fields. Each node gets a form built
//! from a [`FormSpec`] and its initial data; at serialize time the form hands
//! its current values back as a plain JSON object.

use serde::{Deserialize, Serialize};

/// Plain field values of one node (`label`, `slug`, `type`, plus anything extra).
pub type NodeFields = serde_json::Map<String, serde_json::Value>;

/// Kind of an editable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    SingleOption { options: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Text,
        }
    }

    pub fn single_option(name: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::SingleOption { options },
        }
    }
}

/// Field layout shared by every node form of one builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSpec {
    pub fields: Vec<FieldSpec>,
}

impl Default for FormSpec {
    fn default() -> Self {
        Self::navigation(vec!["page".to_string()])
    }
}

impl FormSpec {
    /// The navigation node layout: `label` and `slug` text, `type` picked from `type_options`.
    pub fn navigation(type_options: Vec<String>) -> Self {
        Self {
            fields: vec![
                FieldSpec::text("label"),
                FieldSpec::text("slug"),
                FieldSpec::single_option("type", type_options),
            ],
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Capability the tree needs from a per-node form.
pub trait NodeForm {
    /// Builds a form for one node. Called once per node at creation time.
    fn construct(spec: &FormSpec, data: NodeFields) -> Self;

    /// Current field values. Called once per node during serialization.
    fn serialize(&self) -> NodeFields;
}
