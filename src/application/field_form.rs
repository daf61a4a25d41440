//! Default node form: label, slug and type fields.

use serde_json::Value;

use crate::domain::{DomainError, DomainResult, FieldKind, FormSpec, NodeFields, NodeForm};

/// Holds a node's field values against a [`FormSpec`].
///
/// Values given at construction are kept as-is, including fields the form spec does
/// not know, so serialization hands back exactly what came in. Only `set`
/// validates.
#[derive(Debug, Clone)]
pub struct FieldForm {
    spec: FormSpec,
    values: NodeFields,
}

impl NodeForm for FieldForm {
    fn construct(spec: &FormSpec, data: NodeFields) -> Self {
        Self {
            spec: spec.clone(),
            values: data,
        }
    }

    fn serialize(&self) -> NodeFields {
        self.values.clone()
    }
}

impl FieldForm {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    pub fn label(&self) -> Option<&str> {
        self.get("label")
    }

    pub fn slug(&self) -> Option<&str> {
        self.get("slug")
    }

    pub fn kind(&self) -> Option<&str> {
        self.get("type")
    }

    /// Updates one field. Fails for fields outside the form spec and for
    /// single-option values that are not among the options.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> DomainResult<()> {
        let value = value.into();
        let field = self.spec.field(name).ok_or_else(|| DomainError::Form {
            field: name.to_string(),
            message: "not part of the form".to_string(),
        })?;
        check_option(name, &field.kind, &value)?;
        self.values.insert(name.to_string(), Value::String(value));
        Ok(())
    }

    /// Checks every single-option field that currently holds a value.
    pub fn validate(&self) -> DomainResult<()> {
        for field in &self.spec.fields {
            if let Some(value) = self.get(&field.name) {
                check_option(&field.name, &field.kind, value)?;
            }
        }
        Ok(())
    }
}

fn check_option(name: &str, kind: &FieldKind, value: &str) -> DomainResult<()> {
    match kind {
        FieldKind::SingleOption { options } if !options.iter().any(|o| o == value) => {
            Err(DomainError::Form {
                field: name.to_string(),
                message: format!("'{}' is not one of [{}]", value, options.join(", ")),
            })
        }
        _ => Ok(()),
    }
}
