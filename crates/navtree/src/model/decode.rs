use serde_json::Value;
use std::fmt::Display;

use super::{NavNode, NodePath};
use crate::error::NavError;

/// Turns generator literals into navigation entries, naming the variable they
/// were read from in error locations.
pub(crate) struct NodeDecoder<'a> {
    var: &'a str,
}

impl<'a> NodeDecoder<'a> {
    pub(crate) fn new(var: &'a str) -> Self {
        Self { var }
    }

    /// Decodes a sequence of entries. Only a root sequence may be empty.
    pub(crate) fn decode_list(
        &self,
        value: &Value,
        path: &NodePath,
        allow_empty: bool,
    ) -> Result<Vec<NavNode>, NavError> {
        let Value::Array(items) = value else {
            return Err(self.error(
                path,
                format_args!("expected an array of entries, found {}", kind(value)),
            ));
        };

        if items.is_empty() && !allow_empty {
            return Err(self.error(path, "children are present but empty"));
        }

        items
            .iter()
            .enumerate()
            .map(|(position, item)| self.decode_node(item, &path.child(position)))
            .collect()
    }

    pub(crate) fn decode_node(&self, value: &Value, path: &NodePath) -> Result<NavNode, NavError> {
        let Value::Array(fields) = value else {
            return Err(self.error(
                path,
                format_args!(
                    "expected a `[label, target, children]` entry, found {}",
                    kind(value)
                ),
            ));
        };

        if !(2..=3).contains(&fields.len()) {
            return Err(self.error(
                path,
                format_args!("expected 2 or 3 fields, found {}", fields.len()),
            ));
        }

        let label = self.string_field(&fields[0], path, "label")?;
        let target = self.string_field(&fields[1], path, "target")?;
        let node = NavNode::new(label, target);

        // NOTE: A missing third field and `null` both mark a leaf.
        match fields.get(2) {
            None | Some(Value::Null) => Ok(node),
            Some(children @ Value::Array(_)) => {
                let children = self.decode_list(children, path, false)?;

                Ok(node.with_children(children))
            }
            Some(Value::String(key)) if key.is_empty() => {
                Err(self.error(path, "subtree key is empty"))
            }
            Some(Value::String(key)) => Ok(node.with_subtree(key.clone())),
            Some(other) => Err(self.error(
                path,
                format_args!(
                    "children must be an array, a subtree key or null, found {}",
                    kind(other)
                ),
            )),
        }
    }

    fn string_field(&self, value: &Value, path: &NodePath, name: &str) -> Result<String, NavError> {
        match value {
            Value::String(text) if text.is_empty() => {
                Err(self.error(path, format_args!("{} is empty", name)))
            }
            Value::String(text) => Ok(text.clone()),
            other => Err(self.error(
                path,
                format_args!("{} must be a string, found {}", name, kind(other)),
            )),
        }
    }

    fn error(&self, path: &NodePath, reason: impl Display) -> NavError {
        NavError::malformed(format_args!("{}{}", self.var, path), reason)
    }
}

/// Checks entries built in code against the invariants decoding enforces.
pub(crate) fn validate_nodes(var: &str, nodes: &[NavNode], path: &NodePath) -> Result<(), NavError> {
    for (position, node) in nodes.iter().enumerate() {
        let path = path.child(position);
        let location = || format!("{}{}", var, path);

        if node.label.is_empty() {
            return Err(NavError::malformed(location(), "label is empty"));
        }

        if node.target.is_empty() {
            return Err(NavError::malformed(location(), "target is empty"));
        }

        match &node.subtree {
            Some(key) if key.is_empty() => {
                return Err(NavError::malformed(location(), "subtree key is empty"));
            }
            Some(_) if !node.children.is_empty() => {
                return Err(NavError::malformed(
                    location(),
                    "entry has both children and a subtree key",
                ));
            }
            _ => validate_nodes(var, &node.children, &path)?,
        }
    }

    Ok(())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
