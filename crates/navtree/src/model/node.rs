use serde::{ser::SerializeTuple, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt::{self, Display};

use super::NodeDecoder;

/// One entry in a documentation table of contents.
///
/// Serializes to the generator's `[label, target, children]` form, where a leaf
/// carries `null` and a deferred entry carries its subtree key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavNode {
    /// Display text of the entry.
    pub label: String,
    /// Page URL, optionally followed by an `#anchor`.
    pub target: String,
    /// Child entries in document order, empty for leaves.
    pub children: Vec<NavNode>,
    /// Key of the separately shipped script holding this entry's children, while
    /// they have not been loaded.
    pub subtree: Option<String>,
}

impl NavNode {
    pub fn new(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: target.into(),
            children: Vec::new(),
            subtree: None,
        }
    }

    pub fn with_children(mut self, children: Vec<NavNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_subtree(mut self, key: impl Into<String>) -> Self {
        self.subtree = Some(key.into());
        self
    }

    /// The entry's children. Leaves and unresolved deferred entries yield an empty slice.
    pub fn children(&self) -> &[NavNode] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.subtree.is_none()
    }

    pub fn is_deferred(&self) -> bool {
        self.subtree.is_some()
    }

    /// The page part of the target, without any anchor.
    pub fn page(&self) -> &str {
        self.target
            .split_once('#')
            .map_or(self.target.as_str(), |(page, _)| page)
    }

    pub fn anchor(&self) -> Option<&str> {
        self.target.split_once('#').map(|(_, anchor)| anchor)
    }
}

impl Serialize for NavNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut entry = serializer.serialize_tuple(3)?;
        entry.serialize_element(&self.label)?;
        entry.serialize_element(&self.target)?;

        match &self.subtree {
            _ if !self.children.is_empty() => entry.serialize_element(&self.children)?,
            Some(key) => entry.serialize_element(key)?,
            None => entry.serialize_element(&())?,
        }

        entry.end()
    }
}

impl<'de> Deserialize<'de> for NavNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let raw = Value::deserialize(deserializer)?;

        NodeDecoder::new("entry")
            .decode_node(&raw, &NodePath::default())
            .map_err(D::Error::custom)
    }
}

/// Child positions leading from the root sequence down to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn child(&self, position: usize) -> Self {
        let mut indices = Vec::with_capacity(self.0.len() + 1);
        indices.extend_from_slice(&self.0);
        indices.push(position);

        Self(indices)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.0.split_last()?;

        Some(Self(parent.to_vec()))
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl Display for NodePath {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for position in &self.0 {
            write!(formatter, "[{}]", position)?;
        }

        Ok(())
    }
}
