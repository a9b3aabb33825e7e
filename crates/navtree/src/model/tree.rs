use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{decode::validate_nodes, NavNode, NodeDecoder, NodePath};
use crate::{config::DEFAULT_TREE_VAR, error::NavError};

/// The root sequence of a documentation table of contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NavTree {
    roots: Vec<NavNode>,
}

impl NavTree {
    /// Builds a tree from entries constructed in code, checking the same
    /// invariants enforced when decoding generator output.
    pub fn new(roots: Vec<NavNode>) -> Result<Self, NavError> {
        validate_nodes(DEFAULT_TREE_VAR, &roots, &NodePath::default())?;

        Ok(Self { roots })
    }

    pub(crate) fn decode(var: &str, value: &Value) -> Result<Self, NavError> {
        let roots = NodeDecoder::new(var).decode_list(value, &NodePath::default(), true)?;

        Ok(Self { roots })
    }

    pub fn roots(&self) -> &[NavNode] {
        &self.roots
    }

    pub(crate) fn roots_mut(&mut self) -> &mut [NavNode] {
        &mut self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of entries at every depth.
    pub fn len(&self) -> usize {
        self.walk().count()
    }

    pub fn get(&self, path: &NodePath) -> Option<&NavNode> {
        let (first, rest) = path.indices().split_first()?;

        rest.iter()
            .try_fold(self.roots.get(*first)?, |node, &position| {
                node.children.get(position)
            })
    }

    /// Every entry from the root sequence down to the one at `path`.
    pub fn breadcrumb(&self, path: &NodePath) -> Option<Vec<&NavNode>> {
        let mut siblings = self.roots.as_slice();
        let mut nodes = Vec::with_capacity(path.depth());

        for &position in path.indices() {
            let node = siblings.get(position)?;
            nodes.push(node);
            siblings = &node.children;
        }

        (!nodes.is_empty()).then_some(nodes)
    }

    /// Visits every entry in document order.
    pub fn walk(&self) -> Walk<'_> {
        let stack = self
            .roots
            .iter()
            .enumerate()
            .rev()
            .map(|(position, node)| (NodePath::from(vec![position]), node))
            .collect();

        Walk { stack }
    }

    /// Distinct keys of unresolved subtrees, in document order.
    pub fn deferred_keys(&self) -> Vec<&str> {
        let mut keys = Vec::new();

        for (_, node) in self.walk() {
            if let Some(key) = node.subtree.as_deref() {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }

        keys
    }

    /// Replaces every entry deferring to `key` with one holding `children`.
    /// Returns how many entries were resolved.
    pub(crate) fn graft(&mut self, key: &str, children: &[NavNode]) -> usize {
        graft_nodes(&mut self.roots, key, children)
    }
}

fn graft_nodes(nodes: &mut [NavNode], key: &str, children: &[NavNode]) -> usize {
    let mut grafted = 0;

    for node in nodes {
        if node.subtree.as_deref() == Some(key) {
            node.subtree = None;
            node.children = children.to_vec();
            grafted += 1;
        } else {
            grafted += graft_nodes(&mut node.children, key, children);
        }
    }

    grafted
}

impl<'de> Deserialize<'de> for NavTree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let raw = Value::deserialize(deserializer)?;

        NavTree::decode(DEFAULT_TREE_VAR, &raw).map_err(D::Error::custom)
    }
}

/// Pre-order iterator over a [`NavTree`], yielding each entry with its position.
pub struct Walk<'a> {
    stack: Vec<(NodePath, &'a NavNode)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (NodePath, &'a NavNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, node) = self.stack.pop()?;

        self.stack.extend(
            node.children
                .iter()
                .enumerate()
                .rev()
                .map(|(position, child)| (path.child(position), child)),
        );

        Some((path, node))
    }
}
