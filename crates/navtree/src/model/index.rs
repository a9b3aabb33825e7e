use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::{NavTree, NodePath};
use crate::{config::DEFAULT_INDEX_VAR, error::NavError};

/// Ordered keys naming the first page covered by each lazily loaded index chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NavTreeIndex {
    keys: Vec<String>,
    /// Position of the first key that does not sort after its predecessor.
    #[serde(skip)]
    unordered_at: Option<usize>,
}

impl NavTreeIndex {
    pub fn new(keys: Vec<String>) -> Self {
        let unordered_at = keys
            .windows(2)
            .position(|pair| pair[0] >= pair[1])
            .map(|position| position + 1);

        Self { keys, unordered_at }
    }

    pub(crate) fn decode(var: &str, value: &Value) -> Result<Self, NavError> {
        let Value::Array(items) = value else {
            return Err(NavError::malformed(var, "expected an array of entry page keys"));
        };

        let keys = items
            .iter()
            .enumerate()
            .map(|(position, item)| match item {
                Value::String(key) => Ok(key.clone()),
                _ => Err(NavError::malformed(
                    format_args!("{}[{}]", var, position),
                    "entry page key must be a string",
                )),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(keys))
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether the keys are strictly ascending, which [`chunk_for`](Self::chunk_for)
    /// requires.
    pub fn is_ordered(&self) -> bool {
        self.unordered_at.is_none()
    }

    /// The chunk that would hold `page`: the last key sorting at or before it.
    pub fn chunk_for(&self, page: &str) -> Result<Option<usize>, NavError> {
        if let Some(position) = self.unordered_at {
            return Err(NavError::malformed(
                format_args!("{}[{}]", DEFAULT_INDEX_VAR, position),
                format_args!(
                    "entry page keys must be strictly ascending, `{}` follows `{}`",
                    self.keys[position],
                    self.keys[position - 1]
                ),
            ));
        }

        Ok(match self.keys.binary_search_by(|key| key.as_str().cmp(page)) {
            Ok(position) => Some(position),
            Err(0) => None,
            Err(position) => Some(position - 1),
        })
    }
}

impl<'de> Deserialize<'de> for NavTreeIndex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<String>::deserialize(deserializer).map(NavTreeIndex::new)
    }
}

/// Flat index from target reference to every position pointing at it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageIndex {
    positions: HashMap<String, Vec<NodePath>>,
}

impl PageIndex {
    pub fn build(tree: &NavTree) -> Self {
        let mut positions: HashMap<String, Vec<NodePath>> = HashMap::new();

        for (path, node) in tree.walk() {
            positions.entry(node.target.clone()).or_default().push(path);
        }

        Self { positions }
    }

    /// The first position targeting `target` in document order.
    pub fn first(&self, target: &str) -> Option<&NodePath> {
        self.all(target).first()
    }

    /// Every position targeting `target`, in document order.
    pub fn all(&self, target: &str) -> &[NodePath] {
        self.positions.get(target).map_or(&[], Vec::as_slice)
    }

    /// Number of distinct targets.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
