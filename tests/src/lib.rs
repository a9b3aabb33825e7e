//! Shared fixtures for the navtree integration tests.

use navtree::{NavNode, NavStore};
use std::path::PathBuf;

/// Root of the fixture documentation set.
pub fn test_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Loads the fixture documentation set through its `navtree.toml`.
pub fn fixture_store() -> NavStore {
    NavStore::open(test_dir()).expect("failed to open fixture documentation")
}

/// Every leaf of the store's tree.
pub fn leaves(store: &NavStore) -> Vec<&NavNode> {
    store
        .tree()
        .walk()
        .map(|(_, node)| node)
        .filter(|node| node.is_leaf())
        .collect()
}
