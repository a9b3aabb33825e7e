//! Loading, validation and lookup of generated documentation navigation trees.
//!
//! A documentation generator ships its table of contents as a data script
//! (`navtreedata.js`) holding a nested `[label, target, children]` tree and an
//! ordered list of entry page keys. [`NavStore`] reads that data once, checks
//! it, and answers breadcrumb queries for a page reference.
//!
//! ```
//! use navtree::NavStore;
//!
//! let store = NavStore::load(r#"
//! var NAVTREE = [
//!   [ "termstyle", "index.html", [
//!     [ "Features", "index.html#autotoc_md12", null ]
//!   ] ]
//! ];
//! "#)?;
//!
//! let crumb = store.lookup("index.html#autotoc_md12")?;
//! assert_eq!("termstyle > Features", crumb.to_string());
//! assert!(store.lookup("does-not-exist.html").is_err());
//! # Ok::<(), navtree::error::NavError>(())
//! ```

#![deny(rust_2018_idioms)]
#![deny(clippy::all)]

pub mod config;
pub mod error;
pub mod model;
pub mod script;
pub mod store;

pub use config::{Config, NavTreeConfig};
pub use error::NavError;
pub use model::{NavNode, NavTree, NavTreeIndex, NodePath, PageIndex};
pub use store::{Breadcrumb, NavStore, PanelSync};
