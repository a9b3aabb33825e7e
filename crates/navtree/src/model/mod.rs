//! In-memory representation of a generated navigation tree.

mod decode;
mod index;
mod node;
mod tree;

pub(crate) use decode::NodeDecoder;
pub use index::*;
pub use node::*;
pub use tree::*;
