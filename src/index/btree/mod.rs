//! B+ tree index.
//!
//! - [`BPlusTree`] - The tree: insert with proactive split, point search,
//!   leaf-chain range scan, range deletion
//! - [`Node`] - Leaf or internal node
//! - [`Iter`] - Ordered walk along the leaf chain

mod iter;
mod node;
#[cfg(test)]
mod proptests;
mod tree;

pub use iter::Iter;
pub use node::{Entry, InternalNode, LeafNode, Node, NodeId};
pub use tree::BPlusTree;
