//! Leaf-chain iteration.

use super::node::{Entry, NodeId};
use super::tree::BPlusTree;

/// Walks entries in key order by following `next_leaf` links.
///
/// Created by [`BPlusTree::iter`]. Empty leaves left behind by range
/// deletion are stepped over.
pub struct Iter<'a, K, V> {
    tree: &'a BPlusTree<K, V>,
    leaf: Option<NodeId>,
    pos: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(tree: &'a BPlusTree<K, V>, leaf: Option<NodeId>) -> Self {
        Self { tree, leaf, pos: 0 }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a Entry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        loop {
            let leaf = tree.leaf(self.leaf?);
            if let Some(entry) = leaf.entries.get(self.pos) {
                self.pos += 1;
                return Some(entry);
            }
            self.leaf = leaf.next_leaf;
            self.pos = 0;
        }
    }
}

impl<'a, K, V> IntoIterator for &'a BPlusTree<K, V> {
    type Item = &'a Entry<K, V>;
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
