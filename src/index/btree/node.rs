//! B+ tree nodes.
//!
//! A [`Node`] is either a leaf holding entries or an internal node holding
//! separator keys and child links. Nodes live in their tree's arena and
//! refer to each other by [`NodeId`].

use std::fmt;

/// Position of a node in its tree's arena.
///
/// A child link is the only edge that "owns" a node: every node except the
/// root appears in exactly one parent's `children`. The `next_leaf` link is
/// a plain index that never implies ownership, so the leaf chain cannot
/// form a cycle of owners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// A key paired with its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
}

/// A leaf: sorted entries plus the link to the next leaf in key order.
#[derive(Debug)]
pub struct LeafNode<K, V> {
    pub(crate) entries: Vec<Entry<K, V>>,
    pub(crate) next_leaf: Option<NodeId>,
}

/// An internal node: `keys.len() + 1` children separated by `keys`.
///
/// Every key in `children[i]` is `<= keys[i]`, and every key in
/// `children[i + 1]` is `>= keys[i]`.
#[derive(Debug)]
pub struct InternalNode<K> {
    pub(crate) keys: Vec<K>,
    pub(crate) children: Vec<NodeId>,
}

#[derive(Debug)]
pub enum Node<K, V> {
    Leaf(LeafNode<K, V>),
    Internal(InternalNode<K>),
}

impl<K, V> Node<K, V> {
    /// A leaf with no entries and no successor.
    pub fn new_leaf() -> Self {
        Node::Leaf(LeafNode {
            entries: Vec::new(),
            next_leaf: None,
        })
    }

    /// An internal node with no keys and no children.
    pub fn new_internal() -> Self {
        Node::Internal(InternalNode {
            keys: Vec::new(),
            children: Vec::new(),
        })
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Number of entries (leaf) or separator keys (internal).
    ///
    /// This is the count the split threshold is measured against.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.entries.len(),
            Node::Internal(internal) => internal.keys.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> LeafNode<K, V> {
    pub fn entries(&self) -> &[Entry<K, V>] {
        &self.entries
    }

    pub fn next_leaf(&self) -> Option<NodeId> {
        self.next_leaf
    }
}

impl<K> InternalNode<K> {
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Index of the first key that is `>= key`, or `keys.len()` if none is.
///
/// Equivalently, the number of keys strictly less than `key`. Used both to
/// pick the child to descend into and to place a new entry in a leaf, which
/// puts a new duplicate in front of the equal keys already present.
#[inline]
pub(crate) fn lower_bound<K: Ord>(keys: &[K], key: &K) -> usize {
    keys.partition_point(|k| k < key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_leaf() {
        let node: Node<u32, ()> = Node::new_leaf();
        assert!(node.is_leaf());
        assert!(node.is_empty());
        match node {
            Node::Leaf(leaf) => assert_eq!(leaf.next_leaf(), None),
            Node::Internal(_) => panic!("Expected leaf"),
        }
    }

    #[test]
    fn test_new_internal() {
        let node: Node<u32, ()> = Node::new_internal();
        assert!(!node.is_leaf());
        assert_eq!(node.len(), 0);
    }

    #[test]
    fn test_lower_bound() {
        let keys = [10, 20, 20, 30];
        assert_eq!(lower_bound(&keys, &5), 0);
        assert_eq!(lower_bound(&keys, &10), 0);
        assert_eq!(lower_bound(&keys, &20), 1);
        assert_eq!(lower_bound(&keys, &25), 3);
        assert_eq!(lower_bound(&keys, &99), 4);
        assert_eq!(lower_bound::<u32>(&[], &1), 0);
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(format!("{}", NodeId(3)), "Node(3)");
    }
}
