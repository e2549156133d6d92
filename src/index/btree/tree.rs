//! The B+ tree proper.

use crate::common::config::MIN_ORDER;

use super::iter::Iter;
use super::node::{lower_bound, Entry, InternalNode, LeafNode, Node, NodeId};

/// An ordered multimap from `K` to `V`, laid out as a B+ tree.
///
/// # Layout
/// ```text
///                      ┌──────────────┐
///                      │  [k3 | k6]   │            internal: separator keys
///                      └──┬────┬────┬─┘
///              ┌──────────┘    │    └──────────┐
///        ┌─────▼─────┐   ┌─────▼─────┐   ┌─────▼─────┐
///        │ k1 k2 k3  │──▶│ k4 k5 k6  │──▶│ k7 k8     │──▶ None
///        └───────────┘   └───────────┘   └───────────┘
///                 leaves: entries + next_leaf chain
/// ```
///
/// Nodes are stored in an arena (`Vec<Node>`) and addressed by [`NodeId`].
/// Child links own their targets; the leaf chain is a non-owning shortcut
/// for ordered scans. Nodes are never freed individually: they go away
/// with the tree.
///
/// # Order
/// A node holds at most `order - 1` entries (or separator keys). Splits are
/// proactive: a full node is split before the insert descends into it, so
/// a parent always has room for the promoted key. The root is split the
/// same way, which is the only place the tree grows in height.
///
/// # Duplicates
/// Keys need not be unique. A new entry goes in front of existing entries
/// with an equal key, so [`search`](Self::search) returns the most recently
/// inserted one.
///
/// # Deletion
/// [`delete_range`](Self::delete_range) only filters entries out of leaves.
/// Underfull leaves are not merged, separators are not updated and the
/// height never shrinks. Separators stay valid bounds after removal, so
/// lookups and scans remain correct on a sparse tree.
///
/// # Thread Safety
/// None. A tree must have a single writer; wrap it (as
/// [`SharedSensorDb`](crate::SharedSensorDb) does) to share it.
#[derive(Debug)]
pub struct BPlusTree<K, V> {
    /// Every node of the tree. Index 0 is the first root.
    nodes: Vec<Node<K, V>>,

    root: NodeId,

    order: usize,

    /// Number of entries across all leaves.
    len: usize,
}

impl<K, V> BPlusTree<K, V> {
    /// Maximum entries a node holds before it must split.
    #[inline]
    fn max_entries(&self) -> usize {
        self.order - 1
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of entries in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of levels, counting the leaf level. An empty tree has height 1.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut id = self.root;
        while let Node::Internal(internal) = self.node(id) {
            id = internal.children[0];
            height += 1;
        }
        height
    }

    /// Number of leaves reachable through the leaf chain.
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut current = Some(self.first_leaf());
        while let Some(id) = current {
            count += 1;
            current = self.leaf(id).next_leaf;
        }
        count
    }

    /// Number of nodes ever allocated.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node<K, V> {
        &self.nodes[id.0]
    }

    /// Iterate over every entry in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self, Some(self.first_leaf()))
    }

    /// The leftmost leaf, where the leaf chain starts.
    pub fn first_leaf(&self) -> NodeId {
        let mut id = self.root;
        while let Node::Internal(internal) = self.node(id) {
            id = internal.children[0];
        }
        id
    }

    pub(crate) fn leaf(&self, id: NodeId) -> &LeafNode<K, V> {
        match self.node(id) {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => unreachable!("{id} is not a leaf"),
        }
    }

    fn leaf_mut(&mut self, id: NodeId) -> &mut LeafNode<K, V> {
        match &mut self.nodes[id.0] {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => unreachable!("{id} is not a leaf"),
        }
    }

    fn internal(&self, id: NodeId) -> &InternalNode<K> {
        match self.node(id) {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => unreachable!("{id} is not an internal node"),
        }
    }

    fn internal_mut(&mut self, id: NodeId) -> &mut InternalNode<K> {
        match &mut self.nodes[id.0] {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => unreachable!("{id} is not an internal node"),
        }
    }

    fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }
}

impl<K: Ord + Clone, V> BPlusTree<K, V> {
    /// Create an empty tree: a single empty leaf.
    ///
    /// # Panics
    /// Panics if `order < MIN_ORDER` (3).
    pub fn new(order: usize) -> Self {
        assert!(
            order >= MIN_ORDER,
            "order must be >= {MIN_ORDER}, got {order}"
        );

        Self {
            nodes: vec![Node::new_leaf()],
            root: NodeId(0),
            order,
            len: 0,
        }
    }

    /// Insert an entry. Always succeeds; equal keys are kept side by side.
    pub fn insert(&mut self, key: K, value: V) {
        if self.node(self.root).len() >= self.max_entries() {
            self.split_root();
        }

        let mut node_id = self.root;
        loop {
            let (mut idx, child) = match self.node(node_id) {
                Node::Leaf(_) => break,
                Node::Internal(internal) => {
                    let idx = lower_bound(&internal.keys, &key);
                    (idx, internal.children[idx])
                }
            };

            if self.node(child).len() >= self.max_entries() {
                self.split_child(node_id, idx);

                // The promoted separator now sits at `idx`
                let keys = &self.internal(node_id).keys;
                if idx < keys.len() && key > keys[idx] {
                    idx += 1;
                }
            }
            node_id = self.internal(node_id).children[idx];
        }

        let leaf = self.leaf_mut(node_id);
        let pos = leaf.entries.partition_point(|e| e.key < key);
        leaf.entries.insert(pos, Entry { key, value });
        self.len += 1;
    }

    /// Find the most recently inserted entry with exactly `key`.
    pub fn search(&self, key: &K) -> Option<&V> {
        Iter::new(self, Some(self.find_leaf(key)))
            .skip_while(|e| e.key < *key)
            .take_while(|e| e.key == *key)
            .map(|e| &e.value)
            .next()
    }

    /// Descend to the leftmost leaf that may hold `key`.
    pub fn find_leaf(&self, key: &K) -> NodeId {
        let mut id = self.root;
        while let Node::Internal(internal) = self.node(id) {
            id = internal.children[lower_bound(&internal.keys, key)];
        }
        id
    }

    /// Every entry with `start <= key <= end`, in ascending key order.
    ///
    /// Starts at the leaf holding `start` and walks the leaf chain until a
    /// key passes `end`. An inverted range yields nothing.
    pub fn range_query(&self, start: &K, end: &K) -> Vec<&Entry<K, V>> {
        Iter::new(self, Some(self.find_leaf(start)))
            .skip_while(|e| e.key < *start)
            .take_while(|e| e.key <= *end)
            .collect()
    }

    /// Remove every entry with `start <= key <= end`. Returns how many.
    ///
    /// Each visited leaf is filtered in place; no node is unlinked, merged
    /// or freed. The walk stops at the first leaf whose last remaining key
    /// is past `end`.
    pub fn delete_range(&mut self, start: &K, end: &K) -> usize {
        let mut removed = 0;
        let mut current = Some(self.find_leaf(start));

        while let Some(id) = current {
            let leaf = self.leaf_mut(id);
            let before = leaf.entries.len();
            leaf.entries.retain(|e| e.key < *start || e.key > *end);
            removed += before - leaf.entries.len();

            if leaf.entries.last().is_some_and(|e| e.key > *end) {
                break;
            }
            current = leaf.next_leaf;
        }

        self.len -= removed;
        removed
    }

    /// Give the tree a new internal root whose only child is the old root,
    /// then split that child.
    fn split_root(&mut self) {
        let old_root = self.root;
        let new_root = self.alloc(Node::new_internal());
        self.internal_mut(new_root).children.push(old_root);
        self.root = new_root;

        self.split_child(new_root, 0);
        log::trace!("root split, height is now {}", self.height());
    }

    /// Split the full child at `child_index` of `parent`.
    ///
    /// With `mid = (order - 1) / 2`:
    /// - leaf: the child keeps entries `[0, mid]`, the new sibling takes the
    ///   rest and is spliced into the leaf chain right after the child. A
    ///   copy of the child's last key becomes the separator.
    /// - internal: the key at `mid` moves up as the separator, the child
    ///   keeps keys `[0, mid)` and children `[0, mid]`, the sibling takes
    ///   keys and children from `mid + 1` on.
    ///
    /// The sibling is placed at `child_index + 1` in the parent.
    fn split_child(&mut self, parent: NodeId, child_index: usize) {
        let child_id = self.internal(parent).children[child_index];
        let mid = (self.order - 1) / 2;
        let sibling_id = NodeId(self.nodes.len());

        let (separator, sibling) = match &mut self.nodes[child_id.0] {
            Node::Leaf(leaf) => {
                // At order 3 `mid + 1` is the whole leaf; keep one entry back
                // so the sibling is never empty.
                let keep = (mid + 1).min(leaf.entries.len() - 1);
                let moved = leaf.entries.split_off(keep);
                let separator = leaf.entries[keep - 1].key.clone();
                let sibling = LeafNode {
                    entries: moved,
                    next_leaf: leaf.next_leaf.replace(sibling_id),
                };
                (separator, Node::Leaf(sibling))
            }
            Node::Internal(internal) => {
                let children = internal.children.split_off(mid + 1);
                let keys = internal.keys.split_off(mid + 1);
                let separator = internal.keys.remove(mid);
                (separator, Node::Internal(InternalNode { keys, children }))
            }
        };

        let allocated = self.alloc(sibling);
        debug_assert_eq!(allocated, sibling_id);

        let parent = self.internal_mut(parent);
        parent.keys.insert(child_index, separator);
        parent.children.insert(child_index + 1, sibling_id);

        log::trace!("split {child_id} into {child_id} and {sibling_id}");
    }
}

#[cfg(test)]
impl<K: Ord + Clone + std::fmt::Debug, V> BPlusTree<K, V> {
    /// Check every structural invariant, panicking on the first violation.
    pub(crate) fn validate(&self) {
        let mut leaves_in_order = Vec::new();
        self.validate_node(self.root, None, None, &mut leaves_in_order);

        // The chain visits exactly the leaves of an in-order walk.
        let mut chain = Vec::new();
        let mut current = Some(self.first_leaf());
        while let Some(id) = current {
            chain.push(id);
            current = self.leaf(id).next_leaf;
        }
        assert_eq!(chain, leaves_in_order, "leaf chain out of step with tree");

        let keys: Vec<&K> = self.iter().map(|e| &e.key).collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]), "chain not sorted");
        assert_eq!(keys.len(), self.len, "len out of step with entries");
    }

    fn validate_node(
        &self,
        id: NodeId,
        lower: Option<&K>,
        upper: Option<&K>,
        leaves: &mut Vec<NodeId>,
    ) {
        let node = self.node(id);
        assert!(
            node.len() <= self.max_entries(),
            "{id} holds {} entries, max is {}",
            node.len(),
            self.max_entries()
        );

        match node {
            Node::Leaf(leaf) => {
                for entry in &leaf.entries {
                    assert!(lower.map_or(true, |lo| entry.key >= *lo), "{id} below bound");
                    assert!(upper.map_or(true, |hi| entry.key <= *hi), "{id} above bound");
                }
                assert!(
                    leaf.entries.windows(2).all(|w| w[0].key <= w[1].key),
                    "{id} entries unsorted"
                );
                leaves.push(id);
            }
            Node::Internal(internal) => {
                assert_eq!(
                    internal.children.len(),
                    internal.keys.len() + 1,
                    "{id} child count"
                );
                assert!(internal.keys.windows(2).all(|w| w[0] <= w[1]));
                for (i, &child) in internal.children.iter().enumerate() {
                    let lo = if i == 0 { lower } else { Some(&internal.keys[i - 1]) };
                    let hi = internal.keys.get(i).or(upper);
                    self.validate_node(child, lo, hi, leaves);
                }
            }
        }
    }
}
