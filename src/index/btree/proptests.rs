use super::*;

use proptest::prelude::*;

/// Reference model: a sorted `Vec` where a new duplicate goes in front of
/// the equal keys already present.
#[derive(Default)]
struct Model {
    entries: Vec<(u8, u32)>,
}

impl Model {
    fn insert(&mut self, key: u8, value: u32) {
        let pos = self.entries.partition_point(|&(k, _)| k < key);
        self.entries.insert(pos, (key, value));
    }

    fn search(&self, key: u8) -> Option<u32> {
        self.entries.iter().find(|&&(k, _)| k == key).map(|&(_, v)| v)
    }

    fn range(&self, start: u8, end: u8) -> Vec<(u8, u32)> {
        self.entries
            .iter()
            .copied()
            .filter(|&(k, _)| start <= k && k <= end)
            .collect()
    }

    fn delete_range(&mut self, start: u8, end: u8) -> usize {
        let before = self.entries.len();
        self.entries.retain(|&(k, _)| k < start || k > end);
        before - self.entries.len()
    }
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u8),
    Search(u8),
    Range(u8, u8),
    DeleteRange(u8, u8),
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    // A narrow key space so duplicates are common.
    let key = 0u8..64;
    let op = prop_oneof![
        60 => key.clone().prop_map(Op::Insert),
        15 => key.clone().prop_map(Op::Search),
        15 => (key.clone(), key.clone()).prop_map(|(a, b)| Op::Range(a, b)),
        10 => (key.clone(), key.clone()).prop_map(|(a, b)| Op::DeleteRange(a, b)),
    ];
    prop::collection::vec(op, 0..=600)
}

fn pairs(entries: Vec<&Entry<u8, u32>>) -> Vec<(u8, u32)> {
    entries.into_iter().map(|e| (e.key, e.value)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(order in 3usize..=9, ops in ops_strategy()) {
        let mut t: BPlusTree<u8, u32> = BPlusTree::new(order);
        let mut m = Model::default();
        let mut next_value = 0u32;

        for op in ops {
            match op {
                Op::Insert(key) => {
                    t.insert(key, next_value);
                    m.insert(key, next_value);
                    next_value += 1;
                }
                Op::Search(key) => {
                    prop_assert_eq!(t.search(&key).copied(), m.search(key));
                }
                Op::Range(start, end) => {
                    prop_assert_eq!(pairs(t.range_query(&start, &end)), m.range(start, end));
                }
                Op::DeleteRange(start, end) => {
                    prop_assert_eq!(t.delete_range(&start, &end), m.delete_range(start, end));
                    prop_assert!(t.range_query(&start, &end).is_empty());
                }
            }

            prop_assert_eq!(t.len(), m.entries.len());
        }

        t.validate();
        let got: Vec<(u8, u32)> = t.iter().map(|e| (e.key, e.value)).collect();
        prop_assert_eq!(got, m.entries);
    }

    #[test]
    fn prop_height_never_shrinks_on_insert(order in 3usize..=6, keys in prop::collection::vec(any::<u8>(), 0..=300)) {
        let mut t: BPlusTree<u8, ()> = BPlusTree::new(order);
        let mut height = t.height();

        for key in keys {
            t.insert(key, ());
            prop_assert!(t.height() >= height);
            height = t.height();
        }

        t.validate();
    }
}

#[test]
fn newest_duplicate_wins_across_leaves() {
    let mut t: BPlusTree<u8, u32> = BPlusTree::new(3);
    for value in 0..40 {
        t.insert(7, value);
    }
    t.insert(3, 100);
    t.insert(9, 200);

    assert!(t.leaf_count() > 1);
    assert_eq!(t.search(&7), Some(&39));

    let sevens: Vec<u32> = t.range_query(&7, &7).iter().map(|e| e.value).collect();
    assert_eq!(sevens, (0..40).rev().collect::<Vec<_>>());
    t.validate();
}
